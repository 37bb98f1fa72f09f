//! # Ordered Collections
//!
//! Groups and items keep a zero-based `position`. Within one parent the
//! positions are always `0..n-1` in array order; every structural operation
//! here renumbers the collection after it changes it.

use crate::error::PositionError;

/// An entity that lives at a position inside an ordered collection
pub trait Positioned {
    fn position(&self) -> u32;
    fn set_position(&mut self, position: u32);
}

/// Renumber so positions equal array indices
pub fn assign_positions<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index as u32);
    }
}

/// Whether positions are exactly `0..n-1` in array order
pub fn is_contiguous<T: Positioned>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() as usize == index)
}

/// Insert at `index` (clamped to the end) and renumber.
/// Returns the index the item actually landed at.
pub fn insert_at<T: Positioned>(items: &mut Vec<T>, index: usize, item: T) -> usize {
    let index = index.min(items.len());
    items.insert(index, item);
    assign_positions(items);
    index
}

/// Remove the item at `index` and renumber the rest
pub fn remove_at<T: Positioned>(items: &mut Vec<T>, index: usize) -> Result<T, PositionError> {
    if index >= items.len() {
        return Err(PositionError::OutOfBounds {
            index,
            len: items.len(),
        });
    }

    let removed = items.remove(index);
    assign_positions(items);
    Ok(removed)
}

/// Move the item at `from` so it ends up at `to`, shifting the others
pub fn move_to<T: Positioned>(
    items: &mut Vec<T>,
    from: usize,
    to: usize,
) -> Result<(), PositionError> {
    let len = items.len();
    if from >= len {
        return Err(PositionError::OutOfBounds { index: from, len });
    }
    if to >= len {
        return Err(PositionError::OutOfBounds { index: to, len });
    }

    let item = items.remove(from);
    items.insert(to, item);
    assign_positions(items);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry {
        name: &'static str,
        position: u32,
    }

    impl Positioned for Entry {
        fn position(&self) -> u32 {
            self.position
        }

        fn set_position(&mut self, position: u32) {
            self.position = position;
        }
    }

    fn entries(names: &[&'static str]) -> Vec<Entry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Entry {
                name,
                position: i as u32,
            })
            .collect()
    }

    fn names(items: &[Entry]) -> Vec<&'static str> {
        items.iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_assign_positions_repairs_gaps() {
        let mut items = vec![
            Entry { name: "a", position: 4 },
            Entry { name: "b", position: 4 },
            Entry { name: "c", position: 9 },
        ];

        assign_positions(&mut items);

        assert!(is_contiguous(&items));
        assert_eq!(names(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_clamps_to_end() {
        let mut items = entries(&["a", "b"]);

        let landed = insert_at(&mut items, 10, Entry { name: "z", position: 0 });

        assert_eq!(landed, 2);
        assert_eq!(names(&items), vec!["a", "b", "z"]);
        assert!(is_contiguous(&items));
    }

    #[test]
    fn test_remove_renumbers() {
        let mut items = entries(&["a", "b", "c"]);

        let removed = remove_at(&mut items, 0).unwrap();

        assert_eq!(removed.name, "a");
        assert_eq!(names(&items), vec!["b", "c"]);
        assert!(is_contiguous(&items));
    }

    #[test]
    fn test_remove_out_of_bounds() {
        let mut items = entries(&["a"]);
        assert_eq!(
            remove_at(&mut items, 3),
            Err(PositionError::OutOfBounds { index: 3, len: 1 })
        );
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut items = entries(&["a", "b", "c", "d"]);

        move_to(&mut items, 0, 2).unwrap();
        assert_eq!(names(&items), vec!["b", "c", "a", "d"]);
        assert!(is_contiguous(&items));

        move_to(&mut items, 3, 0).unwrap();
        assert_eq!(names(&items), vec!["d", "b", "c", "a"]);
        assert!(is_contiguous(&items));
    }

    #[test]
    fn test_contiguity_after_mixed_operations() {
        let mut items = entries(&["a", "b", "c"]);

        for round in 0..20usize {
            match round % 3 {
                0 => {
                    insert_at(&mut items, round % 4, Entry { name: "n", position: 99 });
                }
                1 => {
                    let last = items.len() - 1;
                    move_to(&mut items, last, 0).unwrap();
                }
                _ => {
                    remove_at(&mut items, 1).unwrap();
                }
            }
            assert!(is_contiguous(&items), "round {} broke contiguity", round);
        }
    }
}
