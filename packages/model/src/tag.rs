//! Tag references.
//!
//! A recipe either points at an existing tag or asks the server to create a
//! new one by name. Which one it is must survive every transformation;
//! deduplicating a new name against existing tags is the server's job.

use serde::{Deserialize, Serialize};

use crate::identity::ServerId;

/// A resolved tag as returned by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: ServerId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TagRef {
    #[serde(alias = "existing")]
    Existing { id: ServerId },
    #[serde(alias = "new")]
    New { name: String },
}

impl TagRef {
    pub fn existing(id: impl Into<ServerId>) -> Self {
        TagRef::Existing { id: id.into() }
    }

    pub fn new_tag(name: impl Into<String>) -> Self {
        TagRef::New { name: name.into() }
    }

    /// Value to put on the wire. Always the reference itself.
    pub fn resolve_for_transport(&self) -> TagRef {
        self.clone()
    }

    pub fn is_new(&self) -> bool {
        matches!(self, TagRef::New { .. })
    }
}

impl From<&Tag> for TagRef {
    fn from(tag: &Tag) -> Self {
        TagRef::Existing { id: tag.id.clone() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let tags = vec![TagRef::existing("t-1"), TagRef::new_tag("Vegan")];
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(
            json,
            r#"[{"type":"Existing","id":"t-1"},{"type":"New","name":"Vegan"}]"#
        );
    }

    #[test]
    fn test_accepts_lowercase_variants() {
        let json = r#"[{"type":"existing","id":"t-1"},{"type":"new","name":"vegan"}]"#;
        let tags: Vec<TagRef> = serde_json::from_str(json).unwrap();
        assert_eq!(tags, vec![TagRef::existing("t-1"), TagRef::new_tag("vegan")]);
    }

    #[test]
    fn test_new_tag_is_never_coerced() {
        // Same name as an existing tag, still a request to create
        let tag = TagRef::new_tag("Dessert");
        assert_eq!(tag.resolve_for_transport(), TagRef::new_tag("Dessert"));
        assert!(tag.resolve_for_transport().is_new());
    }
}
