//! # Undo/Redo Stack
//!
//! Tracks mutation history for one edit session.
//!
//! ## Design
//!
//! - Applying a mutation yields its inverse, which is recorded with it
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo reapplies the original mutations
//! - New mutations clear the redo stack
//! - Batches group several mutations into one undo step
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.apply(&Mutation::RemoveIngredient { ingredient_id }, &mut recipe)?;
//!
//! stack.undo(&mut recipe)?;
//! stack.redo(&mut recipe)?;
//! ```

use recipe_model::RecipeEdit;

use crate::mutations::{Mutation, MutationError};

pub const DEFAULT_UNDO_LEVELS: usize = 100;

/// A group of mutations that are undone and redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// In application order
    pub mutations: Vec<Mutation>,

    /// In undo order (reverse of application)
    pub inverses: Vec<Mutation>,

    pub description: Option<String>,
}

impl MutationBatch {
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn empty() -> Self {
        Self {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }
}

#[derive(Debug)]
pub struct UndoStack {
    /// Most recent last
    undo_stack: Vec<MutationBatch>,

    /// Most recently undone last
    redo_stack: Vec<MutationBatch>,

    /// 0 = unlimited
    max_levels: usize,

    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_UNDO_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Apply a mutation and record it for undo
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        recipe: &mut RecipeEdit,
    ) -> Result<(), MutationError> {
        let inverse = mutation.apply(recipe)?;

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(mutation.clone());
            batch.inverses.insert(0, inverse);
        } else {
            let batch = MutationBatch::single(mutation.clone(), inverse)
                .with_description(mutation.label());
            self.push_batch(batch);
        }

        Ok(())
    }

    /// Start a batch; mutations until [`end_batch`](Self::end_batch) form one
    /// undo step
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch::empty());
    }

    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    /// Drop the open batch, returning its inverses in undo order
    pub fn abort_batch(&mut self) -> Vec<Mutation> {
        self.current_batch
            .take()
            .map(|batch| batch.inverses)
            .unwrap_or_default()
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch. Returns false when there is nothing to undo.
    /// A failed undo leaves the recipe and both stacks as they were.
    pub fn undo(&mut self, recipe: &mut RecipeEdit) -> Result<bool, MutationError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = replay(&batch.inverses, recipe) {
            self.undo_stack.push(batch);
            return Err(e);
        }
        self.redo_stack.push(batch);

        Ok(true)
    }

    /// Redo the most recently undone batch, all or nothing like
    /// [`undo`](Self::undo)
    pub fn redo(&mut self, recipe: &mut RecipeEdit) -> Result<bool, MutationError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = replay(&batch.mutations, recipe) {
            self.redo_stack.push(batch);
            return Err(e);
        }
        self.undo_stack.push(batch);

        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

/// Apply `steps` in order, all or nothing
fn replay(steps: &[Mutation], recipe: &mut RecipeEdit) -> Result<(), MutationError> {
    let snapshot = recipe.clone();
    for step in steps {
        if let Err(e) = step.apply(recipe) {
            *recipe = snapshot;
            return Err(e);
        }
    }
    Ok(())
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
