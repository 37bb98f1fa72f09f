//! # Recipe Editor
//!
//! Client-side editing core for recipe aggregates.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ server: RecipeView (read aggregate)         │
//! └─────────────────────────────────────────────┘
//!                     ↓ view_to_edit
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - RecipeEdit with local ids                │
//! │  - Mutations with inverses + undo history   │
//! │  - Media staging for local image files      │
//! └─────────────────────────────────────────────┘
//!                     ↓ edit_to_payload
//! ┌─────────────────────────────────────────────┐
//! │ server: SubmitRequest (metadata + media)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One editable shape**: the view and the payload are projections of
//!    [`RecipeEdit`](recipe_model::RecipeEdit), never edited directly
//! 2. **Local ids stay local**: they key rows during the session and are
//!    stripped before anything is sent
//! 3. **Array order is authoritative**: positions are recomputed on submit
//! 4. **No hidden retries**: the first failing upload or request ends the
//!    operation and is reported to the caller
//!
//! ## Usage
//!
//! ```rust,ignore
//! use recipe_editor::{EditSession, Mutation};
//!
//! let mut session = EditSession::load_for_edit("edit-1", &view);
//!
//! session.apply(Mutation::RemoveIngredient { ingredient_id })?;
//! session.undo()?;
//!
//! let outcome = session.submit(&stager, &api).await?;
//! ```

mod errors;
mod mapper;
mod mutations;
mod session;
mod staging;
mod transport;
mod undo_stack;

pub use errors::{MapError, SubmitError, TransportError};
pub use mapper::{edit_to_payload, view_to_edit};
pub use mutations::{
    EntityRef, EntityText, ImageTarget, Mutation, MutationError, TranslationSnapshot,
};
pub use session::{EditSession, SubmitOutcome};
pub use staging::{stage_pending_media, MediaSlot, StagingReport};
pub use transport::{MediaPart, MediaStager, RecipeWriter, SubmitRequest, TransportPart};
pub use undo_stack::{MutationBatch, UndoStack, DEFAULT_UNDO_LEVELS};
