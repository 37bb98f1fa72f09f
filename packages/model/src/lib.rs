//! # Recipe Model
//!
//! Data model for editing recipes on the client.
//!
//! A recipe exists in three shapes:
//!
//! ```text
//! RecipeView ──view_to_edit──▶ RecipeEdit ──edit_to_payload──▶ RecipePayload
//!  (server)                    (session)                        (server)
//! ```
//!
//! This crate defines the shapes and the building blocks they share:
//! identities, ordered collections, translation sets, tag references, and
//! image fields. The transformations live in `recipe-editor`.

pub mod edit;
pub mod error;
pub mod identity;
pub mod media;
pub mod payload;
pub mod position;
pub mod tag;
pub mod translation;
pub mod view;

pub use edit::{
    IngredientEdit, IngredientGroupEdit, RecipeDetails, RecipeEdit, StepEdit, StepGroupEdit,
};
pub use error::{
    EntityPath, IncompleteAggregate, MediaError, MissingTranslation, PositionError,
    PreconditionViolation,
};
pub use identity::{Identity, LocalId, LocalIdGenerator, ServerId};
pub use media::{ImageField, LocalFile, PayloadImage, TempId};
pub use payload::{
    ImageSlot, IngredientGroupPayload, IngredientPayload, RecipePayload, StepGroupPayload,
    StepPayload,
};
pub use position::{assign_positions, insert_at, is_contiguous, move_to, remove_at, Positioned};
pub use tag::{Tag, TagRef};
pub use translation::{
    GroupText, IngredientText, LanguageCode, RecipeText, Resolved, StepText, Translation,
    TranslationSet,
};
pub use view::{IngredientGroupView, IngredientView, RecipeView, StepGroupView, StepView};
