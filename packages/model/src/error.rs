//! Error types for the recipe model

use std::fmt;
use thiserror::Error;

use crate::translation::LanguageCode;

/// Location of an entity inside a recipe, by array index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityPath {
    Recipe,
    IngredientGroup(usize),
    Ingredient { group: usize, index: usize },
    StepGroup(usize),
    Step { group: usize, index: usize },
}

impl fmt::Display for EntityPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityPath::Recipe => write!(f, "recipe"),
            EntityPath::IngredientGroup(group) => write!(f, "ingredient group {}", group),
            EntityPath::Ingredient { group, index } => {
                write!(f, "ingredient {} of ingredient group {}", index, group)
            }
            EntityPath::StepGroup(group) => write!(f, "step group {}", group),
            EntityPath::Step { group, index } => {
                write!(f, "step {} of step group {}", index, group)
            }
        }
    }
}

/// Programming-contract violations. These are fatal to the operation that
/// hit them and are never presented to the user as retriable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreconditionViolation {
    #[error("{entity} has neither a server id nor a local id")]
    MissingIdentity { entity: EntityPath },

    #[error("image of {entity} is still a local file and must be staged first")]
    UnstagedImage { entity: EntityPath },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    #[error("Index {index} out of bounds for collection of length {len}")]
    OutOfBounds { index: usize, len: usize },
}

/// A translation that must exist before the recipe can be submitted
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{entity} has no '{language}' translation")]
pub struct MissingTranslation {
    pub entity: EntityPath,
    pub language: LanguageCode,
}

/// The aggregate lacks content the caller has to supply before resubmitting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("incomplete recipe: {}", join_missing(.missing))]
pub struct IncompleteAggregate {
    pub missing: Vec<MissingTranslation>,
}

fn join_missing(missing: &[MissingTranslation]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("Cannot resolve an image in state '{state}', only a pending local file can be resolved")]
    NotPending { state: &'static str },
}
