//! Error types for the editor

use recipe_model::{IncompleteAggregate, PreconditionViolation};
use thiserror::Error;

use crate::staging::MediaSlot;

/// Failure reported by an external collaborator (upload, create, update,
/// fetch, list). The core never retries these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(e: std::io::Error) -> Self {
        TransportError::Io(e.to_string())
    }
}

/// Why an editable recipe could not be turned into a payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error(transparent)]
    Incomplete(#[from] IncompleteAggregate),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),

    #[error(transparent)]
    Incomplete(#[from] IncompleteAggregate),

    #[error("Staging {slot} failed: {source}")]
    Staging {
        slot: MediaSlot,
        #[source]
        source: TransportError,
    },

    #[error("Submit failed: {0}")]
    Transport(#[source] TransportError),
}

impl From<MapError> for SubmitError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::Precondition(violation) => SubmitError::Precondition(violation),
            MapError::Incomplete(incomplete) => SubmitError::Incomplete(incomplete),
        }
    }
}

impl SubmitError {
    /// Whether resubmitting without code changes can succeed
    pub fn is_retriable(&self) -> bool {
        matches!(self, SubmitError::Staging { .. } | SubmitError::Transport(_))
    }
}
