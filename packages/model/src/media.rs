//! # Image Fields
//!
//! An image field moves through four states:
//!
//! ```text
//!            select                 stage upload ok
//! Absent ───────────▶ LocalPending ─────────────────▶ ResolvedPending
//!   ▲                    │   ▲
//!   └──── clear ─────────┘   │ select (replace)
//!                            │
//! Remote ────────────────────┘
//! ```
//!
//! `Remote` is an image already stored by the server and passes through
//! untouched. A `LocalPending` file is never sent as-is: it has to be staged
//! first, which yields a temporary id the payload refers to instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{EntityPath, MediaError, PreconditionViolation};

/// A file picked on the client, not yet uploaded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocalFile {
    pub path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }

    pub fn extension(&self) -> Option<&str> {
        self.path.extension().and_then(|ext| ext.to_str())
    }
}

/// Server handle for a staged, not yet committed upload
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TempId(String);

impl TempId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TempId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ImageField {
    #[default]
    Absent,
    Remote { url: String },
    LocalPending { file: LocalFile },
    ResolvedPending { temp_id: TempId },
}

impl ImageField {
    /// Field for an image url coming from the server; empty means no image
    pub fn from_url(url: Option<&str>) -> Self {
        match url {
            Some(url) if !url.trim().is_empty() => ImageField::Remote {
                url: url.to_string(),
            },
            _ => ImageField::Absent,
        }
    }

    /// The user picked a file. Replaces whatever was there.
    pub fn select(&mut self, file: LocalFile) -> ImageField {
        std::mem::replace(self, ImageField::LocalPending { file })
    }

    /// The user removed the image
    pub fn clear(&mut self) -> ImageField {
        std::mem::take(self)
    }

    /// Record a successful staging of the pending file
    pub fn resolve(&mut self, temp_id: TempId) -> Result<(), MediaError> {
        match self {
            ImageField::LocalPending { .. } => {
                *self = ImageField::ResolvedPending { temp_id };
                Ok(())
            }
            other => Err(MediaError::NotPending {
                state: other.state_name(),
            }),
        }
    }

    pub fn pending_file(&self) -> Option<&LocalFile> {
        match self {
            ImageField::LocalPending { file } => Some(file),
            _ => None,
        }
    }

    pub fn is_pending_upload(&self) -> bool {
        matches!(self, ImageField::LocalPending { .. })
    }

    pub fn state_name(&self) -> &'static str {
        match self {
            ImageField::Absent => "absent",
            ImageField::Remote { .. } => "remote",
            ImageField::LocalPending { .. } => "local_pending",
            ImageField::ResolvedPending { .. } => "resolved_pending",
        }
    }

    /// Transportable form of the field. A local file that has not been
    /// staged cannot be sent.
    pub fn to_transport(
        &self,
        entity: EntityPath,
    ) -> Result<Option<PayloadImage>, PreconditionViolation> {
        match self {
            ImageField::Absent => Ok(None),
            ImageField::Remote { url } => Ok(Some(PayloadImage::Remote { url: url.clone() })),
            ImageField::ResolvedPending { temp_id } => Ok(Some(PayloadImage::Staged {
                temp_id: temp_id.clone(),
            })),
            ImageField::LocalPending { .. } => Err(PreconditionViolation::UnstagedImage { entity }),
        }
    }
}

/// Image reference as it appears in a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadImage {
    /// Keep the image the server already has
    Remote { url: String },
    /// Commit a staged upload
    Staged { temp_id: TempId },
}
