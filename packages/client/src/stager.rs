//! Filesystem-backed media staging

use async_trait::async_trait;
use chrono::Utc;
use recipe_editor::{MediaStager, TransportError};
use recipe_model::{LocalFile, TempId};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Url prefix under which staged files are served
pub const TEMP_URL_PREFIX: &str = "/assets/temp";

const DEFAULT_EXTENSION: &str = "png";

/// Copies picked files into a staging directory.
///
/// Each file is stored as `recipe_<uuid>_<timestamp>.<ext>` and its temporary
/// id is the url it will be served from. Names stay unique across stagers and
/// processes sharing one directory.
pub struct DirectoryStager {
    dir: PathBuf,
}

impl DirectoryStager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path on disk of a file staged under `temp_id`
    pub fn resolve(&self, temp_id: &TempId) -> Option<PathBuf> {
        let name = temp_id
            .as_str()
            .strip_prefix(TEMP_URL_PREFIX)?
            .strip_prefix('/')?;
        Some(self.dir.join(name))
    }

    fn file_name(file: &LocalFile) -> String {
        let ext = file.extension().unwrap_or(DEFAULT_EXTENSION);
        format!(
            "recipe_{}_{}.{}",
            Uuid::new_v4(),
            Utc::now().timestamp_millis(),
            ext
        )
    }
}

#[async_trait]
impl MediaStager for DirectoryStager {
    async fn stage_upload(&self, file: &LocalFile) -> Result<TempId, TransportError> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let name = Self::file_name(file);
        tokio::fs::copy(file.path(), self.dir.join(&name)).await?;

        debug!(source = %file.path().display(), staged = %name, "Staged upload");
        Ok(TempId::new(format!("{}/{}", TEMP_URL_PREFIX, name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_stage_copies_file() {
        let source_dir = tempdir().unwrap();
        let staging_dir = tempdir().unwrap();
        let source = source_dir.path().join("soup.jpg");
        tokio::fs::write(&source, b"jpeg bytes").await.unwrap();

        let stager = DirectoryStager::new(staging_dir.path().join("temp"));
        let temp_id = stager.stage_upload(&LocalFile::new(&source)).await.unwrap();

        assert!(temp_id.as_str().starts_with("/assets/temp/recipe_"));
        assert!(temp_id.as_str().ends_with(".jpg"));

        let staged = stager.resolve(&temp_id).unwrap();
        assert_eq!(tokio::fs::read(&staged).await.unwrap(), b"jpeg bytes");
        // Source is left in place
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_default_extension_and_unique_names() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("photo");
        tokio::fs::write(&source, b"raw").await.unwrap();

        let stager = DirectoryStager::new(dir.path().join("staging"));
        let first = stager.stage_upload(&LocalFile::new(&source)).await.unwrap();
        let second = stager.stage_upload(&LocalFile::new(&source)).await.unwrap();

        assert!(first.as_str().starts_with("/assets/temp/recipe_"));
        assert!(first.as_str().ends_with(".png"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_stagers_sharing_a_directory_do_not_collide() {
        let dir = tempdir().unwrap();
        let soup = dir.path().join("soup.jpg");
        let tart = dir.path().join("tart.jpg");
        tokio::fs::write(&soup, b"soup").await.unwrap();
        tokio::fs::write(&tart, b"tart").await.unwrap();

        let staging = dir.path().join("staging");
        let a = DirectoryStager::new(&staging);
        let b = DirectoryStager::new(&staging);
        let first = a.stage_upload(&LocalFile::new(&soup)).await.unwrap();
        let second = b.stage_upload(&LocalFile::new(&tart)).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(tokio::fs::read(a.resolve(&first).unwrap()).await.unwrap(), b"soup");
        assert_eq!(tokio::fs::read(b.resolve(&second).unwrap()).await.unwrap(), b"tart");
        assert_eq!(std::fs::read_dir(&staging).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error() {
        let dir = tempdir().unwrap();
        let stager = DirectoryStager::new(dir.path());

        let result = stager
            .stage_upload(&LocalFile::new(dir.path().join("nope.png")))
            .await;

        assert!(matches!(result, Err(TransportError::Io(_))));
    }

    #[test]
    fn test_resolve_rejects_foreign_ids() {
        let stager = DirectoryStager::new("/var/staging");

        assert_eq!(
            stager.resolve(&TempId::new("/assets/temp/recipe_1_0.png")),
            Some(PathBuf::from("/var/staging/recipe_1_0.png"))
        );
        assert_eq!(stager.resolve(&TempId::new("/assets/recipes/a.png")), None);
    }
}
