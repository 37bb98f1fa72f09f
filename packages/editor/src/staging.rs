//! # Media Staging
//!
//! Uploads every pending local file before a submit. Staging runs
//! sequentially in declaration order (the recipe image, then step images in
//! list order) and stops at the first failure. Fields that were staged
//! before the failure stay resolved; the failing field and everything after
//! it stay pending, so resubmitting only repeats the remainder.

use recipe_model::{
    EntityPath, ImageField, LocalFile, LocalId, PreconditionViolation, RecipeEdit, TempId,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::errors::SubmitError;
use crate::transport::MediaStager;

/// Which image field a staging call was made for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "slot", content = "step", rename_all = "snake_case")]
pub enum MediaSlot {
    RecipeImage,
    StepImage(LocalId),
}

impl fmt::Display for MediaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSlot::RecipeImage => write!(f, "recipe image"),
            MediaSlot::StepImage(step) => write!(f, "image of step {}", step),
        }
    }
}

/// Uploads performed by one staging pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingReport {
    pub staged: Vec<(MediaSlot, TempId)>,
}

impl StagingReport {
    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}

/// Stage every `LocalPending` image field and resolve it to its temp id
#[instrument(skip_all)]
pub async fn stage_pending_media<S>(
    recipe: &mut RecipeEdit,
    stager: &S,
) -> Result<StagingReport, SubmitError>
where
    S: MediaStager + ?Sized,
{
    let mut report = StagingReport::default();

    if let Some(file) = recipe.image.pending_file().cloned() {
        let temp_id = stage_one(stager, &MediaSlot::RecipeImage, &file).await?;
        resolve(&mut recipe.image, temp_id.clone());
        report.staged.push((MediaSlot::RecipeImage, temp_id));
    }

    for g in 0..recipe.step_groups.len() {
        for s in 0..recipe.step_groups[g].steps.len() {
            let step = &recipe.step_groups[g].steps[s];
            let Some(file) = step.image.pending_file().cloned() else {
                continue;
            };
            let local = step.identity.local.clone().ok_or(
                PreconditionViolation::MissingIdentity {
                    entity: EntityPath::Step { group: g, index: s },
                },
            )?;

            let slot = MediaSlot::StepImage(local);
            let temp_id = stage_one(stager, &slot, &file).await?;
            resolve(&mut recipe.step_groups[g].steps[s].image, temp_id.clone());
            report.staged.push((slot, temp_id));
        }
    }

    info!(staged = report.len(), "Staged pending media");
    Ok(report)
}

async fn stage_one<S>(
    stager: &S,
    slot: &MediaSlot,
    file: &LocalFile,
) -> Result<TempId, SubmitError>
where
    S: MediaStager + ?Sized,
{
    debug!(%slot, path = %file.path().display(), "Staging upload");
    stager.stage_upload(file).await.map_err(|source| {
        warn!(%slot, error = %source, "Staging failed");
        SubmitError::Staging {
            slot: slot.clone(),
            source,
        }
    })
}

fn resolve(field: &mut ImageField, temp_id: TempId) {
    // The field was pending right before the upload and is borrowed mutably
    // across the await.
    if let Err(e) = field.resolve(temp_id) {
        warn!(error = %e, "Image field changed while staging");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use async_trait::async_trait;
    use recipe_model::{LocalIdGenerator, StepEdit, StepGroupEdit};
    use std::sync::Mutex;

    /// Hands out sequential temp ids, optionally failing on one file name
    struct FakeStager {
        fail_on: Option<&'static str>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeStager {
        fn new(fail_on: Option<&'static str>) -> Self {
            Self {
                fail_on,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MediaStager for FakeStager {
        async fn stage_upload(&self, file: &LocalFile) -> Result<TempId, TransportError> {
            let name = file.file_name().unwrap_or_default().to_string();
            let mut calls = self.calls.lock().unwrap();
            calls.push(name.clone());
            if self.fail_on == Some(name.as_str()) {
                return Err(TransportError::Request("upload rejected".into()));
            }
            Ok(TempId::new(format!("/assets/temp/{}", calls.len())))
        }
    }

    fn recipe_with_images() -> RecipeEdit {
        let mut ids = LocalIdGenerator::new("t");
        let mut recipe = RecipeEdit::new("en", &mut ids);
        recipe.step_groups.push(
            StepGroupEdit::new("en", "Main")
                .with_step(StepEdit::new("en", "One"))
                .with_step(StepEdit::new("en", "Two")),
        );
        recipe.fill_local_ids(&mut ids);
        recipe.image.select(LocalFile::new("cover.png"));
        recipe.step_groups[0].steps[1]
            .image
            .select(LocalFile::new("two.png"));
        recipe
    }

    #[tokio::test]
    async fn test_stages_in_declaration_order() {
        let mut recipe = recipe_with_images();
        let stager = FakeStager::new(None);

        let report = stage_pending_media(&mut recipe, &stager).await.unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(*stager.calls.lock().unwrap(), vec!["cover.png", "two.png"]);
        assert_eq!(
            recipe.image,
            ImageField::ResolvedPending {
                temp_id: TempId::new("/assets/temp/1")
            }
        );
        assert!(recipe.pending_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_failure_leaves_field_pending() {
        let mut recipe = recipe_with_images();
        let stager = FakeStager::new(Some("two.png"));

        let err = stage_pending_media(&mut recipe, &stager).await.unwrap_err();

        let step_local = recipe.step_groups[0].steps[1].identity.local.clone().unwrap();
        assert_eq!(
            err,
            SubmitError::Staging {
                slot: MediaSlot::StepImage(step_local),
                source: TransportError::Request("upload rejected".into()),
            }
        );
        assert!(err.is_retriable());
        // Earlier upload is kept, failing one stays local
        assert!(matches!(recipe.image, ImageField::ResolvedPending { .. }));
        assert!(recipe.step_groups[0].steps[1].image.is_pending_upload());
    }

    #[tokio::test]
    async fn test_nothing_pending_is_a_no_op() {
        let mut ids = LocalIdGenerator::new("t");
        let mut recipe = RecipeEdit::new("en", &mut ids);
        recipe.image = ImageField::from_url(Some("/assets/recipes/a.png"));
        let stager = FakeStager::new(None);

        let report = stage_pending_media(&mut recipe, &stager).await.unwrap();

        assert!(report.is_empty());
        assert!(stager.calls.lock().unwrap().is_empty());
    }
}
