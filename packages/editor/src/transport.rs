//! # Transport Contracts
//!
//! The collaborators a session talks to when it leaves the client. The
//! core never implements these; it only drives them in a fixed order.
//!
//! A submit is two-part: one metadata part carrying the [`RecipePayload`],
//! followed by one media part per staged upload the payload binds. Media
//! parts name their slot by position so the server can attach each temp id
//! to the right entity even when that entity has no server id yet.

use async_trait::async_trait;
use recipe_model::{ImageSlot, LocalFile, RecipePayload, RecipeView, TempId};
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

/// Stages a local file and hands back the server's temporary id
#[async_trait]
pub trait MediaStager: Send + Sync {
    async fn stage_upload(&self, file: &LocalFile) -> Result<TempId, TransportError>;
}

/// Create and update calls for a whole recipe aggregate
#[async_trait]
pub trait RecipeWriter: Send + Sync {
    /// Persist a recipe that has no server id yet
    async fn create(&self, request: SubmitRequest) -> Result<RecipeView, TransportError>;

    /// Replace an existing recipe. The server may answer without a body.
    async fn update(&self, request: SubmitRequest) -> Result<Option<RecipeView>, TransportError>;
}

/// One staged upload bound into the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaPart {
    #[serde(flatten)]
    pub slot: ImageSlot,
    pub temp_id: TempId,
}

/// Create or update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub metadata: RecipePayload,
    #[serde(default)]
    pub media: Vec<MediaPart>,
}

/// One part of a [`SubmitRequest`], in send order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportPart<'a> {
    Metadata(&'a RecipePayload),
    Media(&'a MediaPart),
}

impl SubmitRequest {
    /// Bind every staged image the payload references
    pub fn from_payload(metadata: RecipePayload) -> Self {
        let media = metadata
            .staged_images()
            .into_iter()
            .map(|(slot, temp_id)| MediaPart {
                slot,
                temp_id: temp_id.clone(),
            })
            .collect();

        Self { metadata, media }
    }

    pub fn is_create(&self) -> bool {
        self.metadata.is_create()
    }

    /// Metadata first, then media parts in declaration order
    pub fn parts(&self) -> impl Iterator<Item = TransportPart<'_>> {
        std::iter::once(TransportPart::Metadata(&self.metadata))
            .chain(self.media.iter().map(TransportPart::Media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipe_model::{
        PayloadImage, RecipeText, ServerId, StepGroupPayload, StepPayload, StepText,
        TranslationSet,
    };

    fn payload() -> RecipePayload {
        RecipePayload {
            id: None,
            primary_language: "en".into(),
            translations: TranslationSet::with(
                "en",
                RecipeText {
                    title: "Bread".into(),
                    description: None,
                },
            ),
            image: Some(PayloadImage::Staged {
                temp_id: TempId::new("/assets/temp/recipe_0.png"),
            }),
            servings: 2,
            prep_time_minutes: 20,
            cook_time_minutes: 40,
            author: None,
            author_id: None,
            is_private: false,
            tags: Vec::new(),
            ingredient_groups: Vec::new(),
            step_groups: vec![StepGroupPayload {
                id: Some(ServerId::from("sg-1")),
                position: 0,
                translations: TranslationSet::new(),
                steps: vec![
                    StepPayload {
                        id: None,
                        step_group_id: Some(ServerId::from("sg-1")),
                        position: 0,
                        duration_minutes: None,
                        image: Some(PayloadImage::Remote { url: "/a.png".into() }),
                        translations: TranslationSet::with(
                            "en",
                            StepText {
                                instruction: "Mix".into(),
                            },
                        ),
                    },
                    StepPayload {
                        id: None,
                        step_group_id: Some(ServerId::from("sg-1")),
                        position: 1,
                        duration_minutes: None,
                        image: Some(PayloadImage::Staged {
                            temp_id: TempId::new("/assets/temp/recipe_1.png"),
                        }),
                        translations: TranslationSet::with(
                            "en",
                            StepText {
                                instruction: "Bake".into(),
                            },
                        ),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_media_parts_follow_metadata() {
        let request = SubmitRequest::from_payload(payload());

        let parts: Vec<_> = request.parts().collect();
        assert_eq!(parts.len(), 3);
        assert!(matches!(parts[0], TransportPart::Metadata(_)));

        let slots: Vec<_> = request.media.iter().map(|m| m.slot).collect();
        assert_eq!(
            slots,
            vec![
                ImageSlot::Recipe,
                ImageSlot::Step {
                    group_position: 0,
                    step_position: 1
                }
            ]
        );
    }

    #[test]
    fn test_remote_images_are_not_media_parts() {
        let mut payload = payload();
        payload.image = None;
        payload.step_groups[0].steps[1].image = None;

        let request = SubmitRequest::from_payload(payload);

        assert!(request.media.is_empty());
        assert!(request.is_create());
    }

    #[test]
    fn test_media_part_wire_shape() {
        let part = MediaPart {
            slot: ImageSlot::Step {
                group_position: 1,
                step_position: 0,
            },
            temp_id: TempId::new("t"),
        };

        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "slot": "step",
                "group_position": 1,
                "step_position": 0,
                "temp_id": "t"
            })
        );
    }
}
