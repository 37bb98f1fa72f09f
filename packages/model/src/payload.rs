//! Write-side recipe payload, as sent to the create and update calls.
//!
//! Entities carry their server id when they already exist and omit it when
//! they are to be created. Array order is authoritative: `position` always
//! equals the array index.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::identity::ServerId;
use crate::media::{PayloadImage, TempId};
use crate::tag::TagRef;
use crate::translation::{
    GroupText, IngredientText, LanguageCode, RecipeText, StepText, TranslationSet,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub primary_language: LanguageCode,
    pub translations: TranslationSet<RecipeText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PayloadImage>,
    pub servings: u32,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub author: Option<String>,
    pub author_id: Option<ServerId>,
    pub is_private: bool,
    pub tags: Vec<TagRef>,
    pub ingredient_groups: Vec<IngredientGroupPayload>,
    pub step_groups: Vec<StepGroupPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientGroupPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub position: u32,
    pub translations: TranslationSet<GroupText>,
    pub ingredients: Vec<IngredientPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_id: Option<ServerId>,
    pub quantity: f64,
    pub unit_id: ServerId,
    pub position: u32,
    pub translations: TranslationSet<IngredientText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepGroupPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub position: u32,
    pub translations: TranslationSet<GroupText>,
    pub steps: Vec<StepPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    /// Server id of the owning group, when that group already exists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_group_id: Option<ServerId>,
    pub position: u32,
    pub duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PayloadImage>,
    pub translations: TranslationSet<StepText>,
}

/// Where a staged image is bound inside a payload, by position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "slot", rename_all = "snake_case")]
pub enum ImageSlot {
    Recipe,
    Step { group_position: u32, step_position: u32 },
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSlot::Recipe => write!(f, "recipe image"),
            ImageSlot::Step {
                group_position,
                step_position,
            } => write!(f, "image of step {} in group {}", step_position, group_position),
        }
    }
}

impl RecipePayload {
    pub fn is_create(&self) -> bool {
        self.id.is_none()
    }

    /// Staged uploads referenced by this payload, in declaration order
    pub fn staged_images(&self) -> Vec<(ImageSlot, &TempId)> {
        let mut staged = Vec::new();
        if let Some(PayloadImage::Staged { temp_id }) = &self.image {
            staged.push((ImageSlot::Recipe, temp_id));
        }
        for group in &self.step_groups {
            for step in &group.steps {
                if let Some(PayloadImage::Staged { temp_id }) = &step.image {
                    staged.push((
                        ImageSlot::Step {
                            group_position: group.position,
                            step_position: step.position,
                        },
                        temp_id,
                    ));
                }
            }
        }
        staged
    }
}
