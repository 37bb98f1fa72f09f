//! Read-side recipe aggregate, as fetched from the server.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::ServerId;
use crate::tag::Tag;
use crate::translation::{
    GroupText, IngredientText, LanguageCode, RecipeText, Resolved, StepText, TranslationSet,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: ServerId,
    pub primary_language: LanguageCode,
    pub translations: TranslationSet<RecipeText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub servings: u32,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_id: Option<ServerId>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub ingredient_groups: Vec<IngredientGroupView>,
    #[serde(default)]
    pub step_groups: Vec<StepGroupView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientGroupView {
    pub id: ServerId,
    pub position: u32,
    pub translations: TranslationSet<GroupText>,
    #[serde(default)]
    pub ingredients: Vec<IngredientView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientView {
    pub id: ServerId,
    /// Catalog ingredient this line refers to
    #[serde(default)]
    pub ingredient_id: Option<ServerId>,
    pub quantity: f64,
    pub unit_id: ServerId,
    pub position: u32,
    pub translations: TranslationSet<IngredientText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepGroupView {
    pub id: ServerId,
    pub position: u32,
    pub translations: TranslationSet<GroupText>,
    #[serde(default)]
    pub steps: Vec<StepView>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub id: ServerId,
    pub position: u32,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub translations: TranslationSet<StepText>,
}

impl RecipeView {
    /// Title and description in `language`, falling back to the primary language
    pub fn text(&self, language: &LanguageCode) -> Resolved<'_, RecipeText> {
        self.translations.resolve(language, &self.primary_language)
    }

    pub fn step_count(&self) -> usize {
        self.step_groups.iter().map(|g| g.steps.len()).sum()
    }

    pub fn ingredient_count(&self) -> usize {
        self.ingredient_groups.iter().map(|g| g.ingredients.len()).sum()
    }
}
