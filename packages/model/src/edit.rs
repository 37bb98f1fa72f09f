//! # Editable Recipe
//!
//! The canonical, client-side form of a recipe during an edit session.
//! Every entity carries an [`Identity`]; collections are ordered by array
//! index and their `position` fields are kept contiguous by the structural
//! operations in [`crate::position`].

use serde::{Deserialize, Serialize};

use crate::identity::{Identity, LocalId, LocalIdGenerator, ServerId};
use crate::media::{ImageField, LocalFile};
use crate::position::Positioned;
use crate::tag::TagRef;
use crate::translation::{
    GroupText, IngredientText, LanguageCode, RecipeText, StepText, TranslationSet,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeEdit {
    pub identity: Identity,
    pub primary_language: LanguageCode,
    pub translations: TranslationSet<RecipeText>,
    #[serde(default)]
    pub image: ImageField,
    pub servings: u32,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_id: Option<ServerId>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub tags: Vec<TagRef>,
    #[serde(default)]
    pub ingredient_groups: Vec<IngredientGroupEdit>,
    #[serde(default)]
    pub step_groups: Vec<StepGroupEdit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientGroupEdit {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub position: u32,
    pub translations: TranslationSet<GroupText>,
    #[serde(default)]
    pub ingredients: Vec<IngredientEdit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientEdit {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub ingredient_id: Option<ServerId>,
    pub quantity: f64,
    pub unit_id: ServerId,
    #[serde(default)]
    pub position: u32,
    pub translations: TranslationSet<IngredientText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepGroupEdit {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub position: u32,
    pub translations: TranslationSet<GroupText>,
    #[serde(default)]
    pub steps: Vec<StepEdit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEdit {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub image: ImageField,
    pub translations: TranslationSet<StepText>,
}

/// Scalar attributes of the recipe root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub servings: u32,
    pub prep_time_minutes: u32,
    pub cook_time_minutes: u32,
    pub is_private: bool,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub author_id: Option<ServerId>,
}

macro_rules! positioned {
    ($($ty:ty),*) => {
        $(
            impl Positioned for $ty {
                fn position(&self) -> u32 {
                    self.position
                }

                fn set_position(&mut self, position: u32) {
                    self.position = position;
                }
            }
        )*
    };
}

positioned!(IngredientGroupEdit, IngredientEdit, StepGroupEdit, StepEdit);

impl RecipeEdit {
    /// Empty recipe for the create flow
    pub fn new(primary_language: impl Into<LanguageCode>, ids: &mut LocalIdGenerator) -> Self {
        Self {
            identity: Identity::fresh(ids.materialize()),
            primary_language: primary_language.into(),
            translations: TranslationSet::new(),
            image: ImageField::Absent,
            servings: 1,
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            author: None,
            author_id: None,
            is_private: false,
            tags: Vec::new(),
            ingredient_groups: Vec::new(),
            step_groups: Vec::new(),
        }
    }

    pub fn details(&self) -> RecipeDetails {
        RecipeDetails {
            servings: self.servings,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            is_private: self.is_private,
            author: self.author.clone(),
            author_id: self.author_id.clone(),
        }
    }

    pub fn set_details(&mut self, details: RecipeDetails) -> RecipeDetails {
        let previous = self.details();
        self.servings = details.servings;
        self.prep_time_minutes = details.prep_time_minutes;
        self.cook_time_minutes = details.cook_time_minutes;
        self.is_private = details.is_private;
        self.author = details.author;
        self.author_id = details.author_id;
        previous
    }

    pub fn ingredient_group_index(&self, id: &LocalId) -> Option<usize> {
        self.ingredient_groups.iter().position(|g| g.identity.matches(id))
    }

    pub fn step_group_index(&self, id: &LocalId) -> Option<usize> {
        self.step_groups.iter().position(|g| g.identity.matches(id))
    }

    /// (group index, ingredient index) of an ingredient
    pub fn locate_ingredient(&self, id: &LocalId) -> Option<(usize, usize)> {
        self.ingredient_groups.iter().enumerate().find_map(|(g, group)| {
            group
                .ingredients
                .iter()
                .position(|i| i.identity.matches(id))
                .map(|i| (g, i))
        })
    }

    /// (group index, step index) of a step
    pub fn locate_step(&self, id: &LocalId) -> Option<(usize, usize)> {
        self.step_groups.iter().enumerate().find_map(|(g, group)| {
            group
                .steps
                .iter()
                .position(|s| s.identity.matches(id))
                .map(|s| (g, s))
        })
    }

    /// Whether any entity of the recipe, nested ones included, carries `id`
    pub fn contains_local(&self, id: &LocalId) -> bool {
        self.identity.matches(id)
            || self.ingredient_groups.iter().any(|g| {
                g.identity.matches(id) || g.ingredients.iter().any(|i| i.identity.matches(id))
            })
            || self.step_groups.iter().any(|g| {
                g.identity.matches(id) || g.steps.iter().any(|s| s.identity.matches(id))
            })
    }

    pub fn step_mut(&mut self, id: &LocalId) -> Option<&mut StepEdit> {
        let (g, s) = self.locate_step(id)?;
        Some(&mut self.step_groups[g].steps[s])
    }

    /// Materialize a local id on every entity that lacks one
    pub fn fill_local_ids(&mut self, ids: &mut LocalIdGenerator) {
        self.identity.ensure_local(ids);
        for group in &mut self.ingredient_groups {
            group.fill_local_ids(ids);
        }
        for group in &mut self.step_groups {
            group.fill_local_ids(ids);
        }
    }

    /// Image fields holding a local file that still has to be staged, in
    /// declaration order: the recipe image first, then steps in list order
    pub fn pending_uploads(&self) -> Vec<(Option<&LocalId>, &LocalFile)> {
        let mut pending = Vec::new();
        if let Some(file) = self.image.pending_file() {
            pending.push((None, file));
        }
        for group in &self.step_groups {
            for step in &group.steps {
                if let Some(file) = step.image.pending_file() {
                    pending.push((step.identity.local.as_ref(), file));
                }
            }
        }
        pending
    }
}

impl IngredientGroupEdit {
    pub fn new(language: impl Into<LanguageCode>, title: impl Into<String>) -> Self {
        Self {
            identity: Identity::default(),
            position: 0,
            translations: TranslationSet::with(language, GroupText { title: title.into() }),
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredient(mut self, ingredient: IngredientEdit) -> Self {
        self.ingredients.push(ingredient);
        crate::position::assign_positions(&mut self.ingredients);
        self
    }

    pub fn fill_local_ids(&mut self, ids: &mut LocalIdGenerator) {
        self.identity.ensure_local(ids);
        for ingredient in &mut self.ingredients {
            ingredient.identity.ensure_local(ids);
        }
    }
}

impl IngredientEdit {
    pub fn new(quantity: f64, unit_id: impl Into<ServerId>) -> Self {
        Self {
            identity: Identity::default(),
            ingredient_id: None,
            quantity,
            unit_id: unit_id.into(),
            position: 0,
            translations: TranslationSet::new(),
        }
    }

    pub fn named(mut self, language: impl Into<LanguageCode>, name: impl Into<String>) -> Self {
        self.translations.upsert(
            language,
            IngredientText {
                name: name.into(),
                note: None,
            },
        );
        self
    }
}

impl StepGroupEdit {
    pub fn new(language: impl Into<LanguageCode>, title: impl Into<String>) -> Self {
        Self {
            identity: Identity::default(),
            position: 0,
            translations: TranslationSet::with(language, GroupText { title: title.into() }),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: StepEdit) -> Self {
        self.steps.push(step);
        crate::position::assign_positions(&mut self.steps);
        self
    }

    pub fn fill_local_ids(&mut self, ids: &mut LocalIdGenerator) {
        self.identity.ensure_local(ids);
        for step in &mut self.steps {
            step.identity.ensure_local(ids);
        }
    }
}

impl StepEdit {
    pub fn new(language: impl Into<LanguageCode>, instruction: impl Into<String>) -> Self {
        Self {
            identity: Identity::default(),
            position: 0,
            duration_minutes: None,
            image: ImageField::Absent,
            translations: TranslationSet::with(
                language,
                StepText {
                    instruction: instruction.into(),
                },
            ),
        }
    }
}
