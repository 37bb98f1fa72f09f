//! # Recipe Mutations
//!
//! Semantic edits on a [`RecipeEdit`].
//!
//! ## Design Principles
//!
//! 1. **Addressed by local id**: entities are found by their session-local
//!    id, never by array index, so a mutation stays valid while other rows
//!    move around it
//! 2. **Validated**: a mutation that fails leaves the recipe untouched
//! 3. **Invertible**: applying a mutation returns the mutation that undoes it
//! 4. **Contiguous**: every structural edit renumbers the collections it
//!    touches
//!
//! ## Mutation Semantics
//!
//! ### Insert
//! - Index is clamped to the end of the collection
//! - The inserted entity must already carry a local id
//!
//! ### Move
//! - Ingredients and steps may move to another group of the same kind
//! - Group moves require an index inside the collection
//!
//! ### Translations
//! - Setting a translation replaces the entry for that language in place
//! - The primary language can never be removed

use recipe_model::{
    assign_positions, insert_at, move_to, remove_at, GroupText, Identity, ImageField,
    IngredientEdit, IngredientGroupEdit, IngredientText, LanguageCode, LocalId, LocalIdGenerator,
    PositionError, RecipeDetails, RecipeEdit, RecipeText, ServerId, StepEdit, StepGroupEdit,
    StepText, TagRef, Translation, TranslationSet,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic mutations on an editable recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    InsertIngredientGroup {
        index: usize,
        group: IngredientGroupEdit,
    },

    RemoveIngredientGroup {
        group_id: LocalId,
    },

    MoveIngredientGroup {
        group_id: LocalId,
        index: usize,
    },

    InsertIngredient {
        group_id: LocalId,
        index: usize,
        ingredient: IngredientEdit,
    },

    RemoveIngredient {
        ingredient_id: LocalId,
    },

    /// Move an ingredient to `index` inside `group_id`, which may be a
    /// different group than the one it is in
    MoveIngredient {
        ingredient_id: LocalId,
        group_id: LocalId,
        index: usize,
    },

    UpdateQuantity {
        ingredient_id: LocalId,
        quantity: f64,
        unit_id: ServerId,
    },

    InsertStepGroup {
        index: usize,
        group: StepGroupEdit,
    },

    RemoveStepGroup {
        group_id: LocalId,
    },

    MoveStepGroup {
        group_id: LocalId,
        index: usize,
    },

    InsertStep {
        group_id: LocalId,
        index: usize,
        step: StepEdit,
    },

    RemoveStep {
        step_id: LocalId,
    },

    MoveStep {
        step_id: LocalId,
        group_id: LocalId,
        index: usize,
    },

    SetStepDuration {
        step_id: LocalId,
        duration_minutes: Option<u32>,
    },

    /// Insert or replace the translation for `language`
    SetTranslation {
        target: EntityRef,
        language: LanguageCode,
        text: EntityText,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        translation_id: Option<ServerId>,
    },

    RemoveTranslation {
        target: EntityRef,
        language: LanguageCode,
    },

    /// Put a translation back into a recorded state, `None` meaning absent.
    /// Unlike `RemoveTranslation` this may clear the primary language, which
    /// is what undoing the first primary-language entry requires.
    RestoreTranslation {
        target: EntityRef,
        language: LanguageCode,
        snapshot: Option<TranslationSnapshot>,
    },

    SetImage {
        target: ImageTarget,
        image: ImageField,
    },

    AddTag {
        index: usize,
        tag: TagRef,
    },

    RemoveTag {
        index: usize,
    },

    UpdateDetails {
        details: RecipeDetails,
    },
}

/// Entity that owns a translation set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Recipe,
    IngredientGroup(LocalId),
    Ingredient(LocalId),
    StepGroup(LocalId),
    Step(LocalId),
}

/// Translatable fields of one entity kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityText {
    Recipe(RecipeText),
    Group(GroupText),
    Ingredient(IngredientText),
    Step(StepText),
}

/// A translation entry as it was before a change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub text: EntityText,
}

/// Entity that owns an image field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ImageTarget {
    Recipe,
    Step(LocalId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Entity not found: {0}")]
    NotFound(LocalId),

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error("Cannot put {text} text on {target}")]
    TextKindMismatch {
        target: &'static str,
        text: &'static str,
    },

    #[error("Cannot remove the primary language '{0}'")]
    PrimaryLanguageRemoval(LanguageCode),

    #[error("{target} has no '{language}' translation")]
    TranslationNotFound {
        target: &'static str,
        language: LanguageCode,
    },

    #[error("Inserted {0} has no local id")]
    MissingLocalId(&'static str),

    #[error("Local id {0} is already in use")]
    DuplicateLocalId(LocalId),

    #[error("Local id {0} was not issued by this session")]
    ForeignLocalId(LocalId),

    #[error("Tag is already attached to the recipe")]
    DuplicateTag,
}

impl EntityRef {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityRef::Recipe => "recipe",
            EntityRef::IngredientGroup(_) => "ingredient group",
            EntityRef::Ingredient(_) => "ingredient",
            EntityRef::StepGroup(_) => "step group",
            EntityRef::Step(_) => "step",
        }
    }

    /// Whether `text` is the right kind of fields for this entity
    pub fn accepts(&self, text: &EntityText) -> bool {
        matches!(
            (self, text),
            (EntityRef::Recipe, EntityText::Recipe(_))
                | (EntityRef::IngredientGroup(_), EntityText::Group(_))
                | (EntityRef::StepGroup(_), EntityText::Group(_))
                | (EntityRef::Ingredient(_), EntityText::Ingredient(_))
                | (EntityRef::Step(_), EntityText::Step(_))
        )
    }

    fn has_translation(
        &self,
        recipe: &RecipeEdit,
        language: &LanguageCode,
    ) -> Result<bool, MutationError> {
        Ok(match self {
            EntityRef::Recipe => recipe.translations.get(language).is_some(),
            EntityRef::IngredientGroup(id) => {
                let g = ingredient_group(recipe, id)?;
                recipe.ingredient_groups[g].translations.get(language).is_some()
            }
            EntityRef::Ingredient(id) => {
                let (g, i) = ingredient(recipe, id)?;
                recipe.ingredient_groups[g].ingredients[i]
                    .translations
                    .get(language)
                    .is_some()
            }
            EntityRef::StepGroup(id) => {
                let g = step_group(recipe, id)?;
                recipe.step_groups[g].translations.get(language).is_some()
            }
            EntityRef::Step(id) => {
                let (g, s) = step(recipe, id)?;
                recipe.step_groups[g].steps[s]
                    .translations
                    .get(language)
                    .is_some()
            }
        })
    }
}

impl EntityText {
    pub fn kind(&self) -> &'static str {
        match self {
            EntityText::Recipe(_) => "recipe",
            EntityText::Group(_) => "group",
            EntityText::Ingredient(_) => "ingredient",
            EntityText::Step(_) => "step",
        }
    }
}

/// Ties each text type to its [`EntityText`] variant
trait TextKind: Clone {
    fn from_text(text: &EntityText) -> Option<&Self>;
    fn into_text(self) -> EntityText;
}

macro_rules! text_kind {
    ($($ty:ty => $variant:ident),*) => {
        $(
            impl TextKind for $ty {
                fn from_text(text: &EntityText) -> Option<&Self> {
                    match text {
                        EntityText::$variant(fields) => Some(fields),
                        _ => None,
                    }
                }

                fn into_text(self) -> EntityText {
                    EntityText::$variant(self)
                }
            }
        )*
    };
}

text_kind!(
    RecipeText => Recipe,
    GroupText => Group,
    IngredientText => Ingredient,
    StepText => Step
);

/// Run `$body` with `$set` bound to the translation set of `$target`
macro_rules! with_translations {
    ($recipe:ident, $target:expr, |$set:ident| $body:expr) => {
        match $target {
            EntityRef::Recipe => {
                let $set = &mut $recipe.translations;
                $body
            }
            EntityRef::IngredientGroup(id) => {
                let g = ingredient_group($recipe, id)?;
                let $set = &mut $recipe.ingredient_groups[g].translations;
                $body
            }
            EntityRef::Ingredient(id) => {
                let (g, i) = ingredient($recipe, id)?;
                let $set = &mut $recipe.ingredient_groups[g].ingredients[i].translations;
                $body
            }
            EntityRef::StepGroup(id) => {
                let g = step_group($recipe, id)?;
                let $set = &mut $recipe.step_groups[g].translations;
                $body
            }
            EntityRef::Step(id) => {
                let (g, s) = step($recipe, id)?;
                let $set = &mut $recipe.step_groups[g].steps[s].translations;
                $body
            }
        }
    };
}

impl Mutation {
    /// Apply to the recipe and return the inverse mutation
    pub fn apply(&self, recipe: &mut RecipeEdit) -> Result<Mutation, MutationError> {
        self.validate(recipe)?;

        match self {
            Mutation::InsertIngredientGroup { index, group } => {
                let group_id = require_local(&group.identity, "ingredient group")?;
                let mut group = group.clone();
                assign_positions(&mut group.ingredients);
                insert_at(&mut recipe.ingredient_groups, *index, group);
                Ok(Mutation::RemoveIngredientGroup { group_id })
            }

            Mutation::RemoveIngredientGroup { group_id } => {
                let g = ingredient_group(recipe, group_id)?;
                let group = remove_at(&mut recipe.ingredient_groups, g)?;
                Ok(Mutation::InsertIngredientGroup { index: g, group })
            }

            Mutation::MoveIngredientGroup { group_id, index } => {
                let g = ingredient_group(recipe, group_id)?;
                move_to(&mut recipe.ingredient_groups, g, *index)?;
                Ok(Mutation::MoveIngredientGroup {
                    group_id: group_id.clone(),
                    index: g,
                })
            }

            Mutation::InsertIngredient {
                group_id,
                index,
                ingredient: new_ingredient,
            } => {
                let ingredient_id = require_local(&new_ingredient.identity, "ingredient")?;
                let g = ingredient_group(recipe, group_id)?;
                insert_at(
                    &mut recipe.ingredient_groups[g].ingredients,
                    *index,
                    new_ingredient.clone(),
                );
                Ok(Mutation::RemoveIngredient { ingredient_id })
            }

            Mutation::RemoveIngredient { ingredient_id } => {
                let (g, i) = ingredient(recipe, ingredient_id)?;
                let group_id =
                    require_local(&recipe.ingredient_groups[g].identity, "ingredient group")?;
                let removed = remove_at(&mut recipe.ingredient_groups[g].ingredients, i)?;
                Ok(Mutation::InsertIngredient {
                    group_id,
                    index: i,
                    ingredient: removed,
                })
            }

            Mutation::MoveIngredient {
                ingredient_id,
                group_id,
                index,
            } => {
                let (from, i) = ingredient(recipe, ingredient_id)?;
                let to = ingredient_group(recipe, group_id)?;
                let source =
                    require_local(&recipe.ingredient_groups[from].identity, "ingredient group")?;

                let moved = remove_at(&mut recipe.ingredient_groups[from].ingredients, i)?;
                insert_at(&mut recipe.ingredient_groups[to].ingredients, *index, moved);

                Ok(Mutation::MoveIngredient {
                    ingredient_id: ingredient_id.clone(),
                    group_id: source,
                    index: i,
                })
            }

            Mutation::UpdateQuantity {
                ingredient_id,
                quantity,
                unit_id,
            } => {
                let (g, i) = ingredient(recipe, ingredient_id)?;
                let target = &mut recipe.ingredient_groups[g].ingredients[i];
                let previous_quantity = std::mem::replace(&mut target.quantity, *quantity);
                let previous_unit = std::mem::replace(&mut target.unit_id, unit_id.clone());
                Ok(Mutation::UpdateQuantity {
                    ingredient_id: ingredient_id.clone(),
                    quantity: previous_quantity,
                    unit_id: previous_unit,
                })
            }

            Mutation::InsertStepGroup { index, group } => {
                let group_id = require_local(&group.identity, "step group")?;
                let mut group = group.clone();
                assign_positions(&mut group.steps);
                insert_at(&mut recipe.step_groups, *index, group);
                Ok(Mutation::RemoveStepGroup { group_id })
            }

            Mutation::RemoveStepGroup { group_id } => {
                let g = step_group(recipe, group_id)?;
                let group = remove_at(&mut recipe.step_groups, g)?;
                Ok(Mutation::InsertStepGroup { index: g, group })
            }

            Mutation::MoveStepGroup { group_id, index } => {
                let g = step_group(recipe, group_id)?;
                move_to(&mut recipe.step_groups, g, *index)?;
                Ok(Mutation::MoveStepGroup {
                    group_id: group_id.clone(),
                    index: g,
                })
            }

            Mutation::InsertStep {
                group_id,
                index,
                step: new_step,
            } => {
                let step_id = require_local(&new_step.identity, "step")?;
                let g = step_group(recipe, group_id)?;
                insert_at(&mut recipe.step_groups[g].steps, *index, new_step.clone());
                Ok(Mutation::RemoveStep { step_id })
            }

            Mutation::RemoveStep { step_id } => {
                let (g, s) = step(recipe, step_id)?;
                let group_id = require_local(&recipe.step_groups[g].identity, "step group")?;
                let removed = remove_at(&mut recipe.step_groups[g].steps, s)?;
                Ok(Mutation::InsertStep {
                    group_id,
                    index: s,
                    step: removed,
                })
            }

            Mutation::MoveStep {
                step_id,
                group_id,
                index,
            } => {
                let (from, s) = step(recipe, step_id)?;
                let to = step_group(recipe, group_id)?;
                let source = require_local(&recipe.step_groups[from].identity, "step group")?;

                let moved = remove_at(&mut recipe.step_groups[from].steps, s)?;
                insert_at(&mut recipe.step_groups[to].steps, *index, moved);

                Ok(Mutation::MoveStep {
                    step_id: step_id.clone(),
                    group_id: source,
                    index: s,
                })
            }

            Mutation::SetStepDuration {
                step_id,
                duration_minutes,
            } => {
                let target = recipe.step_mut(step_id).ok_or_else(|| not_found(step_id))?;
                let previous = std::mem::replace(&mut target.duration_minutes, *duration_minutes);
                Ok(Mutation::SetStepDuration {
                    step_id: step_id.clone(),
                    duration_minutes: previous,
                })
            }

            Mutation::SetTranslation {
                target,
                language,
                text,
                translation_id,
            } => {
                let next = TranslationSnapshot {
                    id: translation_id.clone(),
                    text: text.clone(),
                };
                let previous = with_translations!(recipe, target, |set| {
                    replace_translation(set, target, language, Some(&next))
                })?;
                Ok(Mutation::RestoreTranslation {
                    target: target.clone(),
                    language: language.clone(),
                    snapshot: previous,
                })
            }

            Mutation::RemoveTranslation { target, language } => {
                let previous = with_translations!(recipe, target, |set| {
                    replace_translation(set, target, language, None)
                })?;
                let previous = previous.ok_or_else(|| MutationError::TranslationNotFound {
                    target: target.kind(),
                    language: language.clone(),
                })?;
                Ok(Mutation::SetTranslation {
                    target: target.clone(),
                    language: language.clone(),
                    text: previous.text,
                    translation_id: previous.id,
                })
            }

            Mutation::RestoreTranslation {
                target,
                language,
                snapshot,
            } => {
                let previous = with_translations!(recipe, target, |set| {
                    replace_translation(set, target, language, snapshot.as_ref())
                })?;
                Ok(Mutation::RestoreTranslation {
                    target: target.clone(),
                    language: language.clone(),
                    snapshot: previous,
                })
            }

            Mutation::SetImage { target, image } => {
                let field = match target {
                    ImageTarget::Recipe => &mut recipe.image,
                    ImageTarget::Step(id) => {
                        &mut recipe.step_mut(id).ok_or_else(|| not_found(id))?.image
                    }
                };
                let previous = std::mem::replace(field, image.clone());
                Ok(Mutation::SetImage {
                    target: target.clone(),
                    image: previous,
                })
            }

            Mutation::AddTag { index, tag } => {
                let index = (*index).min(recipe.tags.len());
                recipe.tags.insert(index, tag.clone());
                Ok(Mutation::RemoveTag { index })
            }

            Mutation::RemoveTag { index } => {
                let tag = recipe.tags.remove(*index);
                Ok(Mutation::AddTag { index: *index, tag })
            }

            Mutation::UpdateDetails { details } => Ok(Mutation::UpdateDetails {
                details: recipe.set_details(details.clone()),
            }),
        }
    }

    /// Validate without applying
    pub fn validate(&self, recipe: &RecipeEdit) -> Result<(), MutationError> {
        check_unique_locals(&self.inserted_local_ids(), recipe)?;

        match self {
            Mutation::InsertIngredientGroup { group, .. } => {
                require_local(&group.identity, "ingredient group")?;
            }

            Mutation::RemoveIngredientGroup { group_id } => {
                ingredient_group(recipe, group_id)?;
            }

            Mutation::MoveIngredientGroup { group_id, index } => {
                ingredient_group(recipe, group_id)?;
                check_index(*index, recipe.ingredient_groups.len())?;
            }

            Mutation::InsertIngredient {
                group_id,
                ingredient: new_ingredient,
                ..
            } => {
                require_local(&new_ingredient.identity, "ingredient")?;
                ingredient_group(recipe, group_id)?;
            }

            Mutation::RemoveIngredient { ingredient_id }
            | Mutation::UpdateQuantity { ingredient_id, .. } => {
                ingredient(recipe, ingredient_id)?;
            }

            Mutation::MoveIngredient {
                ingredient_id,
                group_id,
                ..
            } => {
                ingredient(recipe, ingredient_id)?;
                ingredient_group(recipe, group_id)?;
            }

            Mutation::InsertStepGroup { group, .. } => {
                require_local(&group.identity, "step group")?;
            }

            Mutation::RemoveStepGroup { group_id } => {
                step_group(recipe, group_id)?;
            }

            Mutation::MoveStepGroup { group_id, index } => {
                step_group(recipe, group_id)?;
                check_index(*index, recipe.step_groups.len())?;
            }

            Mutation::InsertStep {
                group_id,
                step: new_step,
                ..
            } => {
                require_local(&new_step.identity, "step")?;
                step_group(recipe, group_id)?;
            }

            Mutation::RemoveStep { step_id } | Mutation::SetStepDuration { step_id, .. } => {
                step(recipe, step_id)?;
            }

            Mutation::MoveStep {
                step_id, group_id, ..
            } => {
                step(recipe, step_id)?;
                step_group(recipe, group_id)?;
            }

            Mutation::SetTranslation { target, text, .. } => {
                check_text_kind(target, text)?;
                target.has_translation(recipe, &recipe.primary_language)?;
            }

            Mutation::RemoveTranslation { target, language } => {
                if *language == recipe.primary_language {
                    return Err(MutationError::PrimaryLanguageRemoval(language.clone()));
                }
                if !target.has_translation(recipe, language)? {
                    return Err(MutationError::TranslationNotFound {
                        target: target.kind(),
                        language: language.clone(),
                    });
                }
            }

            Mutation::RestoreTranslation {
                target, snapshot, ..
            } => {
                if let Some(snapshot) = snapshot {
                    check_text_kind(target, &snapshot.text)?;
                }
                target.has_translation(recipe, &recipe.primary_language)?;
            }

            Mutation::SetImage { target, .. } => {
                if let ImageTarget::Step(id) = target {
                    step(recipe, id)?;
                }
            }

            Mutation::AddTag { tag, .. } => {
                if recipe.tags.contains(tag) {
                    return Err(MutationError::DuplicateTag);
                }
            }

            Mutation::RemoveTag { index } => {
                check_index(*index, recipe.tags.len())?;
            }

            Mutation::UpdateDetails { .. } => {}
        }

        Ok(())
    }

    /// Give every entity this mutation inserts a local id
    pub fn fill_local_ids(&mut self, ids: &mut LocalIdGenerator) {
        match self {
            Mutation::InsertIngredientGroup { group, .. } => group.fill_local_ids(ids),
            Mutation::InsertIngredient { ingredient, .. } => {
                ingredient.identity.ensure_local(ids);
            }
            Mutation::InsertStepGroup { group, .. } => group.fill_local_ids(ids),
            Mutation::InsertStep { step, .. } => {
                step.identity.ensure_local(ids);
            }
            _ => {}
        }
    }

    /// Local ids carried by the entities this mutation inserts, nested
    /// children included
    pub fn inserted_local_ids(&self) -> Vec<&LocalId> {
        let identities: Vec<&Identity> = match self {
            Mutation::InsertIngredientGroup { group, .. } => std::iter::once(&group.identity)
                .chain(group.ingredients.iter().map(|i| &i.identity))
                .collect(),
            Mutation::InsertIngredient { ingredient, .. } => vec![&ingredient.identity],
            Mutation::InsertStepGroup { group, .. } => std::iter::once(&group.identity)
                .chain(group.steps.iter().map(|s| &s.identity))
                .collect(),
            Mutation::InsertStep { step, .. } => vec![&step.identity],
            _ => Vec::new(),
        };
        identities
            .into_iter()
            .filter_map(|identity| identity.local.as_ref())
            .collect()
    }

    /// Short human-readable name, used for history descriptions and logs
    pub fn label(&self) -> &'static str {
        match self {
            Mutation::InsertIngredientGroup { .. } => "Add ingredient group",
            Mutation::RemoveIngredientGroup { .. } => "Remove ingredient group",
            Mutation::MoveIngredientGroup { .. } => "Move ingredient group",
            Mutation::InsertIngredient { .. } => "Add ingredient",
            Mutation::RemoveIngredient { .. } => "Remove ingredient",
            Mutation::MoveIngredient { .. } => "Move ingredient",
            Mutation::UpdateQuantity { .. } => "Change quantity",
            Mutation::InsertStepGroup { .. } => "Add step group",
            Mutation::RemoveStepGroup { .. } => "Remove step group",
            Mutation::MoveStepGroup { .. } => "Move step group",
            Mutation::InsertStep { .. } => "Add step",
            Mutation::RemoveStep { .. } => "Remove step",
            Mutation::MoveStep { .. } => "Move step",
            Mutation::SetStepDuration { .. } => "Change step duration",
            Mutation::SetTranslation { .. } => "Edit translation",
            Mutation::RemoveTranslation { .. } => "Remove translation",
            Mutation::RestoreTranslation { .. } => "Restore translation",
            Mutation::SetImage { .. } => "Change image",
            Mutation::AddTag { .. } => "Add tag",
            Mutation::RemoveTag { .. } => "Remove tag",
            Mutation::UpdateDetails { .. } => "Edit details",
        }
    }
}

fn not_found(id: &LocalId) -> MutationError {
    MutationError::NotFound(id.clone())
}

fn require_local(identity: &Identity, kind: &'static str) -> Result<LocalId, MutationError> {
    identity.local.clone().ok_or(MutationError::MissingLocalId(kind))
}

/// Inserted ids must not be in the recipe already, nor repeat each other
fn check_unique_locals(ids: &[&LocalId], recipe: &RecipeEdit) -> Result<(), MutationError> {
    for (i, id) in ids.iter().enumerate() {
        if recipe.contains_local(id) || ids[..i].contains(id) {
            return Err(MutationError::DuplicateLocalId((*id).clone()));
        }
    }
    Ok(())
}

fn check_index(index: usize, len: usize) -> Result<(), MutationError> {
    if index < len {
        Ok(())
    } else {
        Err(PositionError::OutOfBounds { index, len }.into())
    }
}

fn check_text_kind(target: &EntityRef, text: &EntityText) -> Result<(), MutationError> {
    if target.accepts(text) {
        Ok(())
    } else {
        Err(MutationError::TextKindMismatch {
            target: target.kind(),
            text: text.kind(),
        })
    }
}

fn ingredient_group(recipe: &RecipeEdit, id: &LocalId) -> Result<usize, MutationError> {
    recipe.ingredient_group_index(id).ok_or_else(|| not_found(id))
}

fn ingredient(recipe: &RecipeEdit, id: &LocalId) -> Result<(usize, usize), MutationError> {
    recipe.locate_ingredient(id).ok_or_else(|| not_found(id))
}

fn step_group(recipe: &RecipeEdit, id: &LocalId) -> Result<usize, MutationError> {
    recipe.step_group_index(id).ok_or_else(|| not_found(id))
}

fn step(recipe: &RecipeEdit, id: &LocalId) -> Result<(usize, usize), MutationError> {
    recipe.locate_step(id).ok_or_else(|| not_found(id))
}

/// Set the entry for `language` to `next` (or drop it) and return what was
/// there. A replacement without an id keeps the id of the entry it replaces.
fn replace_translation<F: TextKind>(
    set: &mut TranslationSet<F>,
    target: &EntityRef,
    language: &LanguageCode,
    next: Option<&TranslationSnapshot>,
) -> Result<Option<TranslationSnapshot>, MutationError> {
    let next = match next {
        Some(snapshot) => {
            let fields = F::from_text(&snapshot.text).ok_or(MutationError::TextKindMismatch {
                target: target.kind(),
                text: snapshot.text.kind(),
            })?;
            Some((snapshot.id.clone(), fields.clone()))
        }
        None => None,
    };

    let previous = set.entry(language).cloned();

    match next {
        Some((id, fields)) => {
            let id = id.or_else(|| previous.as_ref().and_then(|p| p.id.clone()));
            set.restore(Translation {
                id,
                language_code: language.clone(),
                fields,
            });
        }
        None => {
            set.remove(language);
        }
    }

    Ok(previous.map(|p| TranslationSnapshot {
        id: p.id,
        text: p.fields.into_text(),
    }))
}
