//! # Aggregate Mapper
//!
//! Pure projections between the three recipe shapes.
//!
//! ```text
//! RecipeView ──view_to_edit──▶ RecipeEdit ──edit_to_payload──▶ RecipePayload
//! ```
//!
//! `view_to_edit` orders collections by their stored `position`, gives every
//! entity a local id, and turns tags into `Existing` references.
//!
//! `edit_to_payload` strips local ids, recomputes every `position` from
//! array order, and refuses recipes that still hold an unstaged image or
//! lack a primary-language translation anywhere.

use recipe_model::{
    EntityPath, Identity, ImageField, IncompleteAggregate, IngredientEdit, IngredientGroupEdit,
    IngredientGroupPayload, IngredientPayload, LocalIdGenerator, MissingTranslation, RecipeEdit,
    RecipePayload, RecipeView, StepEdit, StepGroupEdit, StepGroupPayload, StepPayload, TagRef,
};
use tracing::{debug, instrument};

use crate::errors::MapError;

/// Project a fetched recipe into editable state
#[instrument(skip_all, fields(recipe = %view.id))]
pub fn view_to_edit(view: &RecipeView, ids: &mut LocalIdGenerator) -> RecipeEdit {
    let identity = Identity::persisted(view.id.clone(), ids.materialize());

    let mut ingredient_groups: Vec<_> = view.ingredient_groups.iter().collect();
    ingredient_groups.sort_by_key(|g| g.position);

    let ingredient_groups = ingredient_groups
        .into_iter()
        .enumerate()
        .map(|(group_index, group)| {
            let group_identity = Identity::persisted(group.id.clone(), ids.materialize());

            let mut ingredients: Vec<_> = group.ingredients.iter().collect();
            ingredients.sort_by_key(|i| i.position);

            IngredientGroupEdit {
                identity: group_identity,
                position: group_index as u32,
                translations: group.translations.clone(),
                ingredients: ingredients
                    .into_iter()
                    .enumerate()
                    .map(|(index, ingredient)| IngredientEdit {
                        identity: Identity::persisted(ingredient.id.clone(), ids.materialize()),
                        ingredient_id: ingredient.ingredient_id.clone(),
                        quantity: ingredient.quantity,
                        unit_id: ingredient.unit_id.clone(),
                        position: index as u32,
                        translations: ingredient.translations.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    let mut step_groups: Vec<_> = view.step_groups.iter().collect();
    step_groups.sort_by_key(|g| g.position);

    let step_groups = step_groups
        .into_iter()
        .enumerate()
        .map(|(group_index, group)| {
            let group_identity = Identity::persisted(group.id.clone(), ids.materialize());

            let mut steps: Vec<_> = group.steps.iter().collect();
            steps.sort_by_key(|s| s.position);

            StepGroupEdit {
                identity: group_identity,
                position: group_index as u32,
                translations: group.translations.clone(),
                steps: steps
                    .into_iter()
                    .enumerate()
                    .map(|(index, step)| StepEdit {
                        identity: Identity::persisted(step.id.clone(), ids.materialize()),
                        position: index as u32,
                        duration_minutes: step.duration_minutes,
                        image: ImageField::from_url(step.image_url.as_deref()),
                        translations: step.translations.clone(),
                    })
                    .collect(),
            }
        })
        .collect();

    let edit = RecipeEdit {
        identity,
        primary_language: view.primary_language.clone(),
        translations: view.translations.clone(),
        image: ImageField::from_url(view.image_url.as_deref()),
        servings: view.servings,
        prep_time_minutes: view.prep_time_minutes,
        cook_time_minutes: view.cook_time_minutes,
        author: view.author.clone(),
        author_id: view.author_id.clone(),
        is_private: view.is_private,
        tags: view.tags.iter().map(TagRef::from).collect(),
        ingredient_groups,
        step_groups,
    };

    debug!(
        ingredient_groups = edit.ingredient_groups.len(),
        step_groups = edit.step_groups.len(),
        local_ids = ids.issued(),
        "Mapped recipe view to edit state"
    );

    edit
}

/// Collapse editable state into the payload for create or update
#[instrument(skip_all, fields(recipe = ?edit.identity.server))]
pub fn edit_to_payload(edit: &RecipeEdit) -> Result<RecipePayload, MapError> {
    let primary = &edit.primary_language;
    let mut missing: Vec<MissingTranslation> = Vec::new();
    let mut require = |result: Result<(), MissingTranslation>| {
        if let Err(gap) = result {
            missing.push(gap);
        }
    };

    let id = edit.identity.for_transport(EntityPath::Recipe)?;
    require(edit.translations.require(primary, EntityPath::Recipe));
    let image = edit.image.to_transport(EntityPath::Recipe)?;

    let mut ingredient_groups = Vec::with_capacity(edit.ingredient_groups.len());
    for (g, group) in edit.ingredient_groups.iter().enumerate() {
        let path = EntityPath::IngredientGroup(g);
        let group_id = group.identity.for_transport(path.clone())?;
        require(group.translations.require(primary, path));

        let mut ingredients = Vec::with_capacity(group.ingredients.len());
        for (i, ingredient) in group.ingredients.iter().enumerate() {
            let path = EntityPath::Ingredient { group: g, index: i };
            let ingredient_id = ingredient.identity.for_transport(path.clone())?;
            require(ingredient.translations.require(primary, path));

            ingredients.push(IngredientPayload {
                id: ingredient_id,
                ingredient_id: ingredient.ingredient_id.clone(),
                quantity: ingredient.quantity,
                unit_id: ingredient.unit_id.clone(),
                position: i as u32,
                translations: ingredient.translations.clone(),
            });
        }

        ingredient_groups.push(IngredientGroupPayload {
            id: group_id,
            position: g as u32,
            translations: group.translations.clone(),
            ingredients,
        });
    }

    let mut step_groups = Vec::with_capacity(edit.step_groups.len());
    for (g, group) in edit.step_groups.iter().enumerate() {
        let path = EntityPath::StepGroup(g);
        let group_id = group.identity.for_transport(path.clone())?;
        require(group.translations.require(primary, path));

        let mut steps = Vec::with_capacity(group.steps.len());
        for (s, step) in group.steps.iter().enumerate() {
            let path = EntityPath::Step { group: g, index: s };
            let step_id = step.identity.for_transport(path.clone())?;
            let image = step.image.to_transport(path.clone())?;
            require(step.translations.require(primary, path));

            steps.push(StepPayload {
                id: step_id,
                step_group_id: group_id.clone(),
                position: s as u32,
                duration_minutes: step.duration_minutes,
                image,
                translations: step.translations.clone(),
            });
        }

        step_groups.push(StepGroupPayload {
            id: group_id,
            position: g as u32,
            translations: group.translations.clone(),
            steps,
        });
    }

    if !missing.is_empty() {
        debug!(missing = missing.len(), "Recipe is missing primary translations");
        return Err(IncompleteAggregate { missing }.into());
    }

    Ok(RecipePayload {
        id,
        primary_language: primary.clone(),
        translations: edit.translations.clone(),
        image,
        servings: edit.servings,
        prep_time_minutes: edit.prep_time_minutes,
        cook_time_minutes: edit.cook_time_minutes,
        author: edit.author.clone(),
        author_id: edit.author_id.clone(),
        is_private: edit.is_private,
        tags: edit.tags.iter().map(TagRef::resolve_for_transport).collect(),
        ingredient_groups,
        step_groups,
    })
}
