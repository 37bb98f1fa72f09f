//! # In-Memory Recipe API
//!
//! A complete backend kept in process memory. It answers every call a
//! [`RecipeClient`](crate::RecipeClient) makes and applies the same filter
//! semantics the listing endpoint has, which makes it the reference the
//! query builder is tested against.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use recipe_editor::{MediaStager, RecipeWriter, SubmitRequest, TransportError};
use recipe_model::{
    IngredientGroupView, IngredientView, LocalFile, PayloadImage, RecipePayload, RecipeView,
    ServerId, StepGroupView, StepView, Tag, TagRef, TempId, Translation, TranslationSet,
};
use recipe_query::{ListQuery, RecipeFilter, RecipePage};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::reader::RecipeReader;
use crate::stager::TEMP_URL_PREFIX;

/// Url prefix of committed recipe images
pub const RECIPE_URL_PREFIX: &str = "/assets/recipes";

/// API call a failure can be injected into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Fetch,
    List,
    Create,
    Update,
    Stage,
}

#[derive(Default)]
struct ApiState {
    /// Insertion order is listing order
    recipes: Vec<RecipeView>,
    tags: Vec<Tag>,
    staged: HashSet<TempId>,
    failures: HashMap<Operation, TransportError>,
    next_id: u64,
}

/// Shared handle to an in-memory recipe store
#[derive(Clone, Default)]
pub struct InMemoryRecipeApi {
    state: Arc<RwLock<ApiState>>,
}

impl InMemoryRecipeApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with existing recipes, kept as given
    pub fn with_recipes(recipes: Vec<RecipeView>) -> Self {
        let tags = known_tags(&recipes);
        let state = ApiState {
            recipes,
            tags,
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Add or replace a recipe without going through the write path
    pub async fn insert(&self, recipe: RecipeView) {
        let mut state = self.state.write().await;
        for tag in &recipe.tags {
            if !state.tags.iter().any(|t| t.id == tag.id) {
                state.tags.push(tag.clone());
            }
        }
        match state.recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe,
            None => state.recipes.push(recipe),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.recipes.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.recipes.is_empty()
    }

    pub async fn tags(&self) -> Vec<Tag> {
        self.state.read().await.tags.clone()
    }

    /// Make the next call to `operation` fail with `error`
    pub async fn fail_next(&self, operation: Operation, error: TransportError) {
        self.state.write().await.failures.insert(operation, error);
    }

    async fn check_failure(&self, operation: Operation) -> Result<(), TransportError> {
        match self.state.write().await.failures.remove(&operation) {
            Some(error) => {
                warn!(?operation, %error, "Injected failure");
                Err(error)
            }
            None => Ok(()),
        }
    }
}

fn known_tags(recipes: &[RecipeView]) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for tag in recipes.iter().flat_map(|r| &r.tags) {
        if !tags.iter().any(|t| t.id == tag.id) {
            tags.push(tag.clone());
        }
    }
    tags
}

impl ApiState {
    fn draft(&self) -> Draft {
        Draft {
            tags: self.tags.clone(),
            staged: self.staged.clone(),
            next_id: self.next_id,
        }
    }

    fn commit(&mut self, draft: Draft) {
        self.tags = draft.tags;
        self.staged = draft.staged;
        self.next_id = draft.next_id;
    }
}

/// Tags, staged uploads and id counter as a write would leave them. Only
/// committed back into [`ApiState`] once the whole write has succeeded.
struct Draft {
    tags: Vec<Tag>,
    staged: HashSet<TempId>,
    next_id: u64,
}

impl Draft {
    fn issue(&mut self, prefix: &str) -> ServerId {
        self.next_id += 1;
        ServerId::new(format!("{}-{}", prefix, self.next_id))
    }

    fn keep_or_issue(&mut self, id: Option<ServerId>, prefix: &str) -> ServerId {
        match id {
            Some(id) => id,
            None => self.issue(prefix),
        }
    }

    fn persist_translations<F: Clone>(&mut self, set: &TranslationSet<F>) -> TranslationSet<F> {
        let mut entries = Vec::with_capacity(set.len());
        for entry in set.iter() {
            entries.push(Translation {
                id: Some(self.keep_or_issue(entry.id.clone(), "tr")),
                language_code: entry.language_code.clone(),
                fields: entry.fields.clone(),
            });
        }
        TranslationSet::from_entries(entries)
    }

    fn resolve_tags(&mut self, refs: &[TagRef]) -> Result<Vec<Tag>, TransportError> {
        let mut resolved = Vec::with_capacity(refs.len());
        for tag in refs {
            let tag = match tag {
                TagRef::Existing { id } => self
                    .tags
                    .iter()
                    .find(|t| &t.id == id)
                    .cloned()
                    .ok_or_else(|| TransportError::Request(format!("unknown tag {}", id)))?,
                TagRef::New { name } => match self
                    .tags
                    .iter()
                    .find(|t| t.name.eq_ignore_ascii_case(name))
                {
                    Some(existing) => existing.clone(),
                    None => {
                        let tag = Tag {
                            id: self.issue("t"),
                            name: name.clone(),
                        };
                        self.tags.push(tag.clone());
                        tag
                    }
                },
            };
            if !resolved.contains(&tag) {
                resolved.push(tag);
            }
        }
        Ok(resolved)
    }

    /// Committed url for an image reference
    fn commit_image(
        &mut self,
        image: Option<&PayloadImage>,
    ) -> Result<Option<String>, TransportError> {
        match image {
            None => Ok(None),
            Some(PayloadImage::Remote { url }) => Ok(Some(url.clone())),
            Some(PayloadImage::Staged { temp_id }) => {
                let name = temp_id
                    .as_str()
                    .strip_prefix(TEMP_URL_PREFIX)
                    .and_then(|rest| rest.strip_prefix('/'))
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| {
                        TransportError::Request(format!("not a staged upload: {}", temp_id))
                    })?;
                self.staged.remove(temp_id);
                Ok(Some(format!("{}/{}", RECIPE_URL_PREFIX, name)))
            }
        }
    }

    /// Turn an accepted payload into the stored aggregate
    fn materialize(
        &mut self,
        payload: &RecipePayload,
        id: ServerId,
        created_at: Option<NaiveDate>,
    ) -> Result<RecipeView, TransportError> {
        let tags = self.resolve_tags(&payload.tags)?;
        let image_url = self.commit_image(payload.image.as_ref())?;
        let translations = self.persist_translations(&payload.translations);

        let mut ingredient_groups = Vec::with_capacity(payload.ingredient_groups.len());
        for (g, group) in payload.ingredient_groups.iter().enumerate() {
            let group_id = self.keep_or_issue(group.id.clone(), "ig");
            let mut ingredients = Vec::with_capacity(group.ingredients.len());
            for (i, ingredient) in group.ingredients.iter().enumerate() {
                ingredients.push(IngredientView {
                    id: self.keep_or_issue(ingredient.id.clone(), "i"),
                    ingredient_id: ingredient.ingredient_id.clone(),
                    quantity: ingredient.quantity,
                    unit_id: ingredient.unit_id.clone(),
                    position: i as u32,
                    translations: self.persist_translations(&ingredient.translations),
                });
            }
            ingredient_groups.push(IngredientGroupView {
                id: group_id,
                position: g as u32,
                translations: self.persist_translations(&group.translations),
                ingredients,
            });
        }

        let mut step_groups = Vec::with_capacity(payload.step_groups.len());
        for (g, group) in payload.step_groups.iter().enumerate() {
            let group_id = self.keep_or_issue(group.id.clone(), "sg");
            let mut steps = Vec::with_capacity(group.steps.len());
            for (s, step) in group.steps.iter().enumerate() {
                steps.push(StepView {
                    id: self.keep_or_issue(step.id.clone(), "s"),
                    position: s as u32,
                    duration_minutes: step.duration_minutes,
                    image_url: self.commit_image(step.image.as_ref())?,
                    translations: self.persist_translations(&step.translations),
                });
            }
            step_groups.push(StepGroupView {
                id: group_id,
                position: g as u32,
                translations: self.persist_translations(&group.translations),
                steps,
            });
        }

        Ok(RecipeView {
            id,
            primary_language: payload.primary_language.clone(),
            translations,
            image_url,
            servings: payload.servings,
            prep_time_minutes: payload.prep_time_minutes,
            cook_time_minutes: payload.cook_time_minutes,
            author: payload.author.clone(),
            author_id: payload.author_id.clone(),
            is_private: payload.is_private,
            created_at,
            tags,
            ingredient_groups,
            step_groups,
        })
    }
}

/// Every media part must name a slot the payload binds to the same temp id
fn check_media(request: &SubmitRequest) -> Result<(), TransportError> {
    let bound = request.metadata.staged_images();
    for part in &request.media {
        let matches = bound
            .iter()
            .any(|(slot, temp_id)| *slot == part.slot && *temp_id == &part.temp_id);
        if !matches {
            return Err(TransportError::Request(format!(
                "media part for {} does not match the payload",
                part.slot
            )));
        }
    }
    if bound.len() != request.media.len() {
        return Err(TransportError::Request(format!(
            "payload binds {} staged images but {} media parts were sent",
            bound.len(),
            request.media.len()
        )));
    }
    Ok(())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn in_range(value: u32, min: Option<u32>, max: Option<u32>) -> bool {
    min.map_or(true, |min| value >= min) && max.map_or(true, |max| value <= max)
}

/// Listing semantics of the recipe endpoint
pub fn matches_filter(recipe: &RecipeView, filter: &RecipeFilter) -> bool {
    if recipe.is_private && !filter.scope {
        return false;
    }

    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let search = search.to_lowercase();
        let found = recipe.translations.iter().any(|t| {
            contains_ignore_case(&t.fields.title, &search)
                || t.fields
                    .description
                    .as_deref()
                    .is_some_and(|d| contains_ignore_case(d, &search))
        });
        if !found {
            return false;
        }
    }

    if let Some(name) = filter.ingredient.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let name = name.to_lowercase();
        let found = recipe
            .ingredient_groups
            .iter()
            .flat_map(|g| &g.ingredients)
            .flat_map(|i| i.translations.iter())
            .any(|t| contains_ignore_case(&t.fields.name, &name));
        if !found {
            return false;
        }
    }

    if !filter
        .tags
        .iter()
        .all(|wanted| recipe.tags.iter().any(|t| &t.id == wanted))
    {
        return false;
    }

    if !in_range(recipe.prep_time_minutes, filter.min_prep, filter.max_prep)
        || !in_range(recipe.cook_time_minutes, filter.min_cook, filter.max_cook)
        || !in_range(recipe.step_count() as u32, filter.min_steps, filter.max_steps)
    {
        return false;
    }

    if filter.date_from.is_some() || filter.date_to.is_some() {
        let Some(created) = recipe.created_at else {
            return false;
        };
        if filter.date_from.is_some_and(|from| created < from)
            || filter.date_to.is_some_and(|to| created > to)
        {
            return false;
        }
    }

    true
}

#[async_trait]
impl RecipeReader for InMemoryRecipeApi {
    async fn fetch(&self, id: &ServerId) -> Result<RecipeView, TransportError> {
        self.check_failure(Operation::Fetch).await?;

        let state = self.state.read().await;
        state
            .recipes
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(format!("recipe {}", id)))
    }

    async fn list(&self, query: &ListQuery) -> Result<RecipePage, TransportError> {
        self.check_failure(Operation::List).await?;

        let invalid = |e: recipe_query::QueryError| TransportError::Request(e.to_string());
        let filter = query.filter().map_err(invalid)?;
        let pagination = query.pagination().map_err(invalid)?;
        if pagination.page == 0 {
            return Err(TransportError::Request("page numbers start at 1".into()));
        }

        let state = self.state.read().await;
        let matching: Vec<&RecipeView> = state
            .recipes
            .iter()
            .filter(|r| matches_filter(r, &filter))
            .collect();
        let total = matching.len() as u32;
        let data = matching
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.per_page as usize)
            .cloned()
            .collect();

        debug!(query = %query, total, "Listed recipes");
        Ok(RecipePage {
            data,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        })
    }
}

#[async_trait]
impl RecipeWriter for InMemoryRecipeApi {
    async fn create(&self, request: SubmitRequest) -> Result<RecipeView, TransportError> {
        self.check_failure(Operation::Create).await?;
        if !request.is_create() {
            return Err(TransportError::Request(
                "create called with an existing recipe id".into(),
            ));
        }
        check_media(&request)?;

        let mut state = self.state.write().await;
        let mut draft = state.draft();
        let id = draft.issue("r");
        let view = draft.materialize(&request.metadata, id, Some(Utc::now().date_naive()))?;
        state.commit(draft);
        state.recipes.push(view.clone());

        info!(recipe = %view.id, "Recipe created");
        Ok(view)
    }

    async fn update(&self, request: SubmitRequest) -> Result<Option<RecipeView>, TransportError> {
        self.check_failure(Operation::Update).await?;
        let Some(id) = request.metadata.id.clone() else {
            return Err(TransportError::Request("update called without a recipe id".into()));
        };
        check_media(&request)?;

        let mut state = self.state.write().await;
        let index = state
            .recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| TransportError::NotFound(format!("recipe {}", id)))?;
        let created_at = state.recipes[index].created_at;

        let mut draft = state.draft();
        let view = draft.materialize(&request.metadata, id, created_at)?;
        state.commit(draft);
        state.recipes[index] = view.clone();

        info!(recipe = %view.id, "Recipe updated");
        Ok(Some(view))
    }
}

#[async_trait]
impl MediaStager for InMemoryRecipeApi {
    async fn stage_upload(&self, file: &LocalFile) -> Result<TempId, TransportError> {
        self.check_failure(Operation::Stage).await?;

        let mut state = self.state.write().await;
        state.next_id += 1;
        let ext = file.extension().unwrap_or("png");
        let temp_id = TempId::new(format!(
            "{}/recipe_{}.{}",
            TEMP_URL_PREFIX, state.next_id, ext
        ));
        state.staged.insert(temp_id.clone());

        debug!(file = %file.path().display(), %temp_id, "Staged upload");
        Ok(temp_id)
    }
}
