//! # Edit Session
//!
//! Everything one editor screen holds while a recipe is open: the editable
//! recipe, the local id generator that keys its rows, and the undo history.
//!
//! A session is created when a recipe is opened (or a new one started) and
//! dropped when the user navigates away; nothing outlives it. Sessions never
//! share state, so two open editors cannot hand out the same local id.

use recipe_model::{
    LanguageCode, LocalId, LocalIdGenerator, RecipeEdit, RecipePayload, RecipeView,
};
use tracing::{debug, info, instrument, warn};

use crate::errors::{MapError, SubmitError};
use crate::mapper::{edit_to_payload, view_to_edit};
use crate::mutations::{Mutation, MutationError};
use crate::staging::{stage_pending_media, StagingReport};
use crate::transport::{MediaStager, RecipeWriter, SubmitRequest};
use crate::undo_stack::UndoStack;

pub struct EditSession {
    /// Session identifier, also the prefix of every local id
    pub id: String,

    recipe: RecipeEdit,
    ids: LocalIdGenerator,
    history: UndoStack,
}

/// What the server answered to a submit
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(RecipeView),
    /// Updates may come back without a body
    Updated(Option<RecipeView>),
}

impl SubmitOutcome {
    pub fn view(&self) -> Option<&RecipeView> {
        match self {
            SubmitOutcome::Created(view) => Some(view),
            SubmitOutcome::Updated(view) => view.as_ref(),
        }
    }
}

impl EditSession {
    /// Open a fetched recipe for editing
    pub fn load_for_edit(id: impl Into<String>, view: &RecipeView) -> Self {
        let id = id.into();
        let mut ids = LocalIdGenerator::new(id.clone());
        let recipe = view_to_edit(view, &mut ids);
        info!(session = %id, recipe = %view.id, "Opened recipe for editing");

        Self {
            id,
            recipe,
            ids,
            history: UndoStack::new(),
        }
    }

    /// Start an empty recipe
    pub fn new_recipe(id: impl Into<String>, primary_language: impl Into<LanguageCode>) -> Self {
        let id = id.into();
        let mut ids = LocalIdGenerator::new(id.clone());
        let recipe = RecipeEdit::new(primary_language, &mut ids);
        info!(session = %id, "Started new recipe");

        Self {
            id,
            recipe,
            ids,
            history: UndoStack::new(),
        }
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.history = UndoStack::with_max_levels(levels);
        self
    }

    pub fn recipe(&self) -> &RecipeEdit {
        &self.recipe
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Materialize a local id, e.g. for a row the UI is about to insert
    pub fn new_local_id(&mut self) -> LocalId {
        self.ids.materialize()
    }

    /// Apply one mutation as its own undo step. Inserted entities get their
    /// local ids here, before the mutation is recorded. An inserted entity
    /// may only carry a local id this session issued.
    pub fn apply(&mut self, mut mutation: Mutation) -> Result<(), MutationError> {
        self.prepare(&mut mutation)?;
        debug!(session = %self.id, op = mutation.label(), "Applying mutation");
        self.history.apply(&mutation, &mut self.recipe)
    }

    fn prepare(&mut self, mutation: &mut Mutation) -> Result<(), MutationError> {
        if let Some(id) = mutation
            .inserted_local_ids()
            .into_iter()
            .find(|id| !self.ids.has_issued(id))
        {
            return Err(MutationError::ForeignLocalId(id.clone()));
        }
        mutation.fill_local_ids(&mut self.ids);
        Ok(())
    }

    /// Apply several mutations as one undo step. If any of them fails, the
    /// ones already applied are rolled back and nothing is recorded.
    pub fn apply_batch(
        &mut self,
        description: impl Into<String>,
        mutations: impl IntoIterator<Item = Mutation>,
    ) -> Result<(), MutationError> {
        let snapshot = self.recipe.clone();
        self.history.begin_batch();
        self.history.set_batch_description(description);

        for mut mutation in mutations {
            let result = self
                .prepare(&mut mutation)
                .and_then(|()| self.history.apply(&mutation, &mut self.recipe));
            if let Err(e) = result {
                warn!(
                    session = %self.id,
                    op = mutation.label(),
                    error = %e,
                    "Batch failed, rolling back"
                );
                self.history.abort_batch();
                self.recipe = snapshot;
                return Err(e);
            }
        }

        self.history.end_batch();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<bool, MutationError> {
        self.history.undo(&mut self.recipe)
    }

    pub fn redo(&mut self) -> Result<bool, MutationError> {
        self.history.redo(&mut self.recipe)
    }

    /// The payload the current state would submit
    pub fn payload(&self) -> Result<RecipePayload, MapError> {
        edit_to_payload(&self.recipe)
    }

    /// Upload every pending local image
    pub async fn stage_media<S>(&mut self, stager: &S) -> Result<StagingReport, SubmitError>
    where
        S: MediaStager + ?Sized,
    {
        stage_pending_media(&mut self.recipe, stager).await
    }

    /// Stage pending media, build the payload and send it: create when the
    /// recipe has no server id yet, update otherwise.
    ///
    /// On failure the session is left as it was after staging, so the call
    /// can simply be repeated.
    #[instrument(skip_all, fields(session = %self.id))]
    pub async fn submit<S, W>(
        &mut self,
        stager: &S,
        writer: &W,
    ) -> Result<SubmitOutcome, SubmitError>
    where
        S: MediaStager + ?Sized,
        W: RecipeWriter + ?Sized,
    {
        self.stage_media(stager).await?;

        let payload = self.payload()?;
        let request = SubmitRequest::from_payload(payload);
        debug!(media = request.media.len(), create = request.is_create(), "Submitting recipe");

        let outcome = if request.is_create() {
            writer
                .create(request)
                .await
                .map(SubmitOutcome::Created)
                .map_err(SubmitError::Transport)?
        } else {
            writer
                .update(request)
                .await
                .map(SubmitOutcome::Updated)
                .map_err(SubmitError::Transport)?
        };

        info!(
            recipe = ?outcome.view().map(|v| v.id.as_str()),
            "Recipe submitted"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::{EntityRef, EntityText};
    use recipe_model::{Identity, IngredientEdit, IngredientGroupEdit, RecipeText};

    #[test]
    fn test_session_creation() {
        let session = EditSession::new_recipe("client-1", "en");

        assert_eq!(session.id, "client-1");
        assert_eq!(session.history().undo_levels(), 0);
        assert_eq!(
            session.recipe().identity.local.as_ref().map(|l| l.as_str()),
            Some("client-1-0")
        );
    }

    #[test]
    fn test_apply_fills_local_ids() {
        let mut session = EditSession::new_recipe("s", "en");

        session
            .apply(Mutation::InsertIngredientGroup {
                index: 0,
                group: IngredientGroupEdit::new("en", "Dough")
                    .with_ingredient(IngredientEdit::new(1.0, "pc").named("en", "Egg")),
            })
            .unwrap();

        let group = &session.recipe().ingredient_groups[0];
        assert!(group.identity.local.is_some());
        assert!(group.ingredients[0].identity.local.is_some());
    }

    #[test]
    fn test_failed_batch_rolls_back() {
        let mut session = EditSession::new_recipe("s", "en");
        let before = session.recipe().clone();

        let result = session.apply_batch(
            "Name recipe",
            vec![
                Mutation::SetTranslation {
                    target: EntityRef::Recipe,
                    language: "en".into(),
                    text: EntityText::Recipe(RecipeText {
                        title: "Pie".into(),
                        description: None,
                    }),
                    translation_id: None,
                },
                Mutation::RemoveStep {
                    step_id: LocalId::from("missing"),
                },
            ],
        );

        assert!(result.is_err());
        assert_eq!(session.recipe(), &before);
        assert!(!session.history().can_undo());
    }

    #[test]
    fn test_insert_rejects_ids_not_issued_here() {
        let mut session = EditSession::new_recipe("s", "en");
        session
            .apply(Mutation::InsertIngredientGroup {
                index: 0,
                group: IngredientGroupEdit::new("en", "Dough")
                    .with_ingredient(IngredientEdit::new(1.0, "pc").named("en", "Egg")),
            })
            .unwrap();
        let group_id = session.recipe().ingredient_groups[0].identity.local.clone().unwrap();
        let egg = session.recipe().ingredient_groups[0].ingredients[0]
            .identity
            .local
            .clone()
            .unwrap();
        let before = session.recipe().clone();

        // Already held by the egg
        let mut copy = IngredientEdit::new(2.0, "pc").named("en", "Milk");
        copy.identity = Identity::fresh(egg.clone());
        let result = session.apply(Mutation::InsertIngredient {
            group_id: group_id.clone(),
            index: 0,
            ingredient: copy,
        });
        assert_eq!(result, Err(MutationError::DuplicateLocalId(egg)));

        // Not issued yet, the generator would hand it out later
        let upcoming = LocalId::from("s-3");
        let mut early = IngredientEdit::new(2.0, "pc").named("en", "Milk");
        early.identity = Identity::fresh(upcoming.clone());
        let result = session.apply(Mutation::InsertIngredient {
            group_id: group_id.clone(),
            index: 0,
            ingredient: early,
        });
        assert_eq!(result, Err(MutationError::ForeignLocalId(upcoming.clone())));
        assert_eq!(session.recipe(), &before);
        assert_eq!(session.new_local_id(), upcoming);

        // An id materialized up front is accepted
        let reserved = session.new_local_id();
        let mut milk = IngredientEdit::new(2.0, "pc").named("en", "Milk");
        milk.identity = Identity::fresh(reserved.clone());
        session
            .apply(Mutation::InsertIngredient {
                group_id,
                index: 1,
                ingredient: milk,
            })
            .unwrap();
        assert!(session.recipe().ingredient_groups[0].ingredients[1]
            .identity
            .matches(&reserved));
    }

    #[test]
    fn test_new_recipe_payload_needs_title() {
        let session = EditSession::new_recipe("s", "en");
        assert!(matches!(session.payload(), Err(MapError::Incomplete(_))));
    }

    #[test]
    fn test_outcome_view() {
        assert_eq!(SubmitOutcome::Updated(None).view(), None);
    }
}
