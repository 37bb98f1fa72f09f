//! High-level flows tying the editing core to an API

use recipe_editor::{
    EditSession, MediaStager, RecipeWriter, SubmitError, SubmitOutcome, TransportError,
    DEFAULT_UNDO_LEVELS,
};
use recipe_model::{LanguageCode, ServerId};
use recipe_query::{build_list_query, Pagination, RecipeFilter, RecipePage};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, instrument};

use crate::reader::RecipeReader;

/// Opens, submits and lists recipes against one API.
///
/// `A` answers reads and writes; `S` stages local image files. Every session
/// the client opens gets its own id, so local ids never collide between
/// sessions.
pub struct RecipeClient<A, S> {
    api: A,
    stager: S,
    undo_levels: usize,
    sessions: AtomicU64,
}

impl<A, S> RecipeClient<A, S>
where
    A: RecipeReader + RecipeWriter,
    S: MediaStager,
{
    pub fn new(api: A, stager: S) -> Self {
        Self {
            api,
            stager,
            undo_levels: DEFAULT_UNDO_LEVELS,
            sessions: AtomicU64::new(0),
        }
    }

    pub fn with_undo_levels(mut self, levels: usize) -> Self {
        self.undo_levels = levels;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn stager(&self) -> &S {
        &self.stager
    }

    fn next_session_id(&self) -> String {
        let n = self.sessions.fetch_add(1, Ordering::Relaxed) + 1;
        format!("edit-{}", n)
    }

    /// Fetch a recipe and start editing it
    #[instrument(skip(self))]
    pub async fn open_for_edit(&self, id: &ServerId) -> Result<EditSession, TransportError> {
        let view = self.api.fetch(id).await?;
        Ok(EditSession::load_for_edit(self.next_session_id(), &view)
            .with_undo_levels(self.undo_levels))
    }

    /// Start editing a recipe that does not exist yet
    pub fn new_recipe(&self, primary_language: impl Into<LanguageCode>) -> EditSession {
        EditSession::new_recipe(self.next_session_id(), primary_language)
            .with_undo_levels(self.undo_levels)
    }

    /// Stage pending media and create or update the recipe
    pub async fn submit(&self, session: &mut EditSession) -> Result<SubmitOutcome, SubmitError> {
        session.submit(&self.stager, &self.api).await
    }

    /// One page of recipes matching `filter`
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: &RecipeFilter,
        pagination: &Pagination,
    ) -> Result<RecipePage, TransportError> {
        let query = build_list_query(filter, pagination);
        debug!(query = %query, "Listing recipes");
        self.api.list(&query).await
    }
}
