//! Read side of the recipe API

use async_trait::async_trait;
use recipe_editor::TransportError;
use recipe_model::{RecipeView, ServerId};
use recipe_query::{ListQuery, RecipePage};

/// Fetches read aggregates and recipe listings
#[async_trait]
pub trait RecipeReader: Send + Sync {
    /// Full aggregate for one recipe
    async fn fetch(&self, id: &ServerId) -> Result<RecipeView, TransportError>;

    /// One page of recipes matching a canonical list query
    async fn list(&self, query: &ListQuery) -> Result<RecipePage, TransportError>;
}
