//! # Recipe Client
//!
//! Wires the editing core to a recipe API.
//!
//! - [`RecipeReader`]: fetch and list, the read half of the API
//! - [`RecipeClient`]: open a session, submit it, list recipes
//! - [`InMemoryRecipeApi`]: a process-local backend with the listing
//!   endpoint's filter semantics
//! - [`DirectoryStager`]: stages picked files into a directory
//!
//! ```rust,ignore
//! let api = InMemoryRecipeApi::with_recipes(recipes);
//! let client = RecipeClient::new(api.clone(), DirectoryStager::new("assets/temp"));
//!
//! let mut session = client.open_for_edit(&"r-1".into()).await?;
//! session.apply(mutation)?;
//! client.submit(&mut session).await?;
//! ```

mod client;
mod memory;
mod reader;
mod stager;

pub use client::RecipeClient;
pub use memory::{matches_filter, InMemoryRecipeApi, Operation, RECIPE_URL_PREFIX};
pub use reader::RecipeReader;
pub use stager::{DirectoryStager, TEMP_URL_PREFIX};
