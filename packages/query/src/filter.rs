//! Listing filter and pagination.

use chrono::NaiveDate;
use recipe_model::ServerId;
use serde::{Deserialize, Serialize};

use crate::builder::ListQuery;
use crate::error::QueryError;

pub const DEFAULT_PER_PAGE: u32 = 20;

/// Everything the recipe list can be narrowed by.
///
/// Range bounds are independent of each other; nothing checks that a
/// minimum is below its maximum.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFilter {
    /// Free text matched against titles and descriptions
    #[serde(default)]
    pub search: Option<String>,

    /// Ingredient name the recipe must contain
    #[serde(default)]
    pub ingredient: Option<String>,

    /// Tag ids, in the order the user selected them
    #[serde(default)]
    pub tags: Vec<ServerId>,

    #[serde(default)]
    pub min_prep: Option<u32>,
    #[serde(default)]
    pub max_prep: Option<u32>,
    #[serde(default)]
    pub min_cook: Option<u32>,
    #[serde(default)]
    pub max_cook: Option<u32>,
    #[serde(default)]
    pub min_steps: Option<u32>,
    #[serde(default)]
    pub max_steps: Option<u32>,

    #[serde(default)]
    pub date_from: Option<NaiveDate>,
    #[serde(default)]
    pub date_to: Option<NaiveDate>,

    /// Language to resolve titles in
    #[serde(default)]
    pub lang: Option<String>,

    /// Include private recipes the caller is allowed to see
    #[serde(default)]
    pub scope: bool,
}

impl RecipeFilter {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn tag(mut self, id: impl Into<ServerId>) -> Self {
        self.tags.push(id.into());
        self
    }

    /// Include private recipes
    pub fn scoped(mut self) -> Self {
        self.scope = true;
        self
    }

    pub fn prep_between(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_prep = min;
        self.max_prep = max;
        self
    }

    pub fn cook_between(mut self, min: Option<u32>, max: Option<u32>) -> Self {
        self.min_cook = min;
        self.max_cook = max;
        self
    }

    /// Filter encoded in a list query string; pagination keys are ignored
    pub fn from_query(input: &str) -> Result<Self, QueryError> {
        ListQuery::parse(input)?.filter()
    }
}

/// One-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Number of records to skip
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) as usize * self.per_page as usize
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}
