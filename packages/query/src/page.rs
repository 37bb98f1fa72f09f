use recipe_model::RecipeView;
use serde::{Deserialize, Serialize};

/// One page of the recipe list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipePage {
    pub data: Vec<RecipeView>,
    /// Number of recipes matching the filter, across all pages
    pub total: u32,
    pub page: u32,
    pub per_page: u32,
}

impl RecipePage {
    pub fn page_count(&self) -> u32 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(self.per_page)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.page_count()
    }
}
