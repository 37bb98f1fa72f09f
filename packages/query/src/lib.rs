//! # Recipe Query
//!
//! Filter, pagination, and the canonical query used by the recipe listing.
//!
//! ```rust,ignore
//! use recipe_query::{build_list_query, Pagination, RecipeFilter};
//!
//! let filter = RecipeFilter::default().search("soup").tag("t2").tag("t1");
//! let query = build_list_query(&filter, &Pagination::new(2, 20));
//!
//! assert_eq!(query.to_query_string(), "search=soup&tags=t2%2Ct1&page=2&perPage=20");
//! ```

mod builder;
mod error;
mod filter;
mod page;

pub use builder::{build_list_query, ListQuery};
pub use error::QueryError;
pub use filter::{Pagination, RecipeFilter, DEFAULT_PER_PAGE};
pub use page::RecipePage;
