use crate::config::Config;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use recipe_query::{build_list_query, Pagination, RecipeFilter};
use std::path::Path;

/// Listing filter as command line flags
#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// Text to find in titles and descriptions
    #[arg(short, long)]
    pub search: Option<String>,

    /// Ingredient name the recipe must contain
    #[arg(short, long)]
    pub ingredient: Option<String>,

    /// Tag id, repeat to require several
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    #[arg(long)]
    pub min_prep: Option<u32>,
    #[arg(long)]
    pub max_prep: Option<u32>,
    #[arg(long)]
    pub min_cook: Option<u32>,
    #[arg(long)]
    pub max_cook: Option<u32>,
    #[arg(long)]
    pub min_steps: Option<u32>,
    #[arg(long)]
    pub max_steps: Option<u32>,

    /// Earliest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest creation date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Language to show titles in
    #[arg(short, long)]
    pub lang: Option<String>,

    /// Include private recipes
    #[arg(long)]
    pub scope: bool,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    pub page: u32,

    /// Recipes per page (overrides config)
    #[arg(long)]
    pub per_page: Option<u32>,
}

impl FilterArgs {
    pub fn filter(&self) -> RecipeFilter {
        RecipeFilter {
            search: self.search.clone(),
            ingredient: self.ingredient.clone(),
            tags: self.tags.iter().map(|t| t.as_str().into()).collect(),
            min_prep: self.min_prep,
            max_prep: self.max_prep,
            min_cook: self.min_cook,
            max_cook: self.max_cook,
            min_steps: self.min_steps,
            max_steps: self.max_steps,
            date_from: self.from,
            date_to: self.to,
            lang: self.lang.clone(),
            scope: self.scope,
        }
    }

    pub fn pagination(&self, config: &Config) -> Pagination {
        Pagination::new(self.page, self.per_page.unwrap_or(config.per_page))
    }
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Print the canonical list query for the given flags
pub fn query(args: QueryArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let query = build_list_query(&args.filter.filter(), &args.filter.pagination(&config));

    println!("{}", query);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_to_query() {
        let args = FilterArgs {
            search: Some("soup".into()),
            tags: vec!["t2".into(), "t1".into()],
            page: 2,
            per_page: Some(20),
            ..Default::default()
        };

        let query = build_list_query(&args.filter(), &args.pagination(&Config::default()));

        assert_eq!(
            query.to_query_string(),
            "search=soup&tags=t2%2Ct1&page=2&perPage=20"
        );
    }

    #[test]
    fn test_per_page_from_config() {
        let args = FilterArgs {
            page: 1,
            ..Default::default()
        };
        let config = Config {
            per_page: 7,
            ..Default::default()
        };

        assert_eq!(args.pagination(&config), Pagination::new(1, 7));
    }
}
