use super::query::FilterArgs;
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use recipe_client::{DirectoryStager, InMemoryRecipeApi, RecipeClient};
use recipe_model::{LanguageCode, RecipeView};
use recipe_query::RecipePage;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct ListArgs {
    /// JSON file holding an array of recipes to list from
    #[arg(short, long, default_value = "recipes.json")]
    pub recipes: PathBuf,

    /// Print the page as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub filter: FilterArgs,
}

pub fn load_recipes(path: &Path) -> Result<Vec<RecipeView>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid recipes in {}", path.display()))
}

pub async fn list(args: ListArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let recipes = load_recipes(&cwd.join(&args.recipes))?;

    let api = InMemoryRecipeApi::with_recipes(recipes);
    let client = RecipeClient::new(api, DirectoryStager::new(config.staging_dir(cwd)));

    let page = client
        .list(&args.filter.filter(), &args.filter.pagination(&config))
        .await
        .map_err(|e| anyhow!("{}", e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let language = LanguageCode::new(
        args.filter
            .lang
            .clone()
            .unwrap_or_else(|| config.primary_language.clone()),
    );
    print_page(&page, &language);
    Ok(())
}

fn print_page(page: &RecipePage, language: &LanguageCode) {
    if page.data.is_empty() {
        println!("{}", "⚠️  No recipes match".yellow());
        return;
    }

    for recipe in &page.data {
        println!("  {}", summary_line(recipe, language));
    }

    println!();
    println!(
        "Page {} of {} ({} recipes)",
        page.page,
        page.page_count(),
        page.total
    );
}

fn summary_line(recipe: &RecipeView, language: &LanguageCode) -> String {
    let title = recipe
        .text(language)
        .fields()
        .map(|text| text.title.clone())
        .unwrap_or_else(|| "(untitled)".to_string());

    let tags = recipe
        .tags
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    let mut line = format!(
        "{} {}  prep {}m, cook {}m, {} steps",
        recipe.id.as_str().bright_black(),
        title.bold(),
        recipe.prep_time_minutes,
        recipe.cook_time_minutes,
        recipe.step_count()
    );
    if !tags.is_empty() {
        line.push_str(&format!("  [{}]", tags));
    }
    if recipe.is_private {
        line.push_str(&format!("  {}", "private".yellow()));
    }
    line
}
