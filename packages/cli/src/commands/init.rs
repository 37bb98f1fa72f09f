use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use recipe_model::{
    GroupText, IngredientGroupView, IngredientText, IngredientView, RecipeText, RecipeView,
    ServerId, StepGroupView, StepText, StepView, Tag, TranslationSet,
};
use std::fs;
use std::path::Path;

const SAMPLE_RECIPES: &str = "recipes.json";

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Primary language of new recipes
    #[arg(short, long, default_value = "en")]
    pub language: String,

    /// Additional supported languages
    #[arg(short, long = "also")]
    pub also: Vec<String>,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing recipe workspace...".bright_blue().bold());

    let mut supported_languages = vec![args.language.clone()];
    for language in args.also {
        if !supported_languages.contains(&language) {
            supported_languages.push(language);
        }
    }

    let config = Config {
        primary_language: args.language.clone(),
        supported_languages,
        ..Default::default()
    };
    config.validate()?;

    let staging_dir = config.staging_dir(cwd);
    if !staging_dir.exists() {
        fs::create_dir_all(&staging_dir)?;
        println!("  {} Created {}/", "✓".green(), config.staging_dir);
    }

    let recipes_path = cwd.join(SAMPLE_RECIPES);
    if !recipes_path.exists() {
        let recipes = vec![sample_recipe(&args.language)];
        fs::write(&recipes_path, serde_json::to_string_pretty(&recipes)?)?;
        println!("  {} Created {}", "✓".green(), SAMPLE_RECIPES);
    }

    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Workspace initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: recipe list");
    println!(
        "  2. Extract one recipe from {} and run: recipe edit <file> --outline",
        SAMPLE_RECIPES
    );
    println!("  3. Write a mutation script and run: recipe edit <file> --mutations <script>");

    Ok(())
}

fn sample_recipe(language: &str) -> RecipeView {
    RecipeView {
        id: ServerId::from("r-1"),
        primary_language: language.into(),
        translations: TranslationSet::with(
            language,
            RecipeText {
                title: "Tomato soup".to_string(),
                description: Some("A quick weeknight soup".to_string()),
            },
        ),
        image_url: None,
        servings: 2,
        prep_time_minutes: 10,
        cook_time_minutes: 25,
        author: None,
        author_id: None,
        is_private: false,
        created_at: chrono::NaiveDate::from_ymd_opt(2024, 1, 15),
        tags: vec![Tag {
            id: ServerId::from("t-1"),
            name: "Soup".to_string(),
        }],
        ingredient_groups: vec![IngredientGroupView {
            id: ServerId::from("ig-1"),
            position: 0,
            translations: TranslationSet::with(
                language,
                GroupText {
                    title: "Soup".to_string(),
                },
            ),
            ingredients: [("Tomatoes", 800.0, "g"), ("Onion", 1.0, "pc"), ("Stock", 500.0, "ml")]
                .into_iter()
                .enumerate()
                .map(|(i, (name, quantity, unit))| IngredientView {
                    id: ServerId::from(format!("i-{}", i + 1)),
                    ingredient_id: None,
                    quantity,
                    unit_id: ServerId::from(unit),
                    position: i as u32,
                    translations: TranslationSet::with(
                        language,
                        IngredientText {
                            name: name.to_string(),
                            note: None,
                        },
                    ),
                })
                .collect(),
        }],
        step_groups: vec![StepGroupView {
            id: ServerId::from("sg-1"),
            position: 0,
            translations: TranslationSet::with(
                language,
                GroupText {
                    title: "Cook".to_string(),
                },
            ),
            steps: ["Soften the onion", "Add tomatoes and stock", "Blend"]
                .into_iter()
                .enumerate()
                .map(|(i, instruction)| StepView {
                    id: ServerId::from(format!("s-{}", i + 1)),
                    position: i as u32,
                    duration_minutes: Some(5),
                    image_url: None,
                    translations: TranslationSet::with(
                        language,
                        StepText {
                            instruction: instruction.to_string(),
                        },
                    ),
                })
                .collect(),
        }],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_writes_workspace() {
        let dir = tempdir().unwrap();

        init(
            InitArgs {
                language: "fr".into(),
                also: vec!["en".into(), "fr".into()],
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.primary_language, "fr");
        assert_eq!(config.supported_languages, vec!["fr", "en"]);
        assert!(dir.path().join("assets/temp").is_dir());

        let recipes: Vec<RecipeView> =
            serde_json::from_str(&fs::read_to_string(dir.path().join(SAMPLE_RECIPES)).unwrap())
                .unwrap();
        assert_eq!(recipes[0].primary_language.as_str(), "fr");
        assert_eq!(recipes[0].step_count(), 3);
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "perPage": 3 }"#).unwrap();

        init(
            InitArgs {
                language: "en".into(),
                also: vec![],
                force: false,
            },
            dir.path(),
        )
        .unwrap();

        assert_eq!(Config::load(dir.path()).unwrap().per_page, 3);
    }
}
