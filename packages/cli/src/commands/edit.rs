use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use recipe_client::DirectoryStager;
use recipe_editor::{EditSession, Mutation, SubmitRequest};
use recipe_model::{Identity, LanguageCode, RecipeEdit, RecipeView};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Local ids issued by the CLI read `cli-<n>`
pub const SESSION_ID: &str = "cli";

#[derive(Debug, Args)]
pub struct EditArgs {
    /// Recipe JSON to edit. Starts a new recipe when omitted.
    pub view: Option<PathBuf>,

    /// JSON array of mutations to apply, in order
    #[arg(short, long)]
    pub mutations: Option<PathBuf>,

    /// Undo this many of the applied mutations before submitting
    #[arg(long, default_value_t = 0)]
    pub undo: usize,

    /// Print the local id of every entity and stop
    #[arg(long)]
    pub outline: bool,

    /// Write the submit request to a file instead of stdout
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

pub async fn edit(args: EditArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut session = open_session(&args, cwd, &config)?;

    if args.outline {
        print!("{}", outline(session.recipe()));
        return Ok(());
    }

    if let Some(script) = &args.mutations {
        let mutations = load_script(&cwd.join(script))?;
        apply_script(&mut session, mutations)?;
    }

    for _ in 0..args.undo {
        if !session.undo()? {
            eprintln!("  {} Nothing left to undo", "⚠️".yellow());
            break;
        }
    }

    for language in missing_languages(session.recipe(), &config) {
        eprintln!(
            "  {} No {} translation for the recipe title",
            "⚠️".yellow(),
            language
        );
    }

    let stager = DirectoryStager::new(config.staging_dir(cwd));
    let report = session.stage_media(&stager).await?;
    if !report.is_empty() {
        eprintln!(
            "  {} Staged {} image(s) in {}",
            "✓".green(),
            report.len(),
            stager.dir().display()
        );
    }

    let request = SubmitRequest::from_payload(session.payload()?);
    let json = serde_json::to_string_pretty(&request)?;

    match &args.out {
        Some(out) => {
            fs::write(cwd.join(out), json)?;
            eprintln!("  {} Wrote {}", "✓".green(), out.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn open_session(args: &EditArgs, cwd: &Path, config: &Config) -> Result<EditSession> {
    let session = match &args.view {
        Some(path) => {
            let path = cwd.join(path);
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Cannot read {}", path.display()))?;
            let view: RecipeView = serde_json::from_str(&content)
                .with_context(|| format!("Invalid recipe in {}", path.display()))?;
            EditSession::load_for_edit(SESSION_ID, &view)
        }
        None => EditSession::new_recipe(SESSION_ID, config.primary_language.as_str()),
    };

    Ok(session.with_undo_levels(config.undo_levels))
}

fn load_script(path: &Path) -> Result<Vec<Mutation>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid mutation script {}", path.display()))
}

fn apply_script(session: &mut EditSession, mutations: Vec<Mutation>) -> Result<()> {
    for (i, mutation) in mutations.into_iter().enumerate() {
        let label = mutation.label();
        session
            .apply(mutation)
            .with_context(|| format!("Mutation {} ({}) failed", i + 1, label))?;
        debug!(step = i + 1, %label, "Applied mutation");
        eprintln!("  {} {}", "✓".green(), label);
    }
    Ok(())
}

/// Supported languages the recipe root has no translation for
fn missing_languages(recipe: &RecipeEdit, config: &Config) -> Vec<String> {
    config
        .supported_languages
        .iter()
        .filter(|language| {
            recipe
                .translations
                .get(&LanguageCode::new(language.as_str()))
                .is_none()
        })
        .cloned()
        .collect()
}

fn local(identity: &Identity) -> String {
    identity
        .local
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Indented tree of every entity with its local id
fn outline(recipe: &RecipeEdit) -> String {
    let primary = &recipe.primary_language;
    let mut out = String::new();

    let title = recipe.translations.resolve(primary, primary).or_empty().title;
    out.push_str(&format!("{}  {}\n", local(&recipe.identity), title));

    for group in &recipe.ingredient_groups {
        let title = group.translations.resolve(primary, primary).or_empty().title;
        out.push_str(&format!("  {}  {}\n", local(&group.identity), title));
        for ingredient in &group.ingredients {
            let name = ingredient.translations.resolve(primary, primary).or_empty().name;
            out.push_str(&format!(
                "    {}  {} {} {}\n",
                local(&ingredient.identity),
                ingredient.quantity,
                ingredient.unit_id,
                name
            ));
        }
    }

    for group in &recipe.step_groups {
        let title = group.translations.resolve(primary, primary).or_empty().title;
        out.push_str(&format!("  {}  {}\n", local(&group.identity), title));
        for step in &group.steps {
            let text = step.translations.resolve(primary, primary).or_empty().instruction;
            out.push_str(&format!(
                "    {}  {} [{}]\n",
                local(&step.identity),
                text,
                step.image.state_name()
            ));
        }
    }

    out
}
