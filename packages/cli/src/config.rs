use anyhow::{bail, Result};
use recipe_editor::DEFAULT_UNDO_LEVELS;
use recipe_query::DEFAULT_PER_PAGE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "recipe.config.json";

/// Recipe CLI configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Language new recipes are authored in
    #[serde(default = "default_language")]
    pub primary_language: String,

    /// Languages every recipe is expected to be translated into
    #[serde(default = "default_languages")]
    pub supported_languages: Vec<String>,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_undo_levels")]
    pub undo_levels: usize,

    /// Where picked images are copied before submit
    #[serde(default = "default_staging_dir")]
    pub staging_dir: String,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_languages() -> Vec<String> {
    vec![default_language()]
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_undo_levels() -> usize {
    DEFAULT_UNDO_LEVELS
}

fn default_staging_dir() -> String {
    "assets/temp".to_string()
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.supported_languages.contains(&self.primary_language) {
            bail!(
                "primaryLanguage '{}' is not one of supportedLanguages {:?}",
                self.primary_language,
                self.supported_languages
            );
        }
        if self.per_page == 0 {
            bail!("perPage must be at least 1");
        }
        Ok(())
    }

    /// Absolute path of the staging directory
    pub fn staging_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.staging_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            primary_language: default_language(),
            supported_languages: default_languages(),
            per_page: default_per_page(),
            undo_levels: default_undo_levels(),
            staging_dir: default_staging_dir(),
        }
    }
}
