//! # Translation Sets
//!
//! Locale-specific content attached to the recipe and to each nested entity.
//! A set holds at most one entry per language code. Lookups fall back to the
//! recipe's primary language and end in an explicit `Missing` sentinel
//! rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{EntityPath, MissingTranslation};
use crate::identity::ServerId;

/// BCP-47-ish language tag such as `en` or `fr`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

/// Title and description of a recipe
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeText {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Title of an ingredient or step group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupText {
    pub title: String,
}

/// Name and note of an ingredient line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientText {
    #[serde(alias = "data")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Instruction text of a step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepText {
    pub instruction: String,
}

/// One language entry of a translation set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Translation<F> {
    /// Server id of the translation row, if it has been persisted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ServerId>,
    pub language_code: LanguageCode,
    #[serde(flatten)]
    pub fields: F,
}

/// Outcome of a translation lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolved<'a, F> {
    /// The requested language exists
    Exact(&'a F),
    /// The requested language is absent; this is the primary language entry
    Fallback(&'a F),
    /// Neither the requested nor the primary language exists
    Missing,
}

impl<'a, F> Resolved<'a, F> {
    pub fn fields(&self) -> Option<&'a F> {
        match self {
            Resolved::Exact(fields) | Resolved::Fallback(fields) => Some(fields),
            Resolved::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Resolved::Missing)
    }
}

impl<F: Clone + Default> Resolved<'_, F> {
    /// The resolved fields, or empty fields for the `Missing` sentinel
    pub fn or_empty(&self) -> F {
        self.fields().cloned().unwrap_or_default()
    }
}

/// Per-language content of one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationSet<F> {
    entries: Vec<Translation<F>>,
}

impl<F> Default for TranslationSet<F> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<F> TranslationSet<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set with a single entry
    pub fn with(language: impl Into<LanguageCode>, fields: F) -> Self {
        let mut set = Self::new();
        set.upsert(language, fields);
        set
    }

    /// Build a set from entries, keeping the last entry for a repeated language
    pub fn from_entries(entries: impl IntoIterator<Item = Translation<F>>) -> Self {
        let mut set = Self::new();
        for entry in entries {
            match set.position(&entry.language_code) {
                Some(index) => set.entries[index] = entry,
                None => set.entries.push(entry),
            }
        }
        set
    }

    fn position(&self, language: &LanguageCode) -> Option<usize> {
        self.entries.iter().position(|t| &t.language_code == language)
    }

    /// Replace the fields for `language`, or insert a new entry.
    /// A persisted entry keeps its translation id.
    /// Returns the fields that were replaced.
    pub fn upsert(&mut self, language: impl Into<LanguageCode>, fields: F) -> Option<F> {
        let language = language.into();
        match self.position(&language) {
            Some(index) => Some(std::mem::replace(&mut self.entries[index].fields, fields)),
            None => {
                self.entries.push(Translation {
                    id: None,
                    language_code: language,
                    fields,
                });
                None
            }
        }
    }

    pub fn remove(&mut self, language: &LanguageCode) -> Option<Translation<F>> {
        let index = self.position(language)?;
        Some(self.entries.remove(index))
    }

    pub fn get(&self, language: &LanguageCode) -> Option<&F> {
        self.entry(language).map(|t| &t.fields)
    }

    pub fn entry(&self, language: &LanguageCode) -> Option<&Translation<F>> {
        self.entries.iter().find(|t| &t.language_code == language)
    }

    /// Restore a full entry (including its id), replacing any existing one
    pub fn restore(&mut self, entry: Translation<F>) {
        match self.position(&entry.language_code) {
            Some(index) => self.entries[index] = entry,
            None => self.entries.push(entry),
        }
    }

    /// Exact language, then primary language, then `Missing`
    pub fn resolve(&self, language: &LanguageCode, primary: &LanguageCode) -> Resolved<'_, F> {
        if let Some(fields) = self.get(language) {
            return Resolved::Exact(fields);
        }
        match self.get(primary) {
            Some(fields) => Resolved::Fallback(fields),
            None => Resolved::Missing,
        }
    }

    /// Check that the primary-language entry exists
    pub fn require(
        &self,
        primary: &LanguageCode,
        entity: EntityPath,
    ) -> Result<(), MissingTranslation> {
        if self.get(primary).is_some() {
            Ok(())
        } else {
            Err(MissingTranslation {
                entity,
                language: primary.clone(),
            })
        }
    }

    pub fn languages(&self) -> impl Iterator<Item = &LanguageCode> {
        self.entries.iter().map(|t| &t.language_code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Translation<F>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
