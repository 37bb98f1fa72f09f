//! # List Query Builder
//!
//! Turns a [`RecipeFilter`] plus [`Pagination`] into the canonical parameter
//! list for the listing call.
//!
//! ## Rules
//!
//! - Parameters appear in a fixed order, so equal inputs give byte-identical
//!   output (the query doubles as a cache key)
//! - Unset fields and empty strings are left out entirely
//! - Tags are joined with `,` in selection order
//! - `page` and `perPage` are always present

use chrono::NaiveDate;
use recipe_model::ServerId;
use std::fmt;

use crate::error::QueryError;
use crate::filter::{Pagination, RecipeFilter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered query parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ListQuery {
    params: Vec<(String, String)>,
}

/// Build the canonical list query
pub fn build_list_query(filter: &RecipeFilter, pagination: &Pagination) -> ListQuery {
    let mut query = ListQuery::default();

    query.push_text("search", filter.search.as_deref());
    query.push_text("ingredient", filter.ingredient.as_deref());

    let tags = filter
        .tags
        .iter()
        .map(ServerId::as_str)
        .filter(|id| !id.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    query.push_text("tags", Some(&tags));

    query.push_number("minPrep", filter.min_prep);
    query.push_number("maxPrep", filter.max_prep);
    query.push_number("minCook", filter.min_cook);
    query.push_number("maxCook", filter.max_cook);
    query.push_number("minSteps", filter.min_steps);
    query.push_number("maxSteps", filter.max_steps);

    query.push_date("dateFrom", filter.date_from);
    query.push_date("dateTo", filter.date_to);

    query.push_text("lang", filter.lang.as_deref());
    if filter.scope {
        query.push("scope", "true".to_string());
    }

    query.push("page", pagination.page.to_string());
    query.push("perPage", pagination.per_page.to_string());

    query
}

impl ListQuery {
    fn push(&mut self, key: &str, value: String) {
        self.params.push((key.to_string(), value));
    }

    fn push_text(&mut self, key: &str, value: Option<&str>) {
        if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
            self.push(key, value.to_string());
        }
    }

    fn push_number(&mut self, key: &str, value: Option<u32>) {
        if let Some(value) = value {
            self.push(key, value.to_string());
        }
    }

    fn push_date(&mut self, key: &str, value: Option<NaiveDate>) {
        if let Some(value) = value {
            self.push(key, value.format(DATE_FORMAT).to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// `key=value&...` with percent-encoded values
    pub fn to_query_string(&self) -> String {
        self.params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a query string, keeping parameter order
    pub fn parse(input: &str) -> Result<Self, QueryError> {
        let input = input.strip_prefix('?').unwrap_or(input);
        let mut query = ListQuery::default();

        for pair in input.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| QueryError::MalformedPair(pair.to_string()))?;
            let key = decode(key)?;
            let value = decode(value)?;
            query.params.push((key, value));
        }

        Ok(query)
    }

    /// Read the filter back out of the parameters
    pub fn filter(&self) -> Result<RecipeFilter, QueryError> {
        Ok(RecipeFilter {
            search: self.get("search").map(str::to_string),
            ingredient: self.get("ingredient").map(str::to_string),
            tags: self
                .get("tags")
                .map(|tags| {
                    tags.split(',')
                        .filter(|t| !t.is_empty())
                        .map(ServerId::from)
                        .collect()
                })
                .unwrap_or_default(),
            min_prep: self.number("minPrep")?,
            max_prep: self.number("maxPrep")?,
            min_cook: self.number("minCook")?,
            max_cook: self.number("maxCook")?,
            min_steps: self.number("minSteps")?,
            max_steps: self.number("maxSteps")?,
            date_from: self.date("dateFrom")?,
            date_to: self.date("dateTo")?,
            lang: self.get("lang").map(str::to_string),
            scope: self.get("scope") == Some("true"),
        })
    }

    /// Read pagination, defaulting whatever is missing
    pub fn pagination(&self) -> Result<Pagination, QueryError> {
        let defaults = Pagination::default();
        Ok(Pagination {
            page: self.number("page")?.unwrap_or(defaults.page),
            per_page: self.number("perPage")?.unwrap_or(defaults.per_page),
        })
    }

    fn number(&self, key: &str) -> Result<Option<u32>, QueryError> {
        self.get(key)
            .map(|value| {
                value.parse().map_err(|_| QueryError::InvalidNumber {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }

    fn date(&self, key: &str) -> Result<Option<NaiveDate>, QueryError> {
        self.get(key)
            .map(|value| {
                NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| QueryError::InvalidDate {
                    key: key.to_string(),
                    value: value.to_string(),
                })
            })
            .transpose()
    }
}

impl fmt::Display for ListQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

fn decode(raw: &str) -> Result<String, QueryError> {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .map_err(|e| QueryError::Decode(e.to_string()))
}
