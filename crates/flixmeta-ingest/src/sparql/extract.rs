//! Field extraction from query results
//!
//! Entity id and director come from the first row only. Genres are collected
//! across every row, since the genre join fans one film out into one row per
//! genre.

use super::response::{QueryResult, Term};
use std::collections::BTreeSet;

/// A value requested from a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    EntityId,
    GenreLabels,
    DirectorLabel,
}

impl FieldKind {
    /// SPARQL variable holding this field
    pub fn variable(self) -> &'static str {
        match self {
            FieldKind::EntityId => "item",
            FieldKind::GenreLabels => "genreLabel",
            FieldKind::DirectorLabel => "directorLabel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedValue {
    Missing,
    Text(String),
    Labels(BTreeSet<String>),
}

impl ExtractedValue {
    pub fn into_text(self) -> Option<String> {
        match self {
            ExtractedValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_labels(self) -> Option<BTreeSet<String>> {
        match self {
            ExtractedValue::Labels(labels) => Some(labels),
            _ => None,
        }
    }
}

/// Pull `field` out of `result`.
///
/// Returns [`ExtractedValue::Missing`] when there are no rows or the field is
/// unbound. For genres an empty label set is also reported as missing.
pub fn extract(result: &QueryResult, field: FieldKind) -> ExtractedValue {
    let var = field.variable();

    match field {
        FieldKind::GenreLabels => {
            let labels: BTreeSet<String> = result
                .rows()
                .iter()
                .filter_map(|row| row.get(var))
                .map(|term| term.value.clone())
                .collect();

            if labels.is_empty() {
                ExtractedValue::Missing
            } else {
                ExtractedValue::Labels(labels)
            }
        },
        FieldKind::EntityId | FieldKind::DirectorLabel => result
            .rows()
            .first()
            .and_then(|row| row.get(var))
            .map(|term| ExtractedValue::Text(term_text(term)))
            .unwrap_or(ExtractedValue::Missing),
    }
}

/// Typed fields of one lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieMetadata {
    pub external_id: Option<String>,
    pub genres: Option<BTreeSet<String>>,
    pub director: Option<String>,
}

impl MovieMetadata {
    pub fn from_result(result: &QueryResult) -> Self {
        Self {
            external_id: extract(result, FieldKind::EntityId).into_text(),
            genres: extract(result, FieldKind::GenreLabels).into_labels(),
            director: extract(result, FieldKind::DirectorLabel).into_text(),
        }
    }
}

/// URIs are reduced to their last path segment (`.../entity/Q42` -> `Q42`).
fn term_text(term: &Term) -> String {
    if term.is_uri() {
        term.value
            .rsplit('/')
            .next()
            .unwrap_or(&term.value)
            .to_string()
    } else {
        term.value.clone()
    }
}
