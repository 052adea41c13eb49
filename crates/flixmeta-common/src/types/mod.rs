//! Catalog record types

use crate::error::{CommonError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Marker written in place of any value that could not be resolved.
pub const MISSING: &str = "NULL";

/// Separator used when a genre set is flattened into a single column.
pub const GENRE_SEPARATOR: &str = "|";

/// One line of the input catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Identifier assigned by the catalog
    pub catalog_id: String,

    /// Release year, `None` when the catalog carries the `NULL` marker
    pub release_year: Option<i32>,

    /// Title as written in the catalog, commas included
    pub title: String,
}

impl SourceRecord {
    pub fn new(catalog_id: impl Into<String>, release_year: Option<i32>, title: impl Into<String>) -> Self {
        Self {
            catalog_id: catalog_id.into(),
            release_year,
            title: title.into(),
        }
    }

    /// Parse a `catalog_id,year,title` line.
    ///
    /// The line is split into at most three fields, so the title keeps any
    /// embedded commas. `line_no` is only used for error reporting.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let mut fields = line.splitn(3, ',');

        let (Some(catalog_id), Some(year), Some(title)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(CommonError::invalid_record(
                line_no,
                format!("expected 3 comma-separated fields, got '{}'", line),
            ));
        };

        let release_year = match year.trim() {
            MISSING => None,
            raw => Some(raw.parse::<i32>().map_err(|e| {
                CommonError::invalid_record(line_no, format!("invalid release year '{}': {}", raw, e))
            })?),
        };

        Ok(Self::new(catalog_id, release_year, title))
    }
}

/// A catalog record merged with the metadata found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub catalog_id: String,

    /// Knowledge-graph identifier (e.g. `Q12345`); `None` when no entity matched
    pub external_id: Option<String>,

    pub title: String,

    pub release_year: Option<i32>,

    /// Deduplicated genre labels; `None` when the entity has no genre
    pub genres: Option<BTreeSet<String>>,

    pub director: Option<String>,
}

impl EnrichedRecord {
    /// Record for a source entry that was never matched.
    pub fn unresolved(source: &SourceRecord) -> Self {
        Self {
            catalog_id: source.catalog_id.clone(),
            external_id: None,
            title: source.title.clone(),
            release_year: source.release_year,
            genres: None,
            director: None,
        }
    }

    /// Whether the lookup failed to identify an entity.
    ///
    /// Only the external id counts; genre and director may be absent on a
    /// matched record.
    pub fn is_missing(&self) -> bool {
        self.external_id.is_none()
    }

    /// Flatten into output columns, substituting [`MISSING`] for absent values.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.catalog_id.clone(),
            or_missing(self.external_id.as_deref()),
            self.title.clone(),
            self.release_year
                .map(|y| y.to_string())
                .unwrap_or_else(|| MISSING.to_string()),
            self.genres
                .as_ref()
                .map(|g| g.iter().map(String::as_str).collect::<Vec<_>>().join(GENRE_SEPARATOR))
                .unwrap_or_else(|| MISSING.to_string()),
            or_missing(self.director.as_deref()),
        ]
    }
}

fn or_missing(value: Option<&str>) -> String {
    value.unwrap_or(MISSING).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_keeps_commas_in_title() {
        let record = SourceRecord::parse_line("42,1999,Crouching Tiger, Hidden Dragon", 1).unwrap();
        assert_eq!(record.catalog_id, "42");
        assert_eq!(record.release_year, Some(1999));
        assert_eq!(record.title, "Crouching Tiger, Hidden Dragon");
    }

    #[test]
    fn test_parse_line_null_year() {
        let record = SourceRecord::parse_line("7,NULL,Some Title", 1).unwrap();
        assert_eq!(record.release_year, None);
        assert_eq!(record.title, "Some Title");
    }

    #[test]
    fn test_parse_line_rejects_bad_input() {
        let err = SourceRecord::parse_line("7,2003", 3).unwrap_err();
        assert!(matches!(err, CommonError::InvalidRecord { line: 3, .. }));

        let err = SourceRecord::parse_line("7,two thousand,Title", 4).unwrap_err();
        assert!(matches!(err, CommonError::InvalidRecord { line: 4, .. }));
    }

    #[test]
    fn test_unresolved_row() {
        let source = SourceRecord::new("7", None, "Some Title");
        let record = EnrichedRecord::unresolved(&source);

        assert!(record.is_missing());
        assert_eq!(record.to_row(), ["7", "NULL", "Some Title", "NULL", "NULL", "NULL"]);
    }

    #[test]
    fn test_resolved_row_sorts_genres() {
        let record = EnrichedRecord {
            catalog_id: "12".to_string(),
            external_id: Some("Q12345".to_string()),
            title: "Dinosaur Planet".to_string(),
            release_year: Some(2003),
            genres: Some(["Documentary", "Animation"].iter().map(|s| s.to_string()).collect()),
            director: None,
        };

        assert!(!record.is_missing());
        assert_eq!(
            record.to_row(),
            ["12", "Q12345", "Dinosaur Planet", "2003", "Animation|Documentary", "NULL"]
        );
    }
}
