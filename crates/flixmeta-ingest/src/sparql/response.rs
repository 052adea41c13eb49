//! SPARQL 1.1 JSON result documents
//!
//! Only the parts the extractor reads are modelled; unknown keys are ignored.

use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// A decoded `application/sparql-results+json` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResult {
    #[serde(default)]
    pub head: Head,

    pub results: Bindings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Head {
    #[serde(default)]
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Bindings {
    pub bindings: Vec<Row>,
}

/// One solution: variable name to bound term. Unbound variables are absent.
pub type Row = HashMap<String, Term>;

/// A bound RDF term
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Term {
    /// `uri`, `literal`, `typed-literal` or `bnode`
    #[serde(rename = "type")]
    pub kind: String,

    pub value: String,

    #[serde(rename = "xml:lang", default)]
    pub lang: Option<String>,
}

impl Term {
    pub fn is_uri(&self) -> bool {
        self.kind == "uri"
    }
}

impl QueryResult {
    /// Decode a response body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| IngestError::malformed(e.to_string()))
    }

    pub fn rows(&self) -> &[Row] {
        &self.results.bindings
    }

    pub fn is_empty(&self) -> bool {
        self.results.bindings.is_empty()
    }
}
