//! Wikidata SPARQL support
//!
//! - [`query`]: builds the per-movie lookup query
//! - [`response`]: decodes SPARQL JSON result documents
//! - [`extract`]: turns result rows into typed movie fields

pub mod extract;
pub mod query;
pub mod response;

pub use extract::{extract, ExtractedValue, FieldKind, MovieMetadata};
pub use query::{build_query, build_query_with, QueryOptions};
pub use response::QueryResult;
