//! Flixmeta Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the Flixmeta workspace.
//!
//! # Overview
//!
//! - **Types**: catalog records before and after enrichment
//! - **Error Handling**: the error type shared by loaders and writers
//! - **Logging**: `tracing` subscriber setup used by every binary
//!
//! # Example
//!
//! ```no_run
//! use flixmeta_common::{Result, SourceRecord};
//!
//! fn parse(line: &str) -> Result<SourceRecord> {
//!     SourceRecord::parse_line(line, 1)
//! }
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{CommonError, Result};
pub use types::{EnrichedRecord, SourceRecord, MISSING};
