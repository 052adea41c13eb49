//! Flixmeta Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Enriches a movie catalog with Wikidata metadata: external entity id,
//! genres and director.
//!
//! # Flow
//!
//! For every catalog record, in order:
//!
//! 1. [`sparql::build_query`] turns title and year into a SPARQL query
//! 2. [`client::RetryingClient`] posts it, retrying timeouts with backoff
//! 3. [`sparql::extract`] pulls the fields out of the result rows
//!
//! [`pipeline::EnrichmentPipeline`] drives the loop and keeps the counts.
//!
//! # Example
//!
//! ```no_run
//! use flixmeta_ingest::client::{HttpTransport, RetryPolicy, RetryingClient};
//! use flixmeta_ingest::config::EnrichConfig;
//! use flixmeta_ingest::pipeline::EnrichmentPipeline;
//! use flixmeta_common::SourceRecord;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EnrichConfig::from_env()?;
//!     let client = RetryingClient::new(HttpTransport::new(&config)?, RetryPolicy::from_config(&config));
//!     let pipeline = EnrichmentPipeline::new(client, config.query.clone());
//!
//!     let records = vec![SourceRecord::new("12", Some(2003), "Dinosaur Planet")];
//!     let report = pipeline.enrich(&records).await?;
//!     println!("{}", report.stats);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod sparql;

// Re-export commonly used types
pub use error::{IngestError, Result};
pub use pipeline::{EnrichmentPipeline, EnrichmentReport, EnrichmentStats};
