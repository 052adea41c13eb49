//! Error types for the enrichment pipeline
//!
//! Every variant is fatal for a run. Only [`IngestError::Timeout`] is ever
//! retried, and only inside [`RetryingClient`](crate::client::RetryingClient);
//! once the retry budget is spent it becomes [`IngestError::ServiceUnavailable`].

use flixmeta_common::CommonError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for ingest operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Every attempt for one movie timed out
    #[error("Tried {attempts} times, could not reach the query service (movie: {title} {year})")]
    ServiceUnavailable {
        title: String,
        year: i32,
        attempts: u32,
    },

    /// The service answered with a non-success status
    #[error("Query service returned HTTP {status}: {body}")]
    ServiceError { status: u16, body: String },

    /// The response body is not a SPARQL JSON result document
    #[error("Malformed query response: {0}")]
    MalformedResponse(String),

    /// A single request exceeded its deadline
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection-level failure other than a timeout
    #[error("Network request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl IngestError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Whether the error is a per-attempt timeout that may be retried.
    pub fn is_timeout(&self) -> bool {
        matches!(self, IngestError::Timeout(_))
    }
}
