//! Query service client with timeout retries
//!
//! [`HttpTransport`] issues one POST per query. [`RetryingClient`] wraps any
//! [`SparqlTransport`] and retries timeouts with exponential backoff:
//!
//! | timeout # | action                 |
//! |-----------|------------------------|
//! | 1..=5     | sleep 5, 10, 20, 40, 80 s then retry |
//! | 6         | fail with `ServiceUnavailable` |
//!
//! Any other failure (connection refused, HTTP 5xx, unparsable body) is
//! returned immediately without retrying.

use crate::config::EnrichConfig;
use crate::error::{IngestError, Result};
use crate::sparql::QueryResult;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Response format requested from the endpoint
const RESULT_FORMAT: &str = "json";

/// Executes one SPARQL query against the remote service.
///
/// Implementations report a request that ran out of time as
/// [`IngestError::Timeout`]; every other error is treated as fatal.
#[async_trait]
pub trait SparqlTransport: Send + Sync {
    async fn execute(&self, query: &str) -> Result<QueryResult>;
}

/// `reqwest`-backed transport for a SPARQL endpoint
pub struct HttpTransport {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpTransport {
    pub fn new(config: &EnrichConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            timeout: config.request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn map_error(&self, err: reqwest::Error) -> IngestError {
        if err.is_timeout() {
            IngestError::Timeout(self.timeout)
        } else {
            IngestError::Http(err)
        }
    }
}

#[async_trait]
impl SparqlTransport for HttpTransport {
    async fn execute(&self, query: &str) -> Result<QueryResult> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("query", query), ("format", RESULT_FORMAT)])
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.map_error(e))?;

        if !status.is_success() {
            return Err(IngestError::ServiceError {
                status: status.as_u16(),
                body,
            });
        }

        QueryResult::from_json(&body)
    }
}

/// Exponential backoff schedule for timed-out requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Timeouts retried before giving up; a call makes at most `max_retries + 1` attempts
    pub max_retries: u32,

    /// Delay after the first timeout
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_secs(crate::config::DEFAULT_BACKOFF_SECS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &EnrichConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: config.base_backoff,
        }
    }

    /// Delay to wait after the timeout of zero-based `attempt`: `base * 2^attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Per-call retry bookkeeping
#[derive(Debug, Default)]
struct RetryState {
    attempt: u32,
    elapsed_backoff: Duration,
}

/// A lookup to run: the query text plus the movie it is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovieQuery {
    pub title: String,
    pub year: i32,
    pub sparql: String,
}

/// Transport wrapper that retries timeouts
pub struct RetryingClient<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: SparqlTransport> RetryingClient<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run `query`, sleeping and retrying while the transport times out.
    pub async fn fetch(&self, query: &MovieQuery) -> Result<QueryResult> {
        let mut state = RetryState::default();

        loop {
            debug!(
                title = %query.title,
                year = query.year,
                attempt = state.attempt + 1,
                "Querying service"
            );

            match self.transport.execute(&query.sparql).await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_timeout() => {
                    if state.attempt >= self.policy.max_retries {
                        return Err(IngestError::ServiceUnavailable {
                            title: query.title.clone(),
                            year: query.year,
                            attempts: state.attempt + 1,
                        });
                    }

                    let delay = self.policy.delay_for(state.attempt);
                    warn!(
                        title = %query.title,
                        year = query.year,
                        attempt = state.attempt + 1,
                        delay_secs = delay.as_secs_f64(),
                        total_backoff_secs = (state.elapsed_backoff + delay).as_secs_f64(),
                        "Query timed out, backing off"
                    );

                    tokio::time::sleep(delay).await;
                    state.elapsed_backoff += delay;
                    state.attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }
}
