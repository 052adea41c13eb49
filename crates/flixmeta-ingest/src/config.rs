//! Enrichment configuration
//!
//! Everything the pipeline needs to know about its environment lives here and
//! is passed in explicitly; nothing is read from globals at lookup time.

use crate::error::{IngestError, Result};
use crate::sparql::QueryOptions;
use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Wikidata rejects anonymous clients, so every request identifies itself.
pub const DEFAULT_USER_AGENT: &str = "Flixmeta MovieBot 0.1.0 (https://github.com/flixmeta/flixmeta)";

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

pub const DEFAULT_MAX_RETRIES: u32 = 5;

/// First backoff delay; doubled on every further timeout
pub const DEFAULT_BACKOFF_SECS: u64 = 5;

/// Records processed in test mode
pub const DEFAULT_TEST_LIMIT: usize = 100;

pub const INPUT_FILE_NAME: &str = "movie_titles.txt";
pub const OUTPUT_FILE_NAME: &str = "movie_data.csv";

/// Configuration for an enrichment run
#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// SPARQL endpoint receiving the lookup POSTs
    pub endpoint: String,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Directory holding the input catalog and the output CSV
    pub data_dir: PathBuf,

    /// Deadline for a single request
    pub request_timeout: Duration,

    /// Timeouts tolerated per record before giving up
    pub max_retries: u32,

    pub base_backoff: Duration,

    pub query: QueryOptions,

    /// Number of records processed when not running in production mode
    pub test_limit: usize,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            data_dir: PathBuf::from("./data"),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            base_backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
            query: QueryOptions::default(),
            test_limit: DEFAULT_TEST_LIMIT,
        }
    }
}

impl EnrichConfig {
    pub fn builder() -> EnrichConfigBuilder {
        EnrichConfigBuilder::default()
    }

    /// Load configuration from environment variables
    ///
    /// - `FLIXMETA_ENDPOINT`
    /// - `FLIXMETA_USER_AGENT`
    /// - `FLIXMETA_DATA_DIR`
    /// - `FLIXMETA_TIMEOUT_SECS`
    /// - `FLIXMETA_MAX_RETRIES`
    /// - `FLIXMETA_BACKOFF_SECS`
    /// - `FLIXMETA_LANGUAGE`
    /// - `FLIXMETA_RELEASE_COUNTRY`
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(endpoint) = std::env::var("FLIXMETA_ENDPOINT") {
            config.endpoint = endpoint;
        }

        if let Ok(user_agent) = std::env::var("FLIXMETA_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(dir) = std::env::var("FLIXMETA_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(secs) = env_number::<u64>("FLIXMETA_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(retries) = env_number::<u32>("FLIXMETA_MAX_RETRIES")? {
            config.max_retries = retries;
        }

        if let Some(secs) = env_number::<u64>("FLIXMETA_BACKOFF_SECS")? {
            config.base_backoff = Duration::from_secs(secs);
        }

        if let Ok(language) = std::env::var("FLIXMETA_LANGUAGE") {
            config.query.language = language;
        }

        if let Ok(country) = std::env::var("FLIXMETA_RELEASE_COUNTRY") {
            config.query.release_country = country;
        }

        Ok(config)
    }

    pub fn input_path(&self) -> PathBuf {
        self.data_dir.join(INPUT_FILE_NAME)
    }

    pub fn output_path(&self) -> PathBuf {
        self.data_dir.join(OUTPUT_FILE_NAME)
    }

    /// Record limit for a run; `None` means the whole catalog.
    pub fn record_limit(&self, production: bool) -> Option<usize> {
        if production {
            None
        } else {
            Some(self.test_limit)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(IngestError::config("Endpoint cannot be empty"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(IngestError::config("User agent cannot be empty"));
        }

        if self.request_timeout.is_zero() {
            return Err(IngestError::config("Request timeout must be greater than 0"));
        }

        if self.query.language.trim().is_empty() {
            return Err(IngestError::config("Query language cannot be empty"));
        }

        let country = &self.query.release_country;
        let is_item_id = country.len() > 1
            && country.starts_with('Q')
            && country[1..].chars().all(|c| c.is_ascii_digit());
        if !is_item_id {
            return Err(IngestError::config(format!(
                "Release country must be a Wikidata item id such as Q30, got '{}'",
                country
            )));
        }

        Ok(())
    }
}

fn env_number<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| IngestError::config(format!("{} must be a number, got '{}': {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}

/// Builder for EnrichConfig
#[derive(Debug, Default)]
pub struct EnrichConfigBuilder {
    endpoint: Option<String>,
    user_agent: Option<String>,
    data_dir: Option<PathBuf>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    base_backoff: Option<Duration>,
    query: Option<QueryOptions>,
    test_limit: Option<usize>,
}

impl EnrichConfigBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    pub fn base_backoff(mut self, delay: Duration) -> Self {
        self.base_backoff = Some(delay);
        self
    }

    pub fn query(mut self, options: QueryOptions) -> Self {
        self.query = Some(options);
        self
    }

    pub fn test_limit(mut self, limit: usize) -> Self {
        self.test_limit = Some(limit);
        self
    }

    pub fn build(self) -> EnrichConfig {
        let defaults = EnrichConfig::default();

        EnrichConfig {
            endpoint: self.endpoint.unwrap_or(defaults.endpoint),
            user_agent: self.user_agent.unwrap_or(defaults.user_agent),
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            base_backoff: self.base_backoff.unwrap_or(defaults.base_backoff),
            query: self.query.unwrap_or(defaults.query),
            test_limit: self.test_limit.unwrap_or(defaults.test_limit),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnrichConfig::default();

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.request_timeout, Duration::from_secs(20));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.base_backoff, Duration::from_secs(5));
        assert_eq!(config.input_path(), PathBuf::from("./data/movie_titles.txt"));
        assert_eq!(config.output_path(), PathBuf::from("./data/movie_data.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_record_limit() {
        let config = EnrichConfig::builder().test_limit(10).build();

        assert_eq!(config.record_limit(false), Some(10));
        assert_eq!(config.record_limit(true), None);
    }

    #[test]
    fn test_builder_overrides() {
        let config = EnrichConfig::builder()
            .endpoint("http://localhost:9999/sparql")
            .max_retries(2)
            .base_backoff(Duration::from_millis(10))
            .data_dir("/tmp/flix")
            .build();

        assert_eq!(config.endpoint, "http://localhost:9999/sparql");
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.base_backoff, Duration::from_millis(10));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.output_path(), PathBuf::from("/tmp/flix/movie_data.csv"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = EnrichConfig::builder().endpoint("  ").build();
        assert!(matches!(config.validate(), Err(IngestError::Config(_))));

        let config = EnrichConfig::builder().request_timeout(Duration::ZERO).build();
        assert!(config.validate().is_err());

        let config = EnrichConfig::builder()
            .query(QueryOptions {
                language: "en".to_string(),
                release_country: "United States".to_string(),
            })
            .build();
        assert!(config.validate().is_err());
    }
}
