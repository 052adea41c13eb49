//! Record-by-record enrichment
//!
//! Records are resolved strictly in input order, one at a time: a record and
//! all of its retries finish before the next lookup starts. Output index `i`
//! always corresponds to input index `i`.

use crate::catalog::{load_catalog, CatalogWriter};
use crate::client::{HttpTransport, MovieQuery, RetryPolicy, RetryingClient, SparqlTransport};
use crate::config::EnrichConfig;
use crate::error::Result;
use crate::sparql::{build_query_with, MovieMetadata, QueryOptions};
use flixmeta_common::{EnrichedRecord, SourceRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::Path;
use tracing::{debug, info};

/// Counts of resolved and unresolved records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentStats {
    pub total: usize,

    /// Records without an external id
    pub missing: usize,
}

impl EnrichmentStats {
    pub fn record(&mut self, record: &EnrichedRecord) {
        self.total += 1;
        if record.is_missing() {
            self.missing += 1;
        }
    }

    pub fn found(&self) -> usize {
        self.total - self.missing
    }

    pub fn missing_pct(&self) -> f64 {
        percent(self.missing, self.total)
    }

    pub fn found_pct(&self) -> f64 {
        percent(self.found(), self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

impl fmt::Display for EnrichmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "missing:  {} ({:.1}%)", self.missing, self.missing_pct())?;
        writeln!(f, "found: {} ({:.1}%)", self.found(), self.found_pct())?;
        write!(f, "total: {}", self.total)
    }
}

/// Enriched records of a completed run
#[derive(Debug, Clone)]
pub struct EnrichmentReport {
    pub records: Vec<EnrichedRecord>,
    pub stats: EnrichmentStats,
}

/// Drives query building, fetching and extraction for every record
pub struct EnrichmentPipeline<T> {
    client: RetryingClient<T>,
    query: QueryOptions,
    progress: ProgressBar,
}

impl<T: SparqlTransport> EnrichmentPipeline<T> {
    pub fn new(client: RetryingClient<T>, query: QueryOptions) -> Self {
        Self {
            client,
            query,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress`; its length is set when a run starts.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn client(&self) -> &RetryingClient<T> {
        &self.client
    }

    /// Enrich `records`, collecting the results in memory.
    ///
    /// Any fetch failure aborts the whole run.
    pub async fn enrich(&self, records: &[SourceRecord]) -> Result<EnrichmentReport> {
        let mut enriched = Vec::with_capacity(records.len());

        let stats = self
            .enrich_into(records, |record| {
                enriched.push(record);
                Ok(())
            })
            .await?;

        Ok(EnrichmentReport {
            records: enriched,
            stats,
        })
    }

    /// Enrich `records`, handing each result to `sink` before the next lookup.
    ///
    /// If the run aborts, `sink` has already received every record before the
    /// failing one, in input order.
    pub async fn enrich_into<F>(&self, records: &[SourceRecord], mut sink: F) -> Result<EnrichmentStats>
    where
        F: FnMut(EnrichedRecord) -> Result<()>,
    {
        info!(records = records.len(), "Starting enrichment");
        self.progress.set_length(records.len() as u64);

        let mut stats = EnrichmentStats::default();

        for source in records {
            let record = match self.enrich_record(source).await {
                Ok(record) => record,
                Err(e) => {
                    self.progress.abandon();
                    return Err(e);
                },
            };

            stats.record(&record);
            sink(record)?;
            self.progress.inc(1);
        }

        self.progress.finish();
        info!(
            total = stats.total,
            found = stats.found(),
            missing = stats.missing,
            "Enrichment complete"
        );

        Ok(stats)
    }

    /// Resolve a single record.
    ///
    /// Records without a release year can never satisfy the year filter and
    /// are returned unresolved without contacting the service.
    pub async fn enrich_record(&self, source: &SourceRecord) -> Result<EnrichedRecord> {
        let Some(year) = source.release_year else {
            debug!(catalog_id = %source.catalog_id, "No release year, skipping lookup");
            return Ok(EnrichedRecord::unresolved(source));
        };

        let query = MovieQuery {
            title: source.title.clone(),
            year,
            sparql: build_query_with(&self.query, &source.title, year),
        };

        let result = self.client.fetch(&query).await?;
        let metadata = MovieMetadata::from_result(&result);

        debug!(
            catalog_id = %source.catalog_id,
            external_id = metadata.external_id.as_deref().unwrap_or("-"),
            rows = result.rows().len(),
            "Resolved record"
        );

        Ok(EnrichedRecord {
            catalog_id: source.catalog_id.clone(),
            external_id: metadata.external_id,
            title: source.title.clone(),
            release_year: source.release_year,
            genres: metadata.genres,
            director: metadata.director,
        })
    }
}

/// Enrich the catalog at `input` against the configured endpoint and write
/// the result to `output`.
///
/// Rows are flushed as they are produced, so an aborted run leaves every
/// record resolved before the failure in `output`.
pub async fn run_catalog(
    config: &EnrichConfig,
    input: &Path,
    output: &Path,
    limit: Option<usize>,
    progress: ProgressBar,
) -> Result<EnrichmentStats> {
    let records = load_catalog(input, limit)?;

    let client = RetryingClient::new(HttpTransport::new(config)?, RetryPolicy::from_config(config));
    let pipeline = EnrichmentPipeline::new(client, config.query.clone()).with_progress(progress);

    let mut writer = CatalogWriter::create(output)?;
    let stats = pipeline
        .enrich_into(&records, |record| writer.write(&record))
        .await?;

    info!(path = %output.display(), rows = writer.written(), "Wrote enriched catalog");
    Ok(stats)
}

/// Terminal progress bar for an enrichment run
pub fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}
