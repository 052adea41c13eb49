//! Flixmeta Ingest - catalog enrichment tool

use anyhow::{Context, Result};
use clap::Parser;
use flixmeta_common::logging::{init_logging, LogConfig, LogLevel};
use flixmeta_ingest::config::EnrichConfig;
use flixmeta_ingest::pipeline::{progress_bar, run_catalog};
use flixmeta_ingest::EnrichmentStats;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "flixmeta-ingest")]
#[command(author, version, about = "Enrich a movie catalog with Wikidata metadata")]
struct Cli {
    /// Process the whole catalog instead of the first 100 records
    #[arg(long)]
    prod: bool,

    /// Directory holding movie_titles.txt and movie_data.csv
    #[arg(long, env = "FLIXMETA_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Input catalog (defaults to <data-dir>/movie_titles.txt)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output CSV (defaults to <data-dir>/movie_data.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// SPARQL endpoint
    #[arg(long, env = "FLIXMETA_ENDPOINT")]
    endpoint: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("flixmeta-ingest")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);

    // The run still works without logging
    let _guard = init_logging(&log_config).ok();

    match run(&cli).await {
        Ok(stats) => println!("{}", stats),
        Err(e) => {
            error!(error = %e, "Enrichment aborted");
            eprintln!("Error: {:#}", e);
            process::exit(1);
        },
    }
}

async fn run(cli: &Cli) -> Result<EnrichmentStats> {
    let mut config = EnrichConfig::from_env()?;

    if let Some(ref dir) = cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(ref endpoint) = cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    config.validate()?;

    let input = cli.input.clone().unwrap_or_else(|| config.input_path());
    let output = cli.output.clone().unwrap_or_else(|| config.output_path());
    let limit = config.record_limit(cli.prod);

    info!(
        input = %input.display(),
        output = %output.display(),
        mode = if cli.prod { "production" } else { "test" },
        endpoint = %config.endpoint,
        "Enriching catalog"
    );

    let stats = run_catalog(&config, &input, &output, limit, progress_bar())
        .await
        .with_context(|| format!("Failed to enrich {}", input.display()))?;

    Ok(stats)
}
