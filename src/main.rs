//! # Ethics Board
//!
//! Collects government-ethics and nonprofit-ethics stories from external
//! feeds, tags each with a sentiment by keyword matching, and writes a
//! bounded JSON snapshot for a display page.
//!
//! ## Usage
//!
//! ```sh
//! ethics_board                      # news headlines -> data/stories.json
//! ethics_board --profile research   # Crossref works -> data/research.json
//! ```
//!
//! ## Architecture
//!
//! Every run is a single sequential pipeline:
//! 1. **Queries**: The profile's fixed search phrases, in order
//! 2. **Fetching**: One GET per query; failed queries are skipped
//! 3. **Parsing**: RSS items or Crossref works into uniform raw items
//! 4. **Classification**: Business filter, sentiment, category flags
//! 5. **Aggregation**: Dedup, newest first, at most N per category
//! 6. **Output**: JSON snapshot at the profile's path

use std::error::Error;
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{debug, info, instrument};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod aggregate;
mod classify;
mod cli;
mod config;
mod error;
mod feeds;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod profiles;
mod utils;

use cli::Cli;
use config::Settings;
use fetch::HttpFetcher;
use outputs::json;
use profiles::Profile;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("ethics_board starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = Settings::resolve(&args)?;
    let profile = Profile::build(args.profile, &settings, args.output.clone())?;
    info!(
        profile = profile.name.as_str(),
        queries = profile.queries.len(),
        mode = ?profile.classifier.mode(),
        fallback = ?profile.classifier.fallback(),
        output = %profile.output.display(),
        "Profile ready"
    );

    let fetcher = HttpFetcher::new(&settings.user_agent, Duration::from_secs(settings.timeout_secs))?;
    let report = pipeline::run(&fetcher, &profile, settings.max_per_category, Utc::now()).await;

    for outcome in &report.outcomes {
        debug!(
            query = outcome.phrase,
            fetched = outcome.fetched,
            kept = outcome.kept,
            error = outcome.error.as_deref().unwrap_or(""),
            "Query outcome"
        );
    }

    json::write_document(&report.document, &profile.output).await?;

    println!(
        "Wrote {} with {} government and {} nonprofit stories.",
        profile.output.display(),
        report.document.government.len(),
        report.document.nonprofit.len()
    );

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        failed_queries = report.failed_queries(),
        "Execution complete"
    );

    Ok(())
}
