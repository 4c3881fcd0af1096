//! Harvest module for fetching pages and extracting their content
//!
//! This module contains the core per-target logic, including:
//! - HTTP fetching behind the [`Fetch`] trait
//! - Retry of transient fetch failures
//! - Text extraction by tag and class
//! - The pipeline that ties policy, fetch and extraction together

mod extractor;
mod fetcher;
mod pipeline;
mod retry;

pub use extractor::{
    decode_document, extract, extract_page, extract_with_charset, MATCH_SEPARATOR,
};
pub use fetcher::{build_http_client, Fetch, FetchError, FetchedPage, Retriever, MAX_REDIRECTS};
pub use pipeline::Pipeline;
pub use retry::RetryingFetcher;

use crate::config::Config;
use crate::model::ResultBatch;
use crate::output::{build_sinks, write_all, SinkReport};
use tokio_util::sync::CancellationToken;

/// Runs a complete harvest described by a configuration
///
/// This is the main entry point for a run. It will:
/// 1. Build the targets and the HTTP client
/// 2. Process every target through the pipeline
/// 3. Write the batch to every enabled sink
///
/// # Arguments
///
/// * `config` - The validated configuration
/// * `store_in_database` - Whether the SQLite sink is enabled
/// * `cancel` - Token that stops the run early
///
/// # Returns
///
/// * `Ok((ResultBatch, Vec<SinkReport>))` - The results and each sink's outcome
/// * `Err(GleanError)` - The configuration could not be turned into a run
///
/// Sink failures do not fail the run; they are returned in the reports.
pub async fn glean(
    config: &Config,
    store_in_database: bool,
    cancel: CancellationToken,
) -> crate::Result<(ResultBatch, Vec<SinkReport>)> {
    let targets = config.build_targets()?;
    let pipeline = Pipeline::from_config(config)?;

    let batch = pipeline.run_with_cancel(&targets, cancel).await?;

    let mut sinks = build_sinks(&config.output, store_in_database);
    let reports = write_all(&batch, &mut sinks);

    Ok((batch, reports))
}
