//! Output module for persisting and reporting run results
//!
//! This module handles:
//! - Writing result batches to a CSV file (always)
//! - Appending result batches to a SQLite database (when enabled)
//! - Printing the run report

mod csv_output;
mod report;
mod sqlite_output;
mod traits;

pub use csv_output::{CsvSink, CSV_HEADER};
pub use report::{print_report, render_results, render_summary};
pub use sqlite_output::{count_rows, load_rows, SqliteSink, SCHEMA_SQL};
pub use traits::{ResultSink, SinkError, SinkReport, SinkResult};

use crate::config::OutputConfig;
use crate::model::ResultBatch;

/// Builds the sinks selected by the output configuration
///
/// # Arguments
///
/// * `output` - The `[output]` section of the configuration
/// * `store_in_database` - Whether the SQLite sink is enabled for this run
pub fn build_sinks(output: &OutputConfig, store_in_database: bool) -> Vec<Box<dyn ResultSink>> {
    let mut sinks: Vec<Box<dyn ResultSink>> = vec![Box::new(CsvSink::new(&output.csv_path))];
    if store_in_database {
        sinks.push(Box::new(SqliteSink::new(&output.database_path)));
    }
    sinks
}

/// Writes a batch to every sink
///
/// Sinks run one after another. A failing sink is logged and reported but
/// does not prevent the remaining sinks from writing.
pub fn write_all(batch: &ResultBatch, sinks: &mut [Box<dyn ResultSink>]) -> Vec<SinkReport> {
    sinks
        .iter_mut()
        .map(|sink| {
            let outcome = sink.write(batch);
            if let Err(e) = &outcome {
                tracing::error!("Sink '{}' failed: {}", sink.name(), e);
            }
            SinkReport {
                sink: sink.name().to_string(),
                outcome,
            }
        })
        .collect()
}
