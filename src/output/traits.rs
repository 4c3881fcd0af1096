//! Sink trait and error types
//!
//! A sink durably records a finished [`ResultBatch`]. Sinks are independent:
//! one sink failing never stops another from writing.

use crate::model::ResultBatch;
use thiserror::Error;

/// Errors that can occur while writing a batch
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// A durable destination for result batches
pub trait ResultSink {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Writes the whole batch
    ///
    /// # Arguments
    ///
    /// * `batch` - The results of one run, in input order
    fn write(&mut self, batch: &ResultBatch) -> SinkResult<()>;
}

/// Outcome of one sink's write
#[derive(Debug)]
pub struct SinkReport {
    pub sink: String,
    pub outcome: SinkResult<()>,
}

impl SinkReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}
