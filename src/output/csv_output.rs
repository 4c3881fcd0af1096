//! CSV sink
//!
//! Writes `url,content` plus one row per result, replacing the file each run.

use crate::model::ResultBatch;
use crate::output::traits::{ResultSink, SinkResult};
use std::path::{Path, PathBuf};

/// Header row of the CSV output
pub const CSV_HEADER: [&str; 2] = ["url", "content"];

/// Tabular sink backed by a CSV file
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultSink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    fn write(&mut self, batch: &ResultBatch) -> SinkResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::Writer::from_path(&self.path)?;
        writer.write_record(CSV_HEADER)?;
        for result in batch {
            writer.write_record([result.target.address().as_str(), result.content.as_str()])?;
        }
        writer.flush()?;

        tracing::info!("Wrote {} rows to {}", batch.len(), self.path.display());
        Ok(())
    }
}
