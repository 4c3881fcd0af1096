//! Run report printed after a pipeline run
//!
//! Shows one `url: content` line per target followed by counts per status.

use crate::model::{ResultBatch, ResultStatus};
use std::fmt::Write;

/// Renders the `url: content` lines for every result, in batch order
pub fn render_results(batch: &ResultBatch) -> String {
    let mut out = String::new();
    for result in batch {
        let _ = writeln!(out, "{}: {}", result.target.address(), result.content);
    }
    out
}

/// Renders the per-status summary of a batch
pub fn render_summary(batch: &ResultBatch) -> String {
    let mut out = String::new();
    let total = batch.len();

    let _ = writeln!(out, "=== Run Summary ===");
    let _ = writeln!(out, "  Targets: {}", total);

    for status in ResultStatus::all() {
        let count = batch.count(status);
        if count == 0 {
            continue;
        }
        let percentage = (count as f64 / total as f64) * 100.0;
        let _ = writeln!(out, "  {}: {} ({:.1}%)", status, count, percentage);
    }

    let failures: Vec<_> = batch.iter().filter(|r| r.error.is_some()).collect();
    if !failures.is_empty() {
        let _ = writeln!(out, "\nErrors:");
        for result in failures {
            let _ = writeln!(
                out,
                "  - {}: {}",
                result.target.address(),
                result.error.as_deref().unwrap_or_default()
            );
        }
    }

    out
}

/// Prints the results and the summary to stdout
pub fn print_report(batch: &ResultBatch) {
    print!("{}", render_results(batch));
    println!();
    print!("{}", render_summary(batch));
}
