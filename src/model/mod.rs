//! Core data model
//!
//! Targets and selectors are built once from configuration and never change
//! during a run. Results are produced once per target and collected, in input
//! order, into a [`ResultBatch`].

mod origin;
mod result;
mod target;

pub use origin::Origin;
pub use result::{ResultBatch, ResultStatus, ScrapeResult};
pub use target::{Selector, Target};
