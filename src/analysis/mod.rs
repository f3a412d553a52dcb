//! Worksheet analysis.
//!
//! Aggregation of the raw grid lives in [`aggregator`]; [`build_report`]
//! chains it with the table formatter.

pub mod aggregator;

pub use aggregator::aggregate;

use crate::error::ReportError;
use crate::models::RawGrid;
use crate::report::generate_table;
use tracing::debug;

/// Aggregate a grid and render the fixed-width report table.
pub fn build_report(grid: &RawGrid) -> Result<String, ReportError> {
    let result = aggregate(grid)?;
    debug!("{} fanouts with totals: {:?}", result.len(), result.keys());
    Ok(generate_table(&result))
}
