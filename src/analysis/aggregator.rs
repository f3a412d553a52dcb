//! Fanout aggregation.
//!
//! Turns a raw worksheet grid into per-fanout container totals: find the
//! header row, check the required columns, coerce quantities to numbers,
//! sum them per fanout in first-seen order and drop lanes with nothing in
//! them.

use crate::error::ReportError;
use crate::models::{AggregationResult, FanoutGroup, GroupTotals, RawGrid, ValueColumn, FANOUT};
use std::collections::HashMap;
use tracing::debug;

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderLayout {
    /// Index of the header row within the grid.
    row_index: usize,
    /// Number of header cells; records are truncated to this width.
    width: usize,
    key_column: usize,
    value_columns: [(ValueColumn, usize); 3],
}

/// Aggregate container totals per fanout.
pub fn aggregate(grid: &RawGrid) -> Result<AggregationResult, ReportError> {
    let layout = resolve_layout(grid)?;

    let records = &grid[layout.row_index + 1..];
    if records.is_empty() {
        return Err(ReportError::NoData);
    }
    debug!(
        "Header at row {}, {} records follow",
        layout.row_index,
        records.len()
    );

    let groups: Vec<FanoutGroup> = group_in_order(records, &layout)
        .into_iter()
        .filter(|g| !g.totals.is_zero())
        .collect();

    if groups.is_empty() {
        return Err(ReportError::AllZero);
    }

    Ok(AggregationResult::new(groups))
}

/// Index of the first row containing the `FANOUT` marker, compared trimmed
/// and case-insensitively.
pub fn find_header_row(grid: &RawGrid) -> Option<usize> {
    grid.iter().position(|row| marker_position(row).is_some())
}

fn marker_position(row: &[String]) -> Option<usize> {
    row.iter()
        .position(|cell| cell.trim().to_uppercase() == FANOUT)
}

fn resolve_layout(grid: &RawGrid) -> Result<HeaderLayout, ReportError> {
    let row_index = find_header_row(grid).ok_or(ReportError::HeaderNotFound)?;
    let header: Vec<&str> = grid[row_index].iter().map(|h| h.trim()).collect();
    let key_column = marker_position(&grid[row_index]).ok_or(ReportError::HeaderNotFound)?;

    let mut value_columns = [(ValueColumn::PalletScuttle, 0); 3];
    for (slot, column) in value_columns.iter_mut().zip(ValueColumn::ALL) {
        let index = header
            .iter()
            .position(|h| *h == column.label())
            .ok_or_else(|| ReportError::MissingColumn(column.label().to_string()))?;
        *slot = (column, index);
    }

    Ok(HeaderLayout {
        row_index,
        width: header.len(),
        key_column,
        value_columns,
    })
}

/// Sum every record into its fanout group, keeping first-seen order.
///
/// Records too short to have a fanout cell belong to no group.
fn group_in_order(records: &[Vec<String>], layout: &HeaderLayout) -> Vec<FanoutGroup> {
    let mut groups: Vec<FanoutGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in records {
        let cells = &row[..row.len().min(layout.width)];

        let Some(key) = cells.get(layout.key_column) else {
            continue;
        };
        let key = key.trim();

        let slot = *index.entry(key.to_string()).or_insert_with(|| {
            groups.push(FanoutGroup {
                key: key.to_string(),
                totals: GroupTotals::default(),
            });
            groups.len() - 1
        });

        for (column, position) in layout.value_columns {
            let value = cells.get(position).map_or(0.0, |c| coerce_number(c));
            groups[slot].totals.add(column, value);
        }
    }

    groups
}

/// Parse a quantity cell. Anything that is not a finite number counts as 0.
pub fn coerce_number(cell: &str) -> f64 {
    match cell.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}
