//! Fixed-width table generation.
//!
//! Renders fanout totals as a monospace table meant to be shown inside a
//! chat code block:
//!
//! ```text
//! FANOUT | PALLET/SCUTTLE | GAIOLA | SACA
//! -------+----------------+--------+-----
//! L1     |       4        |   2    |  0
//! ```

use crate::models::{AggregationResult, FanoutGroup, ValueColumn, FANOUT};

const COLUMN_SEPARATOR: &str = " | ";
const RULE_SEPARATOR: &str = "-+-";

/// Display widths for the key column and each value column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnWidths {
    pub key: usize,
    pub values: [usize; 3],
}

impl ColumnWidths {
    /// Each width is the longest of the header label and every rendered cell.
    pub fn measure(result: &AggregationResult) -> Self {
        let key = result
            .groups()
            .iter()
            .map(|g| text_len(&g.key))
            .fold(text_len(FANOUT), usize::max);

        let values = ValueColumn::ALL.map(|column| {
            result
                .groups()
                .iter()
                .map(|g| text_len(&format_total(g.totals.get(column))))
                .fold(text_len(column.label()), usize::max)
        });

        Self { key, values }
    }
}

/// Generate the report table: header, rule, then one line per fanout.
pub fn generate_table(result: &AggregationResult) -> String {
    let widths = ColumnWidths::measure(result);

    let mut lines = Vec::with_capacity(result.len() + 2);
    lines.push(generate_header_line(&widths));
    lines.push(generate_rule_line(&widths));
    for group in result.groups() {
        lines.push(generate_group_line(group, &widths));
    }

    lines.join("\n")
}

fn generate_header_line(widths: &ColumnWidths) -> String {
    let mut parts = vec![ljust(FANOUT, widths.key)];
    for (column, width) in ValueColumn::ALL.iter().zip(widths.values) {
        parts.push(center(column.label(), width));
    }
    parts.join(COLUMN_SEPARATOR)
}

fn generate_rule_line(widths: &ColumnWidths) -> String {
    let mut parts = vec!["-".repeat(widths.key)];
    parts.extend(widths.values.iter().map(|w| "-".repeat(*w)));
    parts.join(RULE_SEPARATOR)
}

fn generate_group_line(group: &FanoutGroup, widths: &ColumnWidths) -> String {
    let mut parts = vec![ljust(&group.key, widths.key)];
    for (column, width) in ValueColumn::ALL.iter().zip(widths.values) {
        parts.push(center(&format_total(group.totals.get(*column)), width));
    }
    parts.join(COLUMN_SEPARATOR)
}

/// Render a total as an integer, dropping any fractional part.
///
/// Formatted from the float itself so large totals print in full.
pub fn format_total(total: f64) -> String {
    let whole = total.trunc();
    if whole == 0.0 {
        // -0.4 truncates to -0.0
        return "0".to_string();
    }
    format!("{:.0}", whole)
}

fn text_len(text: &str) -> usize {
    text.chars().count()
}

fn ljust(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text_len(text));
    format!("{}{}", text, " ".repeat(pad))
}

/// Center `text` in `width` columns.
///
/// With an odd amount of padding the extra space goes to the right, except
/// when the width is odd too, where it goes to the left.
fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text_len(text));
    let left = pad / 2 + (pad & width & 1);
    let right = pad - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}
