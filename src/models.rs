//! Data models for the fanout report.
//!
//! A worksheet arrives as a [`RawGrid`] of cell strings and is reduced to an
//! [`AggregationResult`]: totals per fanout lane, in first-seen order.

use std::fmt;

/// Rows of cell strings as returned by the spreadsheet. Rows may differ in
/// length and cells may be empty.
pub type RawGrid = Vec<Vec<String>>;

/// Marker identifying the header row; also the label of the group-key column.
pub const FANOUT: &str = "FANOUT";

/// Container-type columns whose quantities are summed per fanout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueColumn {
    PalletScuttle,
    Gaiola,
    Saca,
}

impl ValueColumn {
    /// All value columns, in report order.
    pub const ALL: [ValueColumn; 3] = [
        ValueColumn::PalletScuttle,
        ValueColumn::Gaiola,
        ValueColumn::Saca,
    ];

    /// Header label as it appears in the worksheet.
    pub fn label(&self) -> &'static str {
        match self {
            ValueColumn::PalletScuttle => "PALLET/SCUTTLE",
            ValueColumn::Gaiola => "GAIOLA",
            ValueColumn::Saca => "SACA",
        }
    }
}

impl fmt::Display for ValueColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Summed quantities of one fanout lane.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupTotals {
    pub pallet_scuttle: f64,
    pub gaiola: f64,
    pub saca: f64,
}

impl GroupTotals {
    #[cfg(test)]
    pub fn new(pallet_scuttle: f64, gaiola: f64, saca: f64) -> Self {
        Self {
            pallet_scuttle,
            gaiola,
            saca,
        }
    }

    /// Total for a single column.
    pub fn get(&self, column: ValueColumn) -> f64 {
        match column {
            ValueColumn::PalletScuttle => self.pallet_scuttle,
            ValueColumn::Gaiola => self.gaiola,
            ValueColumn::Saca => self.saca,
        }
    }

    /// Add a quantity to a single column.
    pub fn add(&mut self, column: ValueColumn, value: f64) {
        match column {
            ValueColumn::PalletScuttle => self.pallet_scuttle += value,
            ValueColumn::Gaiola => self.gaiola += value,
            ValueColumn::Saca => self.saca += value,
        }
    }

    /// True when every column sums to exactly zero.
    pub fn is_zero(&self) -> bool {
        ValueColumn::ALL.iter().all(|c| self.get(*c) == 0.0)
    }
}

/// Totals for one fanout lane.
#[derive(Debug, Clone, PartialEq)]
pub struct FanoutGroup {
    /// Trimmed fanout key.
    pub key: String,
    pub totals: GroupTotals,
}

/// Non-empty list of fanout groups, ordered by first appearance in the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    groups: Vec<FanoutGroup>,
}

impl AggregationResult {
    pub(crate) fn new(groups: Vec<FanoutGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[FanoutGroup] {
        &self.groups
    }

    /// Fanout keys in report order.
    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.key.as_str()).collect()
    }

    /// Totals for a fanout key, if that lane survived filtering.
    #[cfg(test)]
    pub fn totals_for(&self, key: &str) -> Option<&GroupTotals> {
        self.groups.iter().find(|g| g.key == key).map(|g| &g.totals)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}
