//! Spreadsheet access.
//!
//! [`GridSource`] is the seam the run loop fetches through; [`SheetsClient`]
//! implements it against the Google Sheets API.

pub mod client;
pub mod credentials;

pub use client::SheetsClient;
pub use credentials::CredentialSource;

use crate::error::ReportError;
use crate::models::RawGrid;
use std::future::Future;

/// Supplies the raw worksheet grid for one run.
pub trait GridSource {
    /// Fetch the grid. Failures are reported as `Auth`, `Connection` or
    /// `Fetch` errors.
    fn fetch(&self) -> impl Future<Output = Result<RawGrid, ReportError>>;
}
