//! Error types for report building and delivery.

use thiserror::Error;

/// Reasons a run ends without a report to deliver.
///
/// Source failures (`Auth`, `Connection`, `Fetch`) and the aggregation
/// failures share one type so the orchestration can branch on a single
/// result.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Failed to load Google credentials: {0}")]
    Auth(String),

    #[error("Failed to connect to the spreadsheet: {0}")]
    Connection(String),

    #[error("Failed to read the spreadsheet data: {0}")]
    Fetch(String),

    #[error("Could not find the 'FANOUT' header row")]
    HeaderNotFound,

    #[error("Column '{0}' was not found in the worksheet")]
    MissingColumn(String),

    #[error("No data found after the header row")]
    NoData,

    #[error("No data found with values greater than zero")]
    AllZero,
}

impl ReportError {
    /// True when the sheet was read fine but there is nothing worth posting.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, ReportError::NoData | ReportError::AllZero)
    }
}

/// Failure to post a message to the webhook.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Webhook request timed out after {0}s")]
    Timeout(u64),

    #[error("Cannot connect to webhook at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to send webhook request: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Webhook returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_result_variants() {
        assert!(ReportError::NoData.is_empty_result());
        assert!(ReportError::AllZero.is_empty_result());
        assert!(!ReportError::HeaderNotFound.is_empty_result());
        assert!(!ReportError::Auth("missing".to_string()).is_empty_result());
    }

    #[test]
    fn test_missing_column_names_column() {
        let err = ReportError::MissingColumn("GAIOLA".to_string());
        assert!(err.to_string().contains("'GAIOLA'"));
    }
}
