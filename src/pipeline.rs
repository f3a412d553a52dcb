//! One report run: fetch, aggregate, and deliver only on success.

use crate::analysis::build_report;
use crate::error::{DeliveryError, ReportError};
use crate::notify::Notifier;
use crate::sheets::GridSource;
use tracing::{error, info, warn};

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// First line of the message, followed by a blank line.
    pub banner: String,
    /// Build the message but do not deliver it.
    pub dry_run: bool,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// The message was posted.
    Delivered { message: String },
    /// Dry run; the message was built but not posted.
    DryRun { message: String },
    /// No report could be built, nothing was posted.
    Skipped(ReportError),
    /// The report was built but posting it failed.
    DeliveryFailed(DeliveryError),
}

impl RunOutcome {
    /// Process exit code for this outcome.
    ///
    /// Skipped runs exit cleanly; only a failed post signals failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::DeliveryFailed(_) => 2,
            _ => 0,
        }
    }
}

/// Compose the message posted to the webhook.
pub fn compose_message(banner: &str, table: &str) -> String {
    format!("{}\n\n{}", banner, table)
}

/// Run the report once.
pub async fn run_once<S, N>(source: &S, notifier: &N, options: &RunOptions) -> RunOutcome
where
    S: GridSource,
    N: Notifier,
{
    let report = match source.fetch().await {
        Ok(grid) => build_report(&grid),
        Err(e) => Err(e),
    };

    let table = match report {
        Ok(table) => table,
        Err(e) => {
            if e.is_empty_result() {
                warn!("Nothing to report: {}", e);
            } else {
                error!("Report failed: {}", e);
            }
            info!("Message not sent: there was an error or no valid data");
            return RunOutcome::Skipped(e);
        }
    };

    let message = compose_message(&options.banner, &table);
    info!("Message to send:\n{}", message);

    if options.dry_run {
        info!("Dry run, webhook not called");
        return RunOutcome::DryRun { message };
    }

    match notifier.notify(&message).await {
        Ok(()) => RunOutcome::Delivered { message },
        Err(e) => {
            error!("Failed to send message to webhook: {}", e);
            RunOutcome::DeliveryFailed(e)
        }
    }
}
