//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::sheets::CredentialSource;
use clap::Parser;
use std::path::PathBuf;

/// fanout-report - post per-fanout container totals to a chat webhook
///
/// Reads the shipping floor count from a Google Sheet, sums PALLET/SCUTTLE,
/// GAIOLA and SACA per FANOUT and posts the table to the group webhook.
/// Meant to be run on a schedule; each invocation sends at most one message.
///
/// Examples:
///   GOOGLE_CREDENTIALS_BASE64=... fanout-report
///   fanout-report --credentials-file key.json --dry-run
///   fanout-report --config night-shift.toml --verbose
///   fanout-report --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .fanout-report.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Service account key as base64-encoded JSON
    #[arg(
        long,
        value_name = "BASE64",
        env = "GOOGLE_CREDENTIALS_BASE64",
        hide_env_values = true
    )]
    pub credentials_base64: Option<String>,

    /// Path to a service account JSON key file
    ///
    /// Used only when no base64 credentials are given.
    #[arg(
        long,
        value_name = "FILE",
        env = "GOOGLE_APPLICATION_CREDENTIALS"
    )]
    pub credentials_file: Option<PathBuf>,

    /// Webhook URL, overriding the configured one
    #[arg(long, value_name = "URL", env = "FANOUT_WEBHOOK_URL")]
    pub webhook_url: Option<String>,

    /// Request timeout in seconds for Google and webhook calls
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Build the report and print it without posting to the webhook
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .fanout-report.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.init_config {
            return Ok(());
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let Some(ref url) = self.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Webhook URL must start with 'http://' or 'https://'".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Where to read the service account key from.
    pub fn credential_source(&self) -> CredentialSource {
        CredentialSource {
            base64_json: self.credentials_base64.clone(),
            file: self.credentials_file.clone(),
        }
    }
}
