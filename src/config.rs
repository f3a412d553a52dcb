//! Configuration file handling.
//!
//! This module handles loading `.fanout-report.toml` and merging it with
//! command-line overrides. Every field has a default, so the tool runs
//! without any file at all.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".fanout-report.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Spreadsheet location.
    #[serde(default)]
    pub sheet: SheetConfig,

    /// Webhook delivery settings.
    #[serde(default)]
    pub webhook: WebhookSettings,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

/// Which worksheet range to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Spreadsheet id, as found in the sheet URL.
    #[serde(default = "default_spreadsheet_id")]
    pub spreadsheet_id: String,

    /// Worksheet (tab) title.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    /// Range in A1 notation, without the worksheet prefix.
    #[serde(default = "default_range")]
    pub range: String,

    /// Timeout for Google API requests, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Base URL of the Sheets API spreadsheets collection.
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: default_spreadsheet_id(),
            worksheet: default_worksheet(),
            range: default_range(),
            timeout_seconds: default_timeout(),
            api_base: default_api_base(),
        }
    }
}

fn default_spreadsheet_id() -> String {
    "1hoXYiyuArtbd2pxMECteTFSE75LdgvA2Vlb6gPpGJ-g".to_string()
}

fn default_worksheet() -> String {
    "Contagem".to_string()
}

fn default_range() -> String {
    "C:H".to_string()
}

fn default_api_base() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets/".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Webhook delivery settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Chat webhook endpoint.
    #[serde(default = "default_webhook_url")]
    pub url: String,

    /// First line of every message, followed by a blank line.
    #[serde(default = "default_banner")]
    pub banner: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: default_webhook_url(),
            banner: default_banner(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_webhook_url() -> String {
    "https://openapi.seatalk.io/webhook/group/5KZq9RrWR5eEbMCzBoapOw".to_string()
}

fn default_banner() -> String {
    "Segue o piso da expedição".to_string()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.webhook_url {
            self.webhook.url = url.clone();
        }

        if let Some(timeout) = args.timeout {
            self.webhook.timeout_seconds = timeout;
            self.sheet.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
