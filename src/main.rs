//! fanout-report - shipping floor totals from Google Sheets to a chat webhook
//!
//! Reads the floor count worksheet, sums the container columns per FANOUT
//! and posts the resulting table to the group webhook. One message per run.
//!
//! Exit codes:
//!   0 - Message posted, dry run, or nothing to report (errors are logged)
//!   1 - Runtime error (invalid arguments or configuration)
//!   2 - Report built but the webhook delivery failed

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod notify;
mod pipeline;
mod report;
mod sheets;
#[cfg(test)]
mod test_server;

use anyhow::{Context, Result};
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use notify::{WebhookConfig, WebhookNotifier};
use pipeline::{RunOptions, RunOutcome};
use sheets::SheetsClient;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    let config = match load_config(&args) {
        Ok(mut config) => {
            config.merge_with_args(&args);
            config
        }
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(&args, &config);

    info!("fanout-report v{}", env!("CARGO_PKG_VERSION"));
    debug!("Configuration: {:?}", config);

    match run(&args, config).await {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .fanout-report.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to point at another sheet, range or webhook.");
    Ok(())
}

/// Initialize logging. `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Build the collaborators and run the report once.
async fn run(args: &Args, config: Config) -> Result<RunOutcome> {
    let source = SheetsClient::new(config.sheet.clone(), args.credential_source())
        .context("Failed to create Google Sheets client")?;

    let notifier = WebhookNotifier::new(WebhookConfig {
        url: config.webhook.url.clone(),
        timeout_seconds: config.webhook.timeout_seconds,
    })
    .context("Failed to create webhook client")?;

    let options = RunOptions {
        banner: config.webhook.banner.clone(),
        dry_run: args.dry_run,
    };

    let outcome = pipeline::run_once(&source, &notifier, &options).await;

    match &outcome {
        RunOutcome::Delivered { message } => println!(
            "✅ Report posted to webhook ({} lines).",
            message.lines().count()
        ),
        RunOutcome::DryRun { message } => {
            println!("{}", message);
            println!("\n✅ Dry run complete. Webhook was not called.");
        }
        RunOutcome::Skipped(e) => println!("⚠️  Message not sent: {}", e),
        RunOutcome::DeliveryFailed(e) => eprintln!("⛔ Webhook delivery failed: {}", e),
    }

    Ok(outcome)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            eprintln!("⚠️  Ignoring {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
