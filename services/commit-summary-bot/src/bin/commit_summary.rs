//! Commit Summary Bot
//!
//! Posts or refreshes the commit/author/ICLA summary comment on the pull
//! request that triggered the workflow.
//!
//! ## Usage
//! ```bash
//! # In a GitHub Actions workflow (GITHUB_EVENT_PATH is set by the runner)
//! GITHUB_TOKEN=<TOKEN> commit-summary
//!
//! # Preview the comment for a saved event without changing the PR
//! commit-summary --token <TOKEN> --event-path event.json --dry-run --print
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use commit_summary_bot::config::{Config, LogFormat};
use commit_summary_bot::run::run;

fn init_logging(config: &Config) {
    let default_level = if config.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_logging(&config);

    info!("🤖 Commit summary bot starting...");

    let outcome = match run(&config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!("❌ Run failed: {e}");
            return Err(e).context("Commit summary run failed");
        }
    };

    if config.print {
        println!("{}", outcome.body);
    }

    match &outcome.report {
        Some(report) => info!(
            pull_request = %outcome.pull_request,
            created = ?report.created,
            updated = ?report.updated,
            deleted = report.deleted.len(),
            "✅ Summary comment reconciled"
        ),
        None => info!(
            pull_request = %outcome.pull_request,
            planned = outcome.actions.len(),
            "✅ Dry run complete"
        ),
    }

    Ok(())
}
