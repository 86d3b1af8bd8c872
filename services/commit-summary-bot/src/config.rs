//! Runtime configuration
//!
//! Every option can be given on the command line or through the environment
//! the workflow runner provides (`GITHUB_TOKEN`, `GITHUB_EVENT_PATH`, ...).

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use reqwest::Client;

use crate::error::{BotError, Result};
use crate::github::{DEFAULT_API_URL, USER_AGENT};
use crate::registry::{FeedUrls, DEFAULT_COMMITTER_FEED, DEFAULT_NON_COMMITTER_FEED};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Commit summary bot
#[derive(Parser, Debug, Clone)]
#[command(name = "commit-summary")]
#[command(about = "Post a commit, author and ICLA summary comment on a GitHub pull request")]
#[command(version)]
pub struct Config {
    /// GitHub token used for the REST API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Path to the pull_request event payload
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// ICLA feed of committers (id -> name)
    #[arg(long, env = "CLA_COMMITTER_FEED_URL", default_value = DEFAULT_COMMITTER_FEED)]
    pub committer_feed_url: String,

    /// ICLA feed of non-committers (list of names)
    #[arg(long, env = "CLA_NON_COMMITTER_FEED_URL", default_value = DEFAULT_NON_COMMITTER_FEED)]
    pub non_committer_feed_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Compute the summary and log the comment plan without changing the PR
    #[arg(long)]
    pub dry_run: bool,

    /// Write the composed comment body to stdout
    #[arg(long)]
    pub print: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn feed_urls(&self) -> FeedUrls {
        FeedUrls {
            committers: self.committer_feed_url.clone(),
            non_committers: self.non_committer_feed_url.clone(),
        }
    }

    /// Shared HTTP client for the GitHub API and the ICLA feeds
    pub fn http_client(&self) -> Result<Client> {
        if self.timeout_secs == 0 {
            return Err(BotError::Config("--timeout-secs must be positive".to_string()));
        }
        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| BotError::Config(format!("Failed to create HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_defaults() {
        let config = Config::try_parse_from([
            "commit-summary",
            "--token",
            "t0k3n",
            "--event-path",
            "/tmp/event.json",
        ])
        .unwrap();

        assert_eq!(config.token, "t0k3n");
        assert_eq!(config.event_path, PathBuf::from("/tmp/event.json"));
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(!config.dry_run);
        assert_eq!(config.feed_urls(), FeedUrls::default());
        assert!(config.http_client().is_ok());
    }

    #[test]
    fn test_parse_overrides() {
        let config = Config::try_parse_from([
            "commit-summary",
            "--token",
            "t",
            "--event-path",
            "e.json",
            "--api-url",
            "http://localhost:8080",
            "--committer-feed-url",
            "http://localhost/c.json",
            "--non-committer-feed-url",
            "http://localhost/n.json",
            "--log-format",
            "json",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.feed_urls().committers, "http://localhost/c.json");
        assert_eq!(config.feed_urls().non_committers, "http://localhost/n.json");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.dry_run);
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = Config::try_parse_from([
            "commit-summary",
            "--token",
            "t",
            "--event-path",
            "e.json",
            "--timeout-secs",
            "0",
        ])
        .unwrap();

        assert!(matches!(config.http_client(), Err(BotError::Config(_))));
    }
}
