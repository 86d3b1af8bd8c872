//! Error types for the commit summary bot
//!
//! Every failure is fatal for the run. Re-running after an abort is safe
//! because comment reconciliation converges on a single bot comment.

use thiserror::Error;

/// Errors that can occur while building or publishing a PR summary
#[derive(Debug, Error)]
pub enum BotError {
    /// One of the ICLA signee feeds could not be fetched or parsed
    #[error("ICLA registry unavailable ({url}): {reason}")]
    RegistryUnavailable { url: String, reason: String },

    /// The workflow event payload is missing or malformed
    #[error("Invalid event payload: {0}")]
    EventPayloadInvalid(String),

    /// Creating, updating or deleting a comment was rejected
    #[error("Comment API failure: {0}")]
    CommentApiFailure(String),

    /// Reading pull request state from the GitHub API failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BotError {
    pub(crate) fn registry(url: &str, reason: impl std::fmt::Display) -> Self {
        Self::RegistryUnavailable {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
