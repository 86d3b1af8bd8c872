//! Pull Request Event Payload
//!
//! The workflow runner writes the triggering event as JSON to the file named
//! by `GITHUB_EVENT_PATH`. Only the coordinates of the pull request are taken
//! from it; everything else is re-read from the API so the summary reflects
//! the current state of the PR rather than the event snapshot.

use std::path::Path;

use serde::Deserialize;

use crate::error::{BotError, Result};

#[derive(Debug, Deserialize)]
struct PullRequestEvent {
    pull_request: PullRequestPayload,
    repository: RepositoryPayload,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct RepositoryPayload {
    full_name: String,
}

/// Repository and number of the pull request that triggered the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl PullRequestRef {
    /// Parse a pull request event payload
    pub fn from_json(payload: &[u8]) -> Result<Self> {
        let event: PullRequestEvent = serde_json::from_slice(payload)
            .map_err(|e| BotError::EventPayloadInvalid(e.to_string()))?;

        let (owner, repo) = event
            .repository
            .full_name
            .split_once('/')
            .filter(|(owner, repo)| !owner.is_empty() && !repo.is_empty() && !repo.contains('/'))
            .ok_or_else(|| {
                BotError::EventPayloadInvalid(format!(
                    "Invalid repository name: {}. Expected: owner/repo",
                    event.repository.full_name
                ))
            })?;

        Ok(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
            number: event.pull_request.number,
        })
    }

    /// Read and parse the event file
    pub fn from_file(path: &Path) -> Result<Self> {
        let payload = std::fs::read(path).map_err(|e| {
            BotError::EventPayloadInvalid(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&payload)
    }
}

impl std::fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}
