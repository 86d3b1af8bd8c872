//! ICLA Signee Registry
//!
//! Resolves whether a commit author has an ICLA on file by looking up the
//! author's real name in two public signee feeds:
//!
//! - committers: `{"last_updated": "...", "committers": {"<id>": "<full name>"}}`
//! - non-committers: `{"last_updated": "...", "non_committers": ["<full name>"]}`
//!
//! Names are compared after normalization (lowercase, all whitespace
//! removed). No fuzzy matching is attempted; a miss only produces a hint in
//! the summary comment.

use std::collections::{BTreeMap, HashSet};

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BotError, Result};

/// Feed listing ICLA signees that are committers, keyed by committer id
pub const DEFAULT_COMMITTER_FEED: &str = "https://whimsy.apache.org/public/icla-info.json";

/// Feed listing ICLA signees without a committer id
pub const DEFAULT_NON_COMMITTER_FEED: &str =
    "https://whimsy.apache.org/public/icla-info_noid.json";

/// Locations of the two signee feeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUrls {
    pub committers: String,
    pub non_committers: String,
}

impl Default for FeedUrls {
    fn default() -> Self {
        Self {
            committers: DEFAULT_COMMITTER_FEED.to_string(),
            non_committers: DEFAULT_NON_COMMITTER_FEED.to_string(),
        }
    }
}

/// Committer feed document
#[derive(Debug, Clone, Deserialize)]
pub struct CommitterFeed {
    /// Feed timestamp, `yyyy-MM-dd HH:mm:ss <tz>`
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Committer id -> full name
    pub committers: BTreeMap<String, String>,
}

/// Non-committer feed document
#[derive(Debug, Clone, Deserialize)]
pub struct NonCommitterFeed {
    /// Feed timestamp, `yyyy-MM-dd HH:mm:ss <tz>`
    #[serde(default)]
    pub last_updated: Option<String>,
    pub non_committers: Vec<String>,
}

/// Normalize a real name for comparison: lowercase and strip all whitespace.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// In-memory set of normalized ICLA signee names
///
/// Built once per run and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct SigneeRegistry {
    committer_names: HashSet<String>,
    non_committer_names: HashSet<String>,
    committers_updated: Option<String>,
    non_committers_updated: Option<String>,
}

impl SigneeRegistry {
    /// Build the registry from already parsed feed documents
    pub fn from_feeds(committers: CommitterFeed, non_committers: NonCommitterFeed) -> Self {
        Self {
            committer_names: committers.committers.values().map(|n| normalize(n)).collect(),
            non_committer_names: non_committers
                .non_committers
                .iter()
                .map(|n| normalize(n))
                .collect(),
            committers_updated: committers.last_updated,
            non_committers_updated: non_committers.last_updated,
        }
    }

    /// Fetch both feeds and build the registry.
    ///
    /// # Errors
    /// Returns [`BotError::RegistryUnavailable`] if either feed cannot be
    /// fetched, answers with a non-success status, or does not parse.
    pub async fn fetch(client: &Client, urls: &FeedUrls) -> Result<Self> {
        let committers: CommitterFeed = fetch_feed(client, &urls.committers).await?;
        let non_committers: NonCommitterFeed = fetch_feed(client, &urls.non_committers).await?;

        let registry = Self::from_feeds(committers, non_committers);
        info!(
            committers = registry.committer_count(),
            non_committers = registry.non_committer_count(),
            "Loaded ICLA signee registry"
        );
        debug!(
            committers_updated = registry.committers_updated.as_deref().unwrap_or("-"),
            non_committers_updated = registry.non_committers_updated.as_deref().unwrap_or("-"),
            "ICLA feed timestamps"
        );
        Ok(registry)
    }

    /// Whether `name` matches a committer or non-committer signee
    pub fn is_signee(&self, name: &str) -> bool {
        let normalized = normalize(name);
        self.committer_names.contains(&normalized) || self.non_committer_names.contains(&normalized)
    }

    pub fn committer_count(&self) -> usize {
        self.committer_names.len()
    }

    pub fn non_committer_count(&self) -> usize {
        self.non_committer_names.len()
    }
}

async fn fetch_feed<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T> {
    debug!(url = %url, "Fetching ICLA feed");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| BotError::registry(url, e))?;

    if !response.status().is_success() {
        return Err(BotError::registry(
            url,
            format!("HTTP {}", response.status()),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| BotError::registry(url, e))?;

    serde_json::from_slice(&body).map_err(|e| BotError::registry(url, e))
}
