//! Commit Summary Bot
//!
//! GitHub pull request bot that keeps a single summary comment on a PR:
//! the commits with their real authors, the ICLA status of every author and
//! hints a committer should consider before merging (multiple authors,
//! author/requester mismatch, missing ICLA).
//!
//! ## Binary
//!
//! - `commit-summary`: run once for the pull request event of a workflow
//!
//! ## Usage
//!
//! ```bash
//! # Inside a pull_request workflow
//! GITHUB_TOKEN=${{ secrets.GITHUB_TOKEN }} commit-summary
//!
//! # Locally against a saved event, without touching the PR
//! commit-summary \
//!   --token $TOKEN \
//!   --event-path ./event.json \
//!   --dry-run --print
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod github;
pub mod pr;
pub mod reconcile;
pub mod registry;
pub mod run;
pub mod summary;

pub use error::{BotError, Result};
pub use pr::{CommitAuthor, CommitRecord, ExistingComment, PrSummaryInput, MARKER_COMMENT};
pub use registry::SigneeRegistry;
pub use summary::{compose, Hint};
