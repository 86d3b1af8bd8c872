//! Comment Reconciliation
//!
//! Converges the pull request on exactly one bot comment:
//!
//! - no bot comment: create one
//! - one or more: update the oldest, delete the rest
//!
//! Comments not ending with the bot marker are never touched.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::Result;
use crate::pr::ExistingComment;

/// Mutation of the pull request's comment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentAction {
    Create { body: String },
    Update { id: u64, body: String },
    Delete { id: u64 },
}

/// Comment operations on one pull request
#[async_trait]
pub trait CommentStore {
    async fn create_comment(&self, body: &str) -> Result<u64>;
    async fn update_comment(&self, id: u64, body: &str) -> Result<()>;
    async fn delete_comment(&self, id: u64) -> Result<()>;
}

/// Plan the actions that leave a single bot comment carrying `body`
pub fn plan(existing: &[ExistingComment], body: &str) -> Vec<CommentAction> {
    let mut bot_comments = existing.iter().filter(|c| c.is_bot_comment());

    let Some(first) = bot_comments.next() else {
        return vec![CommentAction::Create {
            body: body.to_string(),
        }];
    };

    let mut actions = vec![CommentAction::Update {
        id: first.id,
        body: body.to_string(),
    }];
    actions.extend(bot_comments.map(|c| CommentAction::Delete { id: c.id }));
    actions
}

/// Outcome of applying a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Option<u64>,
    pub updated: Option<u64>,
    pub deleted: Vec<u64>,
}

/// Apply `actions` in order, stopping at the first failure
pub async fn apply<S>(store: &S, actions: &[CommentAction]) -> Result<ReconcileReport>
where
    S: CommentStore + Sync + ?Sized,
{
    let mut report = ReconcileReport::default();

    for action in actions {
        match action {
            CommentAction::Create { body } => {
                let id = store.create_comment(body).await?;
                info!(comment_id = id, "Created summary comment");
                report.created = Some(id);
            }
            CommentAction::Update { id, body } => {
                store.update_comment(*id, body).await?;
                info!(comment_id = id, "Updated summary comment");
                report.updated = Some(*id);
            }
            CommentAction::Delete { id } => {
                store.delete_comment(*id).await?;
                warn!(comment_id = id, "Deleted duplicate summary comment");
                report.deleted.push(*id);
            }
        }
    }

    Ok(report)
}
