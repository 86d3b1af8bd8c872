//! GitHub REST Client
//!
//! Reads the current state of a pull request (requester, commits, issue
//! comments) and manages the bot's summary comment.
//! Authentication: bearer token supplied by the workflow (`GITHUB_TOKEN`).

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use async_trait::async_trait;

use crate::error::{BotError, Result};
use crate::event::PullRequestRef;
use crate::pr::{CommitRecord, ExistingComment, PrSummaryInput};
use crate::reconcile::CommentStore;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const USER_AGENT: &str = "commit-summary-bot";
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

// ============================================================
// API Response Types
// ============================================================

#[derive(Debug, Deserialize)]
struct PullRequest {
    user: UserRef,
}

#[derive(Debug, Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PullRequestCommit {
    sha: String,
    commit: GitCommit,
}

#[derive(Debug, Deserialize)]
struct GitCommit {
    #[serde(default)]
    author: Option<GitActor>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GitActor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IssueComment {
    id: u64,
    #[serde(default)]
    body: Option<String>,
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    body: &'a str,
}

impl From<PullRequestCommit> for CommitRecord {
    fn from(c: PullRequestCommit) -> Self {
        let author = c.commit.author.unwrap_or_default();
        Self {
            sha: c.sha,
            author_name: author.name.unwrap_or_default(),
            author_email: author.email.unwrap_or_default(),
            message: c.commit.message,
            author_date: author.date,
        }
    }
}

// ============================================================
// Client Implementation
// ============================================================

/// GitHub REST API client
#[derive(Clone)]
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(http: Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Operations scoped to one pull request
    pub fn pull_request<'a>(&'a self, pr: &'a PullRequestRef) -> PullRequestApi<'a> {
        PullRequestApi { client: self, pr }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!(path = %path, "GET");
        let response = send(self.request(Method::GET, path), BotError::GitHubApi).await?;
        response
            .json()
            .await
            .map_err(|e| BotError::GitHubApi(format!("Failed to parse {path}: {e}")))
    }

    /// GET every page of a list endpoint
    async fn get_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let paged = format!("{path}?per_page={PER_PAGE}&page={page}");
            let batch: Vec<T> = self.get_json(&paged).await?;
            let len = batch.len();
            items.extend(batch);
            if len < PER_PAGE {
                return Ok(items);
            }
            page += 1;
        }
    }
}

async fn send(request: RequestBuilder, error: fn(String) -> BotError) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| error(format!("Request failed: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(error(format!("API error ({status}): {body}")));
    }
    Ok(response)
}

/// GitHub operations bound to a single pull request
#[derive(Clone, Copy)]
pub struct PullRequestApi<'a> {
    client: &'a GitHubClient,
    pr: &'a PullRequestRef,
}

impl PullRequestApi<'_> {
    fn repo_path(&self) -> String {
        format!("/repos/{}/{}", self.pr.owner, self.pr.repo)
    }

    /// Public name and email of the PR requester, `None` when not public
    pub async fn requester(&self) -> Result<(Option<String>, Option<String>)> {
        let pull: PullRequest = self
            .client
            .get_json(&format!("{}/pulls/{}", self.repo_path(), self.pr.number))
            .await?;
        let user: User = self
            .client
            .get_json(&format!("/users/{}", pull.user.login))
            .await?;
        debug!(login = %pull.user.login, "Resolved PR requester");
        Ok((user.name, user.email))
    }

    /// Commits of the pull request in API order
    pub async fn commits(&self) -> Result<Vec<CommitRecord>> {
        let commits: Vec<PullRequestCommit> = self
            .client
            .get_all(&format!("{}/pulls/{}/commits", self.repo_path(), self.pr.number))
            .await?;
        Ok(commits.into_iter().map(CommitRecord::from).collect())
    }

    /// Issue comments of the pull request in API order
    pub async fn comments(&self) -> Result<Vec<ExistingComment>> {
        let comments: Vec<IssueComment> = self
            .client
            .get_all(&format!("{}/issues/{}/comments", self.repo_path(), self.pr.number))
            .await?;
        Ok(comments
            .into_iter()
            .map(|c| ExistingComment::new(c.id, c.body.unwrap_or_default()))
            .collect())
    }

    /// Load everything the composer and reconciler need
    pub async fn load_summary_input(&self) -> Result<PrSummaryInput> {
        let (requester_name, requester_email) = self.requester().await?;
        let commits = self.commits().await?;
        let existing_comments = self.comments().await?;
        Ok(PrSummaryInput {
            requester_name,
            requester_email,
            commits,
            existing_comments,
        })
    }
}

#[async_trait]
impl CommentStore for PullRequestApi<'_> {
    async fn create_comment(&self, body: &str) -> Result<u64> {
        let path = format!("{}/issues/{}/comments", self.repo_path(), self.pr.number);
        let response = send(
            self.client
                .request(Method::POST, &path)
                .json(&CommentRequest { body }),
            BotError::CommentApiFailure,
        )
        .await?;
        let created: IssueComment = response
            .json()
            .await
            .map_err(|e| BotError::CommentApiFailure(format!("Failed to parse comment: {e}")))?;
        Ok(created.id)
    }

    async fn update_comment(&self, id: u64, body: &str) -> Result<()> {
        let path = format!("{}/issues/comments/{}", self.repo_path(), id);
        send(
            self.client
                .request(Method::PATCH, &path)
                .json(&CommentRequest { body }),
            BotError::CommentApiFailure,
        )
        .await?;
        Ok(())
    }

    async fn delete_comment(&self, id: u64) -> Result<()> {
        let path = format!("{}/issues/comments/{}", self.repo_path(), id);
        send(
            self.client.request(Method::DELETE, &path),
            BotError::CommentApiFailure,
        )
        .await?;
        Ok(())
    }
}
