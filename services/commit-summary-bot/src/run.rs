//! One bot run: event -> PR state -> summary -> comment reconciliation

use chrono::Utc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::event::PullRequestRef;
use crate::github::GitHubClient;
use crate::reconcile::{self, CommentAction, ReconcileReport};
use crate::registry::SigneeRegistry;
use crate::summary;

/// Result of a single run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub pull_request: String,
    pub body: String,
    pub actions: Vec<CommentAction>,
    /// `None` for dry runs
    pub report: Option<ReconcileReport>,
}

/// Build the summary for the PR named by the event and publish it.
///
/// # Errors
/// Any failure aborts the run; no partial retry is attempted.
pub async fn run(config: &Config) -> Result<RunOutcome> {
    let pr = PullRequestRef::from_file(&config.event_path)?;
    info!(pull_request = %pr, "Processing pull request");

    let http = config.http_client()?;
    let github = GitHubClient::new(http.clone(), config.api_url.as_str(), config.token.as_str());
    let api = github.pull_request(&pr);

    let input = api.load_summary_input().await?;
    info!(
        commits = input.commits.len(),
        comments = input.existing_comments.len(),
        bot_comments = input.bot_comments().len(),
        "Loaded pull request state"
    );

    let registry = SigneeRegistry::fetch(&http, &config.feed_urls()).await?;

    let analysis = summary::analyze(&input, &registry);
    for author in analysis.authors.iter().filter(|a| !a.signee) {
        warn!(author = %author.name, "No ICLA found for author");
    }
    let body = summary::compose_from(&input, &analysis, Utc::now());

    let actions = reconcile::plan(&input.existing_comments, &body);

    let report = if config.dry_run {
        for action in &actions {
            info!(action = %action_label(action), "Dry run, skipping comment action");
        }
        None
    } else {
        Some(reconcile::apply(&api, &actions).await?)
    };

    Ok(RunOutcome {
        pull_request: pr.to_string(),
        body,
        actions,
        report,
    })
}

fn action_label(action: &CommentAction) -> String {
    match action {
        CommentAction::Create { .. } => "create".to_string(),
        CommentAction::Update { id, .. } => format!("update {id}"),
        CommentAction::Delete { id } => format!("delete {id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use crate::pr::MARKER_COMMENT;
    use clap::Parser;
    use serde_json::json;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            json!({
                "action": "opened",
                "pull_request": {"number": 3, "user": {"login": "jdoe"}},
                "repository": {"full_name": "apache/netbeans"}
            })
            .to_string()
            .as_bytes(),
        )
        .unwrap();
        file
    }

    fn config(server: &MockServer, event: &tempfile::NamedTempFile, dry_run: bool) -> Config {
        let uri = server.uri();
        let event_path = event.path().display().to_string();
        let committers = format!("{uri}/feeds/icla-info.json");
        let non_committers = format!("{uri}/feeds/icla-info_noid.json");
        let mut args = vec![
            "commit-summary",
            "--token",
            "t",
            "--event-path",
            event_path.as_str(),
            "--api-url",
            uri.as_str(),
            "--committer-feed-url",
            committers.as_str(),
            "--non-committer-feed-url",
            non_committers.as_str(),
        ];
        if dry_run {
            args.push("--dry-run");
        }
        Config::try_parse_from(args).unwrap()
    }

    async fn mount_pr_state(server: &MockServer, comments: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/repos/apache/netbeans/pulls/3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {"login": "jdoe"}})))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/users/jdoe"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "login": "jdoe", "name": "Jane Doe", "email": "jane@example.org"
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/apache/netbeans/pulls/3/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"sha": "a1", "commit": {"author": {"name": "Jane Doe", "email": "jane@example.org"}, "message": "Add feature"}},
                {"sha": "a2", "commit": {"author": {"name": "John Roe", "email": "john@example.org"}, "message": "Fix typo"}}
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/apache/netbeans/issues/3/comments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comments))
            .mount(server)
            .await;
    }

    async fn mount_feeds(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/feeds/icla-info.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "last_updated": "2024-01-01 00:00:00 UTC",
                "committers": {"jdoe": "Jane Doe"}
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/feeds/icla-info_noid.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "last_updated": "2024-01-01 00:00:00 UTC",
                "non_committers": []
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_run_updates_first_and_prunes_duplicates() {
        let server = MockServer::start().await;
        mount_pr_state(
            &server,
            json!([
                {"id": 1, "body": "Looks good"},
                {"id": 2, "body": format!("old\r\n{MARKER_COMMENT}")},
                {"id": 3, "body": format!("older\r\n{MARKER_COMMENT}")}
            ]),
        )
        .await;
        mount_feeds(&server).await;
        Mock::given(method("PATCH"))
            .and(path("/repos/apache/netbeans/issues/comments/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/repos/apache/netbeans/issues/comments/3"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let event = event_file();
        let outcome = run(&config(&server, &event, false)).await.unwrap();

        assert_eq!(outcome.pull_request, "apache/netbeans#3");
        assert!(outcome.body.contains("| Jane Doe | found |"));
        assert!(outcome.body.contains("| John Roe | - |"));
        assert!(outcome.body.ends_with(MARKER_COMMENT));
        let report = outcome.report.unwrap();
        assert_eq!(report.updated, Some(2));
        assert_eq!(report.deleted, vec![3]);
    }

    #[tokio::test]
    async fn test_dry_run_does_not_mutate() {
        let server = MockServer::start().await;
        mount_pr_state(&server, json!([])).await;
        mount_feeds(&server).await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .expect(0)
            .mount(&server)
            .await;

        let event = event_file();
        let outcome = run(&config(&server, &event, true)).await.unwrap();

        assert!(outcome.report.is_none());
        assert!(matches!(outcome.actions.as_slice(), [CommentAction::Create { .. }]));
    }

    #[tokio::test]
    async fn test_unavailable_registry_posts_nothing() {
        let server = MockServer::start().await;
        mount_pr_state(&server, json!([])).await;
        Mock::given(method("GET"))
            .and(path("/feeds/icla-info.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
            .expect(0)
            .mount(&server)
            .await;

        let event = event_file();
        let err = run(&config(&server, &event, false)).await.unwrap_err();
        assert!(matches!(err, BotError::RegistryUnavailable { .. }));
    }
}
