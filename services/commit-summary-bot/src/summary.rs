//! PR Summary Composer
//!
//! Builds the Markdown body of the bot comment:
//!
//! - public identity of the PR requester
//! - one table row per commit (SHA, real author, short description)
//! - one table row per distinct author name with its ICLA status
//! - hints a committer should take into account before merging
//! - the time the summary was produced, followed by the bot marker
//!
//! GitHub expects CRLF line breaks in comment bodies.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexSet;

use crate::pr::{CommitAuthor, PrSummaryInput, MARKER_COMMENT};
use crate::registry::SigneeRegistry;

const NL: &str = "\r\n";

/// Maximum number of characters of the commit summary shown in the table
pub const SUMMARY_MAX_CHARS: usize = 50;

/// Advice shown under the "Hints" heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hint {
    /// More than one (name, email) identity authored commits
    MultipleAuthors,
    /// An author identity differs from the PR requester
    AuthorMismatch,
    /// At least one author name is not in the signee registry
    MissingIcla,
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Hint::MultipleAuthors => "Multiple authors found - squashing is discouraged.",
            Hint::AuthorMismatch => {
                "Author information is inconsistent with PR requestor - squashing is discouraged."
            }
            Hint::MissingIcla => {
                "For at least one author no ICLA could be found, please ensure, that an ICLA \
                 is on file for all authors or they are aware that they donate the code to the ASF"
            }
        };
        f.write_str(text)
    }
}

/// ICLA status of one distinct author name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorStatus {
    pub name: String,
    pub signee: bool,
}

/// Everything derived from the commit list before rendering
#[derive(Debug, Clone, Default)]
pub struct SummaryAnalysis {
    /// Distinct author names, first-seen order
    pub authors: Vec<AuthorStatus>,
    /// Distinct (name, email) identities, first-seen order
    pub identities: IndexSet<CommitAuthor>,
    /// Hints in detection order, each at most once
    pub hints: IndexSet<Hint>,
}

impl SummaryAnalysis {
    pub fn has_hint(&self, hint: Hint) -> bool {
        self.hints.contains(&hint)
    }
}

/// Derive author statuses, identities and hints for a pull request
pub fn analyze(input: &PrSummaryInput, registry: &SigneeRegistry) -> SummaryAnalysis {
    let mut names: IndexSet<&str> = IndexSet::new();
    let mut identities: IndexSet<CommitAuthor> = IndexSet::new();
    for commit in &input.commits {
        names.insert(commit.author_name.as_str());
        identities.insert(commit.author());
    }

    let authors: Vec<AuthorStatus> = names
        .into_iter()
        .map(|name| AuthorStatus {
            name: name.to_string(),
            signee: registry.is_signee(name),
        })
        .collect();

    let mut hints = IndexSet::new();
    if identities.len() > 1 {
        hints.insert(Hint::MultipleAuthors);
    }
    if identities.iter().any(|author| !input.is_requester(author)) {
        hints.insert(Hint::AuthorMismatch);
    }
    if authors.iter().any(|a| !a.signee) {
        hints.insert(Hint::MissingIcla);
    }

    SummaryAnalysis {
        authors,
        identities,
        hints,
    }
}

/// Compose the comment body stamped with the current time
pub fn compose(input: &PrSummaryInput, registry: &SigneeRegistry) -> String {
    compose_at(input, registry, Utc::now())
}

/// Compose the comment body stamped with `now`
pub fn compose_at(
    input: &PrSummaryInput,
    registry: &SigneeRegistry,
    now: DateTime<Utc>,
) -> String {
    let analysis = analyze(input, registry);
    compose_from(input, &analysis, now)
}

/// Render the comment body from an analysis that was already computed
pub fn compose_from(
    input: &PrSummaryInput,
    analysis: &SummaryAnalysis,
    now: DateTime<Utc>,
) -> String {
    let mut sb = String::new();

    sb.push_str(&format!(
        "Public Information PR requestor: {} \\<{}\\>{NL}{NL}{NL}",
        input.requester_name.as_deref().unwrap_or_default(),
        input.requester_email.as_deref().unwrap_or_default()
    ));

    sb.push_str("|SHA|Author|Short description|");
    sb.push_str(NL);
    sb.push_str("| --- | --- | --- |");
    sb.push_str(NL);
    for commit in &input.commits {
        sb.push_str(&format!(
            "| {} | {}<br />\\<{}\\> | {} |{NL}",
            commit.sha,
            commit.author_name,
            commit.author_email,
            truncate_chars(commit.summary(), SUMMARY_MAX_CHARS)
        ));
    }

    sb.push_str(NL);
    sb.push_str("| Author | ICLA status |");
    sb.push_str(NL);
    sb.push_str("| --- | --- |");
    sb.push_str(NL);
    for author in &analysis.authors {
        let status = if author.signee { "found" } else { "-" };
        sb.push_str(&format!("| {} | {} |{NL}", author.name, status));
    }
    sb.push_str(NL);

    if !analysis.hints.is_empty() {
        sb.push_str(NL);
        sb.push_str("**Hints**");
        sb.push_str(NL);
        for hint in &analysis.hints {
            sb.push_str(&format!("- {hint}{NL}"));
        }
    }

    sb.push_str(NL);
    sb.push_str(&format!(
        "State: {}{NL}",
        now.to_rfc3339_opts(SecondsFormat::Secs, false)
    ));
    sb.push_str(MARKER_COMMENT);
    sb
}

/// Truncate to at most `max` characters without splitting a character
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
