//! Pull Request State
//!
//! Plain value types describing the pull request as seen by the summary
//! composer. They are filled from the GitHub API on every run and discarded
//! once the comment body has been produced.

use std::fmt;

/// Marker appended to every comment created by this bot
pub const MARKER_COMMENT: &str = "<!-- Autocomment Commit Summary Bot -->";

/// Commit author identity, equal only if name and email both match
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitAuthor {
    pub name: String,
    pub email: String,
}

impl CommitAuthor {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for CommitAuthor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A single commit of the pull request, in API order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub author_name: String,
    pub author_email: String,
    /// Full commit message, absent if the API returned none
    pub message: Option<String>,
    /// Author date as reported by the API
    pub author_date: Option<String>,
}

impl CommitRecord {
    pub fn new(
        sha: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            sha: sha.into(),
            author_name: author_name.into(),
            author_email: author_email.into(),
            message: Some(message.into()),
            author_date: None,
        }
    }

    /// The (name, email) identity of the commit author
    pub fn author(&self) -> CommitAuthor {
        CommitAuthor::new(self.author_name.as_str(), self.author_email.as_str())
    }

    /// First line of the commit message, empty when there is no message
    pub fn summary(&self) -> &str {
        first_line(self.message.as_deref().unwrap_or_default())
    }
}

/// First line of `text`, split at the first `\n` or `\r`
pub fn first_line(text: &str) -> &str {
    text.split(['\n', '\r']).next().unwrap_or_default()
}

/// An issue comment already present on the pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingComment {
    pub id: u64,
    pub body: String,
}

impl ExistingComment {
    pub fn new(id: u64, body: impl Into<String>) -> Self {
        Self {
            id,
            body: body.into(),
        }
    }

    /// Whether this comment was written by the bot
    pub fn is_bot_comment(&self) -> bool {
        self.body.ends_with(MARKER_COMMENT)
    }
}

/// Everything the composer and the reconciler need about one pull request
#[derive(Debug, Clone, Default)]
pub struct PrSummaryInput {
    /// Public name of the PR requester, `None` if not public
    pub requester_name: Option<String>,
    /// Public email of the PR requester, `None` if not public
    pub requester_email: Option<String>,
    pub commits: Vec<CommitRecord>,
    /// All issue comments in API order
    pub existing_comments: Vec<ExistingComment>,
}

impl PrSummaryInput {
    /// Identity of the PR requester, known only if name and email are public
    pub fn requester(&self) -> Option<CommitAuthor> {
        match (&self.requester_name, &self.requester_email) {
            (Some(name), Some(email)) => Some(CommitAuthor::new(name.as_str(), email.as_str())),
            _ => None,
        }
    }

    /// Whether `author` is exactly the PR requester
    pub fn is_requester(&self, author: &CommitAuthor) -> bool {
        self.requester().as_ref() == Some(author)
    }

    /// Comments ending with the bot marker, oldest first
    pub fn bot_comments(&self) -> Vec<&ExistingComment> {
        self.existing_comments
            .iter()
            .filter(|c| c.is_bot_comment())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_author_equality_is_structural() {
        let a = CommitAuthor::new("Jane Doe", "jane@example.org");
        let b = CommitAuthor::new("Jane Doe", "jane@example.org");
        let c = CommitAuthor::new("Jane Doe", "jane@work.example");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_summary_takes_first_line() {
        let commit = CommitRecord::new("abc", "A", "a@x", "Fix bug\nLonger body text...");
        assert_eq!(commit.summary(), "Fix bug");

        let commit = CommitRecord::new("abc", "A", "a@x", "Fix bug\r\n\r\nBody");
        assert_eq!(commit.summary(), "Fix bug");

        let commit = CommitRecord::new("abc", "A", "a@x", "Only carriage\rreturn");
        assert_eq!(commit.summary(), "Only carriage");
    }

    #[test]
    fn test_summary_of_missing_or_empty_message() {
        let mut commit = CommitRecord::new("abc", "A", "a@x", "");
        assert_eq!(commit.summary(), "");

        commit.message = None;
        assert_eq!(commit.summary(), "");

        commit.message = Some("\nsecond line".to_string());
        assert_eq!(commit.summary(), "");
    }

    #[test]
    fn test_bot_comment_detection() {
        let bot = ExistingComment::new(1, format!("summary\r\n{MARKER_COMMENT}"));
        let quoted = ExistingComment::new(2, format!("> {MARKER_COMMENT}\r\nthanks!"));
        let human = ExistingComment::new(3, "LGTM");

        assert!(bot.is_bot_comment());
        assert!(!quoted.is_bot_comment());
        assert!(!human.is_bot_comment());

        let input = PrSummaryInput {
            existing_comments: vec![human, bot.clone(), quoted],
            ..Default::default()
        };
        assert_eq!(input.bot_comments(), vec![&bot]);
    }
}
