use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_types::Author;

use crate::error::HistoryResult;

/// Everything a backend needs to create one history entry.
#[derive(Clone, Debug)]
pub struct CommitRequest {
    pub message: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    /// Normalize the message (strip trailing whitespace, collapse blank
    /// lines, end with a newline) before committing.
    pub prettify: bool,
}

impl CommitRequest {
    /// A prettified request stamped with the current time.
    pub fn new(message: impl Into<String>, author: Author) -> Self {
        Self {
            message: message.into(),
            author,
            timestamp: Utc::now(),
            prettify: true,
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_prettify(mut self, prettify: bool) -> Self {
        self.prettify = prettify;
        self
    }

    /// The message exactly as it will be recorded.
    pub fn effective_message(&self) -> HistoryResult<String> {
        if self.prettify {
            Ok(git2::message_prettify(self.message.as_str(), None)?)
        } else {
            Ok(self.message.clone())
        }
    }
}

/// An immutable, authored snapshot of one or more path changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Revision identifier (hex).
    pub revision: String,
    pub author: Author,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    /// Paths changed relative to the previous entry.
    pub paths: Vec<PathBuf>,
}

impl HistoryEntry {
    /// First 8 characters of the revision.
    pub fn short_revision(&self) -> &str {
        let end = self.revision.len().min(8);
        &self.revision[..end]
    }

    /// First line of the message.
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or_default()
    }
}

/// What happened when a batch of paths was handed to the recorder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new history entry was created.
    Committed(HistoryEntry),
    /// The staged content matched the last entry; nothing was created.
    Unchanged,
    /// No paths were given; nothing was attempted.
    Empty,
    /// The backend failed. Files stay on disk, uncommitted.
    Failed(String),
}

impl CommitOutcome {
    /// The created entry, if any.
    pub fn entry(&self) -> Option<&HistoryEntry> {
        match self {
            Self::Committed(entry) => Some(entry),
            _ => None,
        }
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author() -> Author {
        Author::new("bot", "bot@example.com").unwrap()
    }

    #[test]
    fn request_defaults_to_prettify() {
        let request = CommitRequest::new("msg", author());
        assert!(request.prettify);
        assert_eq!(request.author, author());
    }

    #[test]
    fn prettify_trims_and_terminates() {
        let request = CommitRequest::new("  \n\nSave Widget 42   \n\n\n", author());
        assert_eq!(request.effective_message().unwrap(), "Save Widget 42\n");
    }

    #[test]
    fn raw_message_kept_without_prettify() {
        let request = CommitRequest::new("raw  ", author()).with_prettify(false);
        assert_eq!(request.effective_message().unwrap(), "raw  ");
    }

    #[test]
    fn short_revision_and_summary() {
        let entry = HistoryEntry {
            revision: "0123456789abcdef".into(),
            author: author(),
            timestamp: Utc::now(),
            message: "Save 3 Widget records\n\nbody".into(),
            paths: vec![],
        };
        assert_eq!(entry.short_revision(), "01234567");
        assert_eq!(entry.summary(), "Save 3 Widget records");
    }

    #[test]
    fn outcome_accessors() {
        assert!(CommitOutcome::Unchanged.entry().is_none());
        assert!(!CommitOutcome::Empty.is_committed());
        assert!(CommitOutcome::Failed("boom".into()).is_failed());
    }
}
