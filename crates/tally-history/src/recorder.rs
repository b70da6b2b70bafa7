//! Turns a set of written paths plus a message into one history entry.

use std::fmt;
use std::path::{Path, PathBuf};

use tally_types::Author;
use tracing::{debug, warn};

use crate::entry::{CommitOutcome, CommitRequest, HistoryEntry};
use crate::error::HistoryResult;
use crate::git::GitBackend;
use crate::traits::VersionControl;

/// Records batches of written paths as single history entries.
///
/// The author is fixed at construction. Recording never fails from the
/// caller's point of view: backend errors are logged and reported as
/// [`CommitOutcome::Failed`], and the written files stay on disk
/// uncommitted.
pub struct HistoryRecorder {
    backend: Box<dyn VersionControl>,
    author: Author,
}

impl fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryRecorder")
            .field("author", &self.author)
            .finish_non_exhaustive()
    }
}

impl HistoryRecorder {
    /// Wrap an already-open backend.
    pub fn new(backend: impl VersionControl + 'static, author: Author) -> Self {
        Self {
            backend: Box::new(backend),
            author,
        }
    }

    /// Open (initializing if needed) a git repository at `root`.
    pub fn open_git(root: impl AsRef<Path>, author: Author) -> HistoryResult<Self> {
        Ok(Self::new(GitBackend::init_or_open(root)?, author))
    }

    /// The author stamped on every entry.
    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Stage `paths` and commit them as one entry.
    ///
    /// - No paths: [`CommitOutcome::Empty`], the backend is not touched.
    /// - Staged content equal to the last entry: [`CommitOutcome::Unchanged`].
    /// - Backend error: logged, [`CommitOutcome::Failed`].
    pub fn record(&self, paths: &[PathBuf], message: &str) -> CommitOutcome {
        if paths.is_empty() {
            debug!(msg = message, "no paths to record");
            return CommitOutcome::Empty;
        }

        match self.try_record(paths, message) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    error = %e,
                    paths = paths.len(),
                    msg = message,
                    "failed to record history entry; changes left uncommitted"
                );
                CommitOutcome::Failed(e.to_string())
            }
        }
    }

    fn try_record(&self, paths: &[PathBuf], message: &str) -> HistoryResult<CommitOutcome> {
        self.backend.stage(paths)?;

        if !self.backend.has_staged_changes()? {
            debug!(msg = message, "content unchanged; no history entry created");
            return Ok(CommitOutcome::Unchanged);
        }

        let request = CommitRequest::new(message, self.author.clone());
        let entry = self.backend.commit(&request)?;
        debug!(
            revision = %entry.short_revision(),
            paths = entry.paths.len(),
            "recorded history entry"
        );
        Ok(CommitOutcome::Committed(entry))
    }

    /// Up to `limit` entries, newest first.
    pub fn history(&self, limit: usize) -> HistoryResult<Vec<HistoryEntry>> {
        self.backend.log(limit)
    }

    /// Returns `true` if the working tree holds changes no entry covers.
    pub fn is_dirty(&self) -> HistoryResult<bool> {
        self.backend.is_dirty()
    }
}
