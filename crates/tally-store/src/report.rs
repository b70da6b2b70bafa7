use std::path::PathBuf;

use tally_history::CommitOutcome;

use crate::error::SkipReason;

/// One input item that was not written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedItem {
    /// Position of the item in the input sequence.
    pub index: usize,
    pub reason: SkipReason,
}

/// Per-item outcome of a save call.
///
/// `written` holds the relative paths that reached disk, in input order and
/// without duplicates; `commit` tells whether they made it into history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveReport {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<SkippedItem>,
    pub commit: CommitOutcome,
}

impl Default for SaveReport {
    fn default() -> Self {
        Self {
            written: Vec::new(),
            skipped: Vec::new(),
            commit: CommitOutcome::Empty,
        }
    }
}

impl SaveReport {
    /// Returns `true` if every item was written and the batch committed (or
    /// was already identical to history).
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
            && matches!(self.commit, CommitOutcome::Committed(_) | CommitOutcome::Unchanged)
    }

    pub(crate) fn add_written(&mut self, path: PathBuf) {
        if !self.written.contains(&path) {
            self.written.push(path);
        }
    }

    pub(crate) fn add_skipped(&mut self, index: usize, reason: SkipReason) {
        self.skipped.push(SkippedItem { index, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::TypeError;

    #[test]
    fn default_report_is_empty() {
        let report = SaveReport::default();
        assert!(report.written.is_empty());
        assert_eq!(report.commit, CommitOutcome::Empty);
        assert!(!report.is_complete());
    }

    #[test]
    fn duplicate_paths_collapse() {
        let mut report = SaveReport::default();
        report.add_written(PathBuf::from("Widget/1.json"));
        report.add_written(PathBuf::from("Widget/1.json"));
        assert_eq!(report.written.len(), 1);
    }

    #[test]
    fn skipped_items_make_report_incomplete() {
        let mut report = SaveReport {
            commit: CommitOutcome::Unchanged,
            ..SaveReport::default()
        };
        assert!(report.is_complete());
        report.add_skipped(
            2,
            SkipReason::Identity(TypeError::MissingIdentity { type_name: "Widget".into() }),
        );
        assert!(!report.is_complete());
        assert_eq!(report.skipped[0].index, 2);
    }
}
