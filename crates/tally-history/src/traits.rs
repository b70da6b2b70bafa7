//! The [`VersionControl`] trait defining the history backend interface.
//!
//! A backend owns a working tree rooted at the store root. Paths handed to
//! it are relative to that root (absolute paths inside the root are
//! accepted too).

use std::path::PathBuf;

use crate::entry::{CommitRequest, HistoryEntry};
use crate::error::HistoryResult;

/// Storage backend for history entries.
///
/// Implementations must be thread-safe (`Send + Sync`), but nothing above
/// them serializes a stage-then-commit sequence: two writers interleaving
/// on one repository may merge their batches into a single entry.
pub trait VersionControl: Send + Sync {
    /// Add the current content of `paths` to the pending change set.
    ///
    /// A path whose file no longer exists is staged as a removal.
    fn stage(&self, paths: &[PathBuf]) -> HistoryResult<()>;

    /// Returns `true` if the pending change set differs from the last entry.
    fn has_staged_changes(&self) -> HistoryResult<bool>;

    /// Returns `true` if anything in the working tree (staged, modified or
    /// untracked) differs from the last entry.
    fn is_dirty(&self) -> HistoryResult<bool>;

    /// Record the pending change set as a new entry on top of the last one.
    fn commit(&self, request: &CommitRequest) -> HistoryResult<HistoryEntry>;

    /// Up to `limit` entries, newest first.
    fn log(&self, limit: usize) -> HistoryResult<Vec<HistoryEntry>>;
}
