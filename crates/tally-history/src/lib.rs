//! History recording for Tally.
//!
//! Every save in Tally ends by handing the set of written paths to a
//! [`HistoryRecorder`], which stages them and commits them as a single
//! history entry. Saving content identical to the last entry creates
//! nothing, so history only grows when data actually changes.
//!
//! # Backends
//!
//! All backends implement the [`VersionControl`] trait:
//!
//! - [`GitBackend`] -- a git working tree via libgit2 (the default)
//! - [`InMemoryBackend`] -- content-hash snapshots for tests and embedding
//!
//! # Failure Model
//!
//! Recording is best effort. Files are written before the recorder runs;
//! if staging or committing fails the error is logged and surfaced as
//! [`CommitOutcome::Failed`], leaving the data on disk but uncommitted.

pub mod entry;
pub mod error;
pub mod git;
pub mod memory;
pub mod recorder;
pub mod traits;

pub use entry::{CommitOutcome, CommitRequest, HistoryEntry};
pub use error::{HistoryError, HistoryResult};
pub use git::GitBackend;
pub use memory::InMemoryBackend;
pub use recorder::HistoryRecorder;
pub use traits::VersionControl;
