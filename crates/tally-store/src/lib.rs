//! Record and file stores for Tally.
//!
//! [`ObjectStore`] persists typed records (and untyped JSON documents) as
//! one indented JSON file each; [`FileStore`] persists opaque byte streams.
//! Both hand every batch of written paths to a shared
//! [`HistoryRecorder`](tally_history::HistoryRecorder) so that one save call
//! becomes at most one history entry.
//!
//! # Layout
//!
//! ```text
//! {root}/{TypeName}/{id}.json    one encoded record per file
//! {root}/Files/{name}            one raw file per stored stream
//! ```
//!
//! # Failure Model
//!
//! Saves never return an error. Each returns a [`SaveReport`] listing the
//! written paths, the skipped items with their [`SkipReason`], and the
//! [`CommitOutcome`](tally_history::CommitOutcome). Reads return `Ok(None)`
//! for missing or undecodable records and reserve `Err` for unexpected I/O
//! failures.

mod disk;
pub mod error;
pub mod file;
pub mod object;
pub mod report;
pub mod scan;

pub use error::{SkipReason, StoreError, StoreResult};
pub use file::FileStore;
pub use object::ObjectStore;
pub use report::{SaveReport, SkippedItem};
pub use scan::{QueryIter, RecordQuery, ScanEntry, ScanIter};
