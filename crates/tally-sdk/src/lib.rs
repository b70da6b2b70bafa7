//! High-level SDK for Tally.
//!
//! [`Tally`] owns a repository root and wires an [`ObjectStore`] and a
//! [`FileStore`] to one shared history recorder. This is the main entry point
//! for applications embedding Tally.
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use tally_sdk::{Author, Record, Tally};
//!
//! #[derive(Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Widget {
//!     id: String,
//!     name: String,
//! }
//!
//! impl Record for Widget {
//!     const TYPE_NAME: &'static str = "Widget";
//!     fn identity_key(&self) -> Option<String> {
//!         Some(self.id.clone())
//!     }
//! }
//!
//! let tally = Tally::open_at("data", Author::new("bot", "bot@example.com")?)?;
//! let report = tally.objects().save_one(&Widget { id: "42".into(), name: "x".into() });
//! assert!(report.is_complete());
//! # Ok::<(), tally_sdk::SdkError>(())
//! ```

pub mod config;
pub mod error;
pub mod repository;

pub use config::{AuthorConfig, TallyConfig};
pub use error::{SdkError, SdkResult};
pub use repository::Tally;

// Re-export key types
pub use tally_codec::{Codec, JsonCodec};
pub use tally_history::{CommitOutcome, HistoryEntry};
pub use tally_store::{
    FileStore, ObjectStore, RecordQuery, SaveReport, ScanEntry, SkipReason, SkippedItem,
};
pub use tally_types::{Author, Record};
