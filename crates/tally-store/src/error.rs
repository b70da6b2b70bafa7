use std::io;

use tally_codec::CodecError;
use tally_types::TypeError;

/// Errors from store reads.
///
/// Saves never return this type; their failures are per-item
/// [`SkipReason`]s inside a [`SaveReport`](crate::SaveReport).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error other than "not found" while reading.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Why one item of a save was not written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    /// The item has no identity, or an ambiguous one.
    #[error(transparent)]
    Identity(#[from] TypeError),

    /// The item could not be encoded.
    #[error(transparent)]
    Encode(#[from] CodecError),

    /// Creating the directory or writing the file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<io::Error> for SkipReason {
    fn from(e: io::Error) -> Self {
        Self::Io(e.to_string())
    }
}
