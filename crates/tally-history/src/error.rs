use std::path::PathBuf;

/// Errors from the version-control backend.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Error reported by libgit2.
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error while reading the working tree.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The path is not inside the repository working tree.
    #[error("path outside repository: {}", .0.display())]
    OutsideRepository(PathBuf),

    /// The repository exists but has no working tree.
    #[error("repository at {} is bare", .0.display())]
    BareRepository(PathBuf),

    /// Any other backend failure (poisoned lock, walk error, ...).
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for history operations.
pub type HistoryResult<T> = Result<T, HistoryError>;
