use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid author: {0}")]
    Types(#[from] tally_types::TypeError),

    #[error("history error: {0}")]
    History(#[from] tally_history::HistoryError),

    #[error("store error: {0}")]
    Store(#[from] tally_store::StoreError),

    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
