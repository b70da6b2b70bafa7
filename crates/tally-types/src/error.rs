use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{type_name} has no identity")]
    MissingIdentity { type_name: String },

    #[error("{type_name} has {count} identity fields, expected exactly one")]
    AmbiguousIdentity { type_name: String, count: usize },

    #[error("{type_name} identity field is not a string or number")]
    UnsupportedIdentity { type_name: String },

    #[error("{type_name} document is not a JSON object")]
    NotAnObject { type_name: String },

    #[error("invalid author: {0}")]
    InvalidAuthor(String),
}
