/// Errors from encoding or decoding a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The value could not be represented in the text encoding.
    #[error("encode error: {0}")]
    Encode(String),

    /// The stored text is malformed or does not match the target type.
    #[error("decode error: {0}")]
    Decode(String),
}

impl CodecError {
    /// Returns `true` for failures reading stored content.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Result alias for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
