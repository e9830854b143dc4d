//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding wire data.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// A value does not fit the binary layout it is written into.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Binary data is too short or otherwise malformed.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// Stream parameters outside what Opus supports.
    #[error("invalid opus parameters: {0}")]
    InvalidOpusInfo(String),

    /// Failed to (de)serialize a JSON frame.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProtocolError {
    /// Creates an encoding error.
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding(message.into())
    }

    /// Creates a decoding error.
    pub fn decoding(message: impl Into<String>) -> Self {
        Self::Decoding(message.into())
    }
}
