//! Error types for event decoding

use thiserror::Error;

/// Errors that can occur while decoding a feedback event body
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The request carried no body at all
    #[error("Please send a request body")]
    EmptyBody,

    /// The body is not JSON, or not JSON of the expected shape
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl DecodeError {
    /// Whether this error means the body was missing rather than malformed
    pub fn is_empty_body(&self) -> bool {
        matches!(self, DecodeError::EmptyBody)
    }
}
