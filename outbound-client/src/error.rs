//! Error types for the outbound clients

use thiserror::Error;

/// Errors that can occur while building or using an outbound client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Trust material, URL or client settings are unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request payload could not be serialized
    #[error("Encoding error: {0}")]
    Encode(String),

    /// Connection, TLS or transport failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The remote answered with a non-success status
    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Network(error.to_string())
    }
}
