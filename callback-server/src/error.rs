//! Error types for the callback server

use std::net::SocketAddr;

use thiserror::Error;

/// Errors that prevent the callback server from listening
#[derive(Debug, Error)]
pub enum ServerError {
    /// The callback path is not a single non-empty segment
    #[error("Invalid callback path {0:?}: expected a single path segment such as \"/codecFeedback\"")]
    InvalidPath(String),

    /// The listening socket could not be bound
    #[error("Failed to bind callback server to {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    /// The server task ended abnormally
    #[error("Callback server task failed: {0}")]
    Task(String),
}
