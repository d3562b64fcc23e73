//! The seam between the HTTP layer and event processing.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Processes one feedback request body.
///
/// Invoked once per request with a non-empty body. Handlers for concurrent
/// requests run concurrently, so implementations must not rely on ordering.
#[async_trait]
pub trait FeedbackHandler: Send + Sync + 'static {
    async fn handle(&self, body: Bytes) -> Result<(), HandlerError>;
}

/// Outcomes a handler reports back to the codec.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The body was unusable; answered with 400 and this message
    #[error("{0}")]
    BadRequest(String),
}

impl HandlerError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        HandlerError::BadRequest(message.into())
    }
}
