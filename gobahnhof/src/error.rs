//! Startup errors for the bridge process

use crate::config::ConfigError;
use crate::logging::LoggingError;
use callback_server::ServerError;
use outbound_client::ClientError;
use thiserror::Error;

/// Errors that stop the process; request-time failures never surface here
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Trust root or dispatcher construction failed
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Server(#[from] ServerError),
}
