//! Gobahnhof
//!
//! Listens for in-room control feedback from a Cisco codec and raises an
//! InformaCast notification when the configured widget action arrives.
//!
//! Startup is a fixed sequence:
//!
//! 1. Load the InformaCast trust root and build the dispatcher. Failure here
//!    stops the process.
//! 2. Register the feedback URL with the codec. Failure here is logged; the
//!    codec may already be registered from an earlier run.
//! 3. Bind the callback listener and serve until the process exits.
//!
//! ```no_run
//! # async fn example() -> Result<(), gobahnhof::BridgeError> {
//! let config = gobahnhof::Config::load("gobahnhof.toml")?;
//! gobahnhof::run(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod logging;

mod bridge;
mod error;

use std::sync::Arc;

use callback_server::CallbackServer;
use outbound_client::{NotificationDispatcher, RegistrationClient, TrustContext};

pub use bridge::{FeedbackBridge, Notifier};
pub use config::{Config, ConfigError};
pub use error::BridgeError;
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};

/// Build the dispatcher described by `config.notification`.
pub fn build_dispatcher(config: &Config) -> Result<NotificationDispatcher, BridgeError> {
    let notification = &config.notification;
    let trust = TrustContext::from_pem_file(&notification.trust_root)?;

    let dispatcher = NotificationDispatcher::new(
        &notification.url,
        notification.message_id,
        notification.credentials.clone(),
        notification.recipient,
        &trust,
    )?;
    tracing::info!(endpoint = %dispatcher.endpoint(), "Notification dispatcher ready");
    Ok(dispatcher)
}

/// Ask the codec to post widget actions to our callback URL.
///
/// Never fails; every problem is logged and startup continues.
pub async fn register_with_device(config: &Config) {
    if !config.device.register {
        tracing::info!("Feedback registration disabled");
        return;
    }

    let Some(callback_url) = config.callback_url() else {
        tracing::warn!("Could not determine a callback URL; set server.public_url to register");
        return;
    };

    let client = match RegistrationClient::new(&config.device.url, config.device.credentials.clone()) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Feedback registration skipped");
            return;
        }
    };

    let registration = config.device.registration(callback_url.clone());
    match client.register(&registration).await {
        Ok(status) => {
            tracing::info!(status, %callback_url, slot = registration.slot, "Registered for codec feedback")
        }
        Err(e) => tracing::warn!(error = %e, endpoint = %client.endpoint(), "Feedback registration failed"),
    }
}

/// Run the bridge until the listener stops.
pub async fn run(config: Config) -> Result<(), BridgeError> {
    let dispatcher = build_dispatcher(&config)?;
    register_with_device(&config).await;

    let bridge = FeedbackBridge::new(config.trigger.clone(), Arc::new(dispatcher));
    tracing::info!(
        widget_id = %bridge.trigger().widget_id,
        action_type = %bridge.trigger().action_type,
        "Watching for widget action"
    );

    let server = CallbackServer::bind(config.server.listen, &config.server.path, Arc::new(bridge))?;
    server.run().await?;
    Ok(())
}
