//! Outbound HTTP clients for the feedback bridge
//!
//! Two calls leave the process, and each gets its own client so that their
//! TLS policies can never mix:
//!
//! - [`RegistrationClient`] talks to the codec on the private segment. The
//!   codec presents a self-signed certificate, so this client skips
//!   verification.
//! - [`NotificationDispatcher`] talks to InformaCast and trusts only the root
//!   in its [`TrustContext`].

mod dispatcher;
mod error;
mod registration;
mod trust;

pub use dispatcher::{NotificationDispatcher, Recipient, RecipientKind, RecipientMessage, RecipientTarget};
pub use error::ClientError;
pub use registration::{FeedbackFormat, FeedbackRegistration, RegistrationClient, DEFAULT_EXPRESSION};
pub use trust::TrustContext;

use std::fmt;

use serde::Deserialize;

/// Username and password for HTTP basic auth
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Read a response into `Ok(status)` on 2xx, or `ClientError::Status` otherwise
async fn check_status(response: reqwest::Response) -> Result<u16, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(status.as_u16());
    }

    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body,
    })
}
