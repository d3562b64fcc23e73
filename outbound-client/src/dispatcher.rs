//! InformaCast message dispatch.

use serde::{Deserialize, Serialize, Serializer};
use url::Url;

use crate::error::ClientError;
use crate::trust::TrustContext;
use crate::{check_status, BasicCredentials};

/// What a recipient id refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientKind {
    /// A named group of recipients known to InformaCast
    RecipientGroup,
}

/// Who a notification is addressed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RecipientTarget {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: RecipientKind,
}

impl RecipientTarget {
    pub fn group(id: u64) -> Self {
        Self {
            id,
            kind: RecipientKind::RecipientGroup,
        }
    }
}

/// Message-send request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipientMessage {
    pub recipients: Vec<Recipient>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    #[serde(serialize_with = "serialize_as_string")]
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: RecipientKind,
}

impl From<RecipientTarget> for RecipientMessage {
    fn from(target: RecipientTarget) -> Self {
        Self {
            recipients: vec![Recipient {
                id: target.id,
                kind: target.kind,
            }],
        }
    }
}

fn serialize_as_string<S: Serializer>(id: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(id)
}

/// Sends a fixed message template to a fixed recipient.
///
/// Each call to [`send`](Self::send) is one POST; there is no retry and no
/// deduplication.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    client: reqwest::Client,
    endpoint: Url,
    credentials: BasicCredentials,
    message: RecipientMessage,
}

impl NotificationDispatcher {
    pub fn new(
        base_url: &str,
        message_id: u64,
        credentials: BasicCredentials,
        recipient: RecipientTarget,
        trust: &TrustContext,
    ) -> Result<Self, ClientError> {
        let endpoint = Self::message_endpoint(base_url, message_id)?;

        let client = trust.client_builder().build().map_err(|e| {
            ClientError::Configuration(format!("Failed to build notification client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint,
            credentials,
            message: recipient.into(),
        })
    }

    fn message_endpoint(base_url: &str, message_id: u64) -> Result<Url, ClientError> {
        let url = format!(
            "{}/InformaCast/RESTServices/V1/Messages/{}",
            base_url.trim_end_matches('/'),
            message_id
        );
        Url::parse(&url)
            .map_err(|e| ClientError::Configuration(format!("Invalid notification URL {base_url:?}: {e}")))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn message(&self) -> &RecipientMessage {
        &self.message
    }

    /// POST the message and return the response status
    pub async fn send(&self) -> Result<u16, ClientError> {
        tracing::debug!(endpoint = %self.endpoint, "Sending notification");

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(&self.message)
            .send()
            .await?;

        check_status(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOT_PEM: &[u8] = include_bytes!("../tests/fixtures/root-ca.pem");

    #[test]
    fn test_message_body_shape() {
        let message = RecipientMessage::from(RecipientTarget::group(19063007));
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "recipients": [{ "id": "19063007", "type": "RECIPIENT_GROUP" }]
            })
        );
    }

    #[test]
    fn test_recipient_target_deserializes_from_config_shape() {
        let target: RecipientTarget =
            serde_json::from_str(r#"{"id": 19063007, "type": "RECIPIENT_GROUP"}"#).unwrap();
        assert_eq!(target, RecipientTarget::group(19063007));
    }

    #[test]
    fn test_endpoint_includes_message_id() {
        let trust = TrustContext::from_pem(ROOT_PEM).unwrap();
        let dispatcher = NotificationDispatcher::new(
            "https://singlewire.example.net:8444/",
            867,
            BasicCredentials::new("user", "pass"),
            RecipientTarget::group(19063007),
            &trust,
        )
        .unwrap();

        assert_eq!(
            dispatcher.endpoint().as_str(),
            "https://singlewire.example.net:8444/InformaCast/RESTServices/V1/Messages/867"
        );
        assert_eq!(dispatcher.message().recipients.len(), 1);
    }

    #[test]
    fn test_invalid_base_url() {
        let trust = TrustContext::from_pem(ROOT_PEM).unwrap();
        let result = NotificationDispatcher::new(
            "singlewire without scheme",
            867,
            BasicCredentials::new("user", "pass"),
            RecipientTarget::group(1),
            &trust,
        );
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
