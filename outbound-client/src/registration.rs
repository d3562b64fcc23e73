//! HttpFeedback registration with the codec.

use serde::Serialize;
use url::Url;

use crate::error::ClientError;
use crate::{check_status, BasicCredentials};

/// Feedback expression selecting in-room control widget actions
pub const DEFAULT_EXPRESSION: &str = "/Event/UserInterface/Extensions/Widget/Action";

/// Encoding the codec uses when posting feedback.
///
/// Only JSON is decoded on the receiving side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedbackFormat {
    #[default]
    Json,
}

impl FeedbackFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackFormat::Json => "JSON",
        }
    }
}

/// A feedback subscription to declare on the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRegistration {
    /// Codec feedback slot (the codec offers slots 1-4)
    pub slot: u8,
    pub format: FeedbackFormat,
    /// URL the codec should post events to
    pub server_url: String,
    /// Event path expressions to forward
    pub expressions: Vec<String>,
}

impl FeedbackRegistration {
    /// Register slot 1 for JSON widget action feedback
    pub fn widget_actions(server_url: impl Into<String>) -> Self {
        Self {
            slot: 1,
            format: FeedbackFormat::Json,
            server_url: server_url.into(),
            expressions: vec![DEFAULT_EXPRESSION.to_string()],
        }
    }

    /// Render the `putxml` command body
    pub fn to_xml(&self) -> Result<String, ClientError> {
        let command = Command {
            http_feedback: HttpFeedback {
                register: Register {
                    command: "True",
                    role: "Admin",
                    read: "Admin",
                    feedback_slot: self.slot,
                    format: self.format.as_str(),
                    server_url: &self.server_url,
                    expressions: self
                        .expressions
                        .iter()
                        .enumerate()
                        .map(|(index, path)| Expression {
                            item: index + 1,
                            path,
                        })
                        .collect(),
                },
            },
        };

        quick_xml::se::to_string(&command).map_err(|e| ClientError::Encode(e.to_string()))
    }
}

#[derive(Serialize)]
#[serde(rename = "Command")]
struct Command<'a> {
    #[serde(rename = "HttpFeedback")]
    http_feedback: HttpFeedback<'a>,
}

#[derive(Serialize)]
struct HttpFeedback<'a> {
    #[serde(rename = "Register")]
    register: Register<'a>,
}

#[derive(Serialize)]
struct Register<'a> {
    #[serde(rename = "@command")]
    command: &'static str,
    #[serde(rename = "@role")]
    role: &'static str,
    #[serde(rename = "@read")]
    read: &'static str,
    #[serde(rename = "FeedbackSlot")]
    feedback_slot: u8,
    #[serde(rename = "Format")]
    format: &'static str,
    #[serde(rename = "ServerUrl")]
    server_url: &'a str,
    #[serde(rename = "Expression")]
    expressions: Vec<Expression<'a>>,
}

#[derive(Serialize)]
struct Expression<'a> {
    #[serde(rename = "@item")]
    item: usize,
    #[serde(rename = "$text")]
    path: &'a str,
}

/// Client for the codec's `putxml` command endpoint.
///
/// The codec sits on a trusted segment with a self-signed certificate, so
/// this client does not verify the server certificate. It is never used for
/// any other host.
#[derive(Debug, Clone)]
pub struct RegistrationClient {
    client: reqwest::Client,
    endpoint: Url,
    credentials: BasicCredentials,
}

impl RegistrationClient {
    pub fn new(device_url: &str, credentials: BasicCredentials) -> Result<Self, ClientError> {
        // A trailing slash keeps any base path when joining
        let base = format!("{}/", device_url.trim_end_matches('/'));
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join("putxml"))
            .map_err(|e| ClientError::Configuration(format!("Invalid device URL {device_url:?}: {e}")))?;

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| ClientError::Configuration(format!("Failed to build device client: {e}")))?;

        Ok(Self {
            client,
            endpoint,
            credentials,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the registration command and return the response status
    pub async fn register(&self, registration: &FeedbackRegistration) -> Result<u16, ClientError> {
        let body = registration.to_xml()?;
        tracing::debug!(endpoint = %self.endpoint, slot = registration.slot, "Registering codec feedback");

        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        check_status(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_widget_action_registration_xml() {
        let registration =
            FeedbackRegistration::widget_actions("http://10.27.1.127:8080/codecFeedback");
        let xml = registration.to_xml().unwrap();

        assert!(xml.starts_with(
            r#"<Command><HttpFeedback><Register command="True" role="Admin" read="Admin">"#
        ));
        assert!(xml.contains("<FeedbackSlot>1</FeedbackSlot>"));
        assert!(xml.contains("<Format>JSON</Format>"));
        assert!(xml.contains("<ServerUrl>http://10.27.1.127:8080/codecFeedback</ServerUrl>"));
        assert!(xml.contains(
            r#"<Expression item="1">/Event/UserInterface/Extensions/Widget/Action</Expression>"#
        ));
        assert!(xml.ends_with("</Register></HttpFeedback></Command>"));
    }

    #[test]
    fn test_expressions_are_numbered_from_one() {
        let registration = FeedbackRegistration {
            slot: 3,
            format: FeedbackFormat::Json,
            server_url: "http://bridge:8080/codecFeedback".to_string(),
            expressions: vec![
                DEFAULT_EXPRESSION.to_string(),
                "/Event/UserInterface/Extensions/Panel/Clicked".to_string(),
            ],
        };
        let xml = registration.to_xml().unwrap();

        assert!(xml.contains("<FeedbackSlot>3</FeedbackSlot>"));
        assert!(xml.contains(&format!(r#"<Expression item="1">{DEFAULT_EXPRESSION}</Expression>"#)));
        assert!(xml.contains(
            r#"<Expression item="2">/Event/UserInterface/Extensions/Panel/Clicked</Expression>"#
        ));
    }

    #[test]
    fn test_server_url_is_escaped() {
        let registration = FeedbackRegistration::widget_actions("http://bridge/feedback?a=1&b=2");
        let xml = registration.to_xml().unwrap();
        assert!(xml.contains("<ServerUrl>http://bridge/feedback?a=1&amp;b=2</ServerUrl>"));
    }

    #[rstest]
    #[case("https://10.27.2.151", "https://10.27.2.151/putxml")]
    #[case("https://10.27.2.151/", "https://10.27.2.151/putxml")]
    #[case("https://codec.example.net/api", "https://codec.example.net/api/putxml")]
    #[case("https://codec.example.net/api/", "https://codec.example.net/api/putxml")]
    fn test_endpoint_is_putxml(#[case] device_url: &str, #[case] expected: &str) {
        let client = RegistrationClient::new(device_url, BasicCredentials::new("admin", "secret")).unwrap();
        assert_eq!(client.endpoint().as_str(), expected);
    }

    #[test]
    fn test_invalid_device_url() {
        let result = RegistrationClient::new("not a url", BasicCredentials::new("admin", "secret"));
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
