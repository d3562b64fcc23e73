//! Outbound call tests against mock codec and InformaCast endpoints.

use mockito::{Matcher, Server};
use outbound_client::{
    BasicCredentials, ClientError, FeedbackRegistration, NotificationDispatcher, RecipientTarget,
    RegistrationClient, TrustContext,
};
use rstest::rstest;

const ROOT_PEM: &[u8] = include_bytes!("fixtures/root-ca.pem");
const MESSAGE_PATH: &str = "/InformaCast/RESTServices/V1/Messages/867";

fn dispatcher_for(base_url: &str) -> NotificationDispatcher {
    let trust = TrustContext::from_pem(ROOT_PEM).expect("Fixture root should parse");
    NotificationDispatcher::new(
        base_url,
        867,
        BasicCredentials::new("user", "pass"),
        RecipientTarget::group(19063007),
        &trust,
    )
    .expect("Failed to build dispatcher")
}

#[tokio::test]
async fn test_registration_posts_xml_with_basic_auth() {
    let mut server = Server::new_async().await;
    let registration = FeedbackRegistration::widget_actions("http://10.27.1.127:8080/codecFeedback");

    let mock = server
        .mock("POST", "/putxml")
        .match_header("content-type", "text/xml")
        .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
        .match_body(Matcher::Exact(registration.to_xml().unwrap()))
        .with_status(200)
        .with_body("<?xml version=\"1.0\"?><Command><Success/></Command>")
        .create_async()
        .await;

    let client = RegistrationClient::new(&server.url(), BasicCredentials::new("admin", "secret"))
        .expect("Failed to build registration client");
    let status = client.register(&registration).await.expect("Registration should succeed");

    assert_eq!(status, 200);
    mock.assert_async().await;
}

#[rstest]
#[case(401)]
#[case(500)]
#[tokio::test]
async fn test_registration_non_success_is_status_error(#[case] code: usize) {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/putxml")
        .with_status(code)
        .with_body("denied")
        .create_async()
        .await;

    let client = RegistrationClient::new(&server.url(), BasicCredentials::new("admin", "wrong")).unwrap();
    let result = client
        .register(&FeedbackRegistration::widget_actions("http://bridge:8080/codecFeedback"))
        .await;

    match result {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status as usize, code);
            assert_eq!(body, "denied");
        }
        other => panic!("Expected ClientError::Status, got {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_registration_unreachable_device_is_network_error() {
    let client = RegistrationClient::new("http://127.0.0.1:1", BasicCredentials::new("admin", "secret")).unwrap();
    let result = client
        .register(&FeedbackRegistration::widget_actions("http://bridge:8080/codecFeedback"))
        .await;

    assert!(matches!(result, Err(ClientError::Network(_))));
}

#[tokio::test]
async fn test_dispatch_posts_recipient_group() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", MESSAGE_PATH)
        .match_header("content-type", "application/json")
        .match_header("authorization", "Basic dXNlcjpwYXNz")
        .match_body(Matcher::Json(serde_json::json!({
            "recipients": [{ "id": "19063007", "type": "RECIPIENT_GROUP" }]
        })))
        .with_status(202)
        .create_async()
        .await;

    let status = dispatcher_for(&server.url()).send().await.expect("Dispatch should succeed");

    assert_eq!(status, 202);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_dispatch_each_send_is_one_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", MESSAGE_PATH)
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let dispatcher = dispatcher_for(&server.url());
    dispatcher.send().await.unwrap();
    dispatcher.send().await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_dispatch_server_error_is_status_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", MESSAGE_PATH)
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    match dispatcher_for(&server.url()).send().await {
        Err(ClientError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected ClientError::Status, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dispatch_unreachable_service_is_network_error() {
    let result = dispatcher_for("http://127.0.0.1:1").send().await;
    assert!(matches!(result, Err(ClientError::Network(_))));
}
