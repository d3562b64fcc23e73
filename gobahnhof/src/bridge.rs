//! Decode → evaluate → dispatch, once per feedback request.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use callback_server::{FeedbackHandler, HandlerError};
use codec_events::{decode, EventEnvelope, TriggerCondition};
use outbound_client::{ClientError, NotificationDispatcher};

/// Sends the notification for a matched event.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send once, returning the response status
    async fn notify(&self) -> Result<u16, ClientError>;
}

#[async_trait]
impl Notifier for NotificationDispatcher {
    async fn notify(&self) -> Result<u16, ClientError> {
        self.send().await
    }
}

/// The feedback handler wired into the callback server.
///
/// Holds no mutable state; concurrent requests share it freely.
pub struct FeedbackBridge {
    trigger: TriggerCondition,
    notifier: Arc<dyn Notifier>,
}

impl FeedbackBridge {
    pub fn new(trigger: TriggerCondition, notifier: Arc<dyn Notifier>) -> Self {
        Self { trigger, notifier }
    }

    pub fn trigger(&self) -> &TriggerCondition {
        &self.trigger
    }

    /// Evaluate one event and notify on a match.
    ///
    /// Notification failures are logged and swallowed. Returns whether a
    /// notification was attempted.
    pub async fn process(&self, envelope: &EventEnvelope) -> bool {
        tracing::info!(
            codec = envelope.mac_address().unwrap_or("-"),
            widget_id = envelope.widget_id().unwrap_or("-"),
            action_type = envelope.action_type().unwrap_or("-"),
            "Received widget action"
        );

        if !self.trigger.matches(envelope) {
            return false;
        }

        tracing::info!(widget_id = %self.trigger.widget_id, "Trigger matched, sending notification");
        match self.notifier.notify().await {
            Ok(status) => tracing::info!(status, "Notification sent"),
            Err(e) => tracing::warn!(error = %e, "Notification failed"),
        }
        true
    }
}

#[async_trait]
impl FeedbackHandler for FeedbackBridge {
    async fn handle(&self, body: Bytes) -> Result<(), HandlerError> {
        let envelope = decode(&body).map_err(|e| HandlerError::bad_request(e.to_string()))?;
        self.process(&envelope).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PRESSED: &[u8] = br#"{"Event":{"UserInterface":{"Extensions":{"Widget":{"Action":{
        "Type":{"Value":"pressed"},"WidgetId":{"Value":"humoctopus"}}}}}}}"#;
    const RELEASED: &[u8] = br#"{"Event":{"UserInterface":{"Extensions":{"Widget":{"Action":{
        "Type":{"Value":"released"},"WidgetId":{"Value":"humoctopus"}}}}}}}"#;

    #[derive(Default)]
    struct CountingNotifier {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self) -> Result<u16, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ClientError::Network("connection refused".to_string()))
            } else {
                Ok(200)
            }
        }
    }

    fn bridge(notifier: Arc<CountingNotifier>) -> FeedbackBridge {
        FeedbackBridge::new(TriggerCondition::new("humoctopus", "pressed"), notifier)
    }

    #[test]
    fn test_trigger_is_the_configured_condition() {
        let bridge = bridge(Arc::new(CountingNotifier::default()));
        assert_eq!(bridge.trigger(), &TriggerCondition::new("humoctopus", "pressed"));
    }

    #[tokio::test]
    async fn test_matching_event_notifies_once() {
        let notifier = Arc::new(CountingNotifier::default());
        let bridge = bridge(notifier.clone());

        assert!(bridge.handle(Bytes::from_static(PRESSED)).await.is_ok());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_non_matching_event_does_not_notify() {
        let notifier = Arc::new(CountingNotifier::default());
        let bridge = bridge(notifier.clone());

        assert!(bridge.handle(Bytes::from_static(RELEASED)).await.is_ok());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_events_notify_twice() {
        let notifier = Arc::new(CountingNotifier::default());
        let bridge = bridge(notifier.clone());

        bridge.handle(Bytes::from_static(PRESSED)).await.unwrap();
        bridge.handle(Bytes::from_static(PRESSED)).await.unwrap();
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let notifier = Arc::new(CountingNotifier {
            calls: AtomicUsize::new(0),
            fail: true,
        });
        let bridge = bridge(notifier.clone());

        assert!(bridge.handle(Bytes::from_static(PRESSED)).await.is_ok());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let notifier = Arc::new(CountingNotifier::default());
        let bridge = bridge(notifier.clone());

        match bridge.handle(Bytes::from_static(b"{\"Event\":")).await {
            Err(HandlerError::BadRequest(message)) => assert!(message.contains("EOF")),
            other => panic!("Expected HandlerError::BadRequest, got {:?}", other),
        }
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_whitespace_body_reports_missing_body() {
        let notifier = Arc::new(CountingNotifier::default());
        let bridge = bridge(notifier);

        let err = bridge.handle(Bytes::from_static(b"  \n")).await.unwrap_err();
        assert_eq!(err, HandlerError::bad_request("Please send a request body"));
    }
}
