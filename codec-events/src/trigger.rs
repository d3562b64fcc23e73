use serde::Deserialize;

use crate::envelope::EventEnvelope;

/// The widget interaction that should raise a notification.
///
/// Both fields are compared to the event by exact, case-sensitive string
/// equality. An event missing either field never matches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TriggerCondition {
    pub widget_id: String,
    pub action_type: String,
}

impl TriggerCondition {
    pub fn new(widget_id: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            widget_id: widget_id.into(),
            action_type: action_type.into(),
        }
    }

    /// Returns true iff the event's widget id and action type both equal this condition's.
    pub fn matches(&self, envelope: &EventEnvelope) -> bool {
        envelope.widget_id() == Some(self.widget_id.as_str())
            && envelope.action_type() == Some(self.action_type.as_str())
    }
}
