//! Typed decoding of codec `HttpFeedback` events.
//!
//! A codec registered for HTTP feedback posts a JSON document for every event
//! matching its feedback expression. The documents are sparse: which
//! identification fields appear depends on the codec's configuration, and the
//! widget action itself sits several levels deep under
//! `Event/UserInterface/Extensions/Widget/Action`.
//!
//! This crate has no knowledge of HTTP. It provides:
//!
//! - [`decode`]: turns a request body into an [`EventEnvelope`], tolerating
//!   absent, `null` and unknown fields.
//! - [`TriggerCondition`]: the fixed widget/action predicate that decides
//!   whether an event should raise a notification.
//!
//! # Example
//!
//! ```
//! use codec_events::{decode, TriggerCondition};
//!
//! let body = br#"{"Event":{"UserInterface":{"Extensions":{"Widget":{"Action":{
//!     "Type":{"Value":"pressed"},"WidgetId":{"Value":"humoctopus"}}}}}}}"#;
//!
//! let envelope = decode(body).unwrap();
//! let trigger = TriggerCondition::new("humoctopus", "pressed");
//! assert!(trigger.matches(&envelope));
//! ```

mod decode;
pub mod envelope;
mod error;
mod trigger;

pub use decode::decode;
pub use envelope::{ActionField, EventEnvelope, FieldValue, Identification, WidgetAction};
pub use error::DecodeError;
pub use trigger::TriggerCondition;
