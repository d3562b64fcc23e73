//! Event envelope types mirroring the codec's feedback document.
//!
//! The codec wraps every leaf in an object carrying a `Value` (and, under
//! `UserInterface`, an `id`). Every level here defaults when absent or
//! `null`, so a document that only carries the widget action still decodes.

use serde::{de, Deserialize, Deserializer};
use std::net::IpAddr;

/// One decoded feedback event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EventEnvelope {
    #[serde(rename = "Event", default, deserialize_with = "null_as_default")]
    pub event: Event,
}

/// The `Event` root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Event {
    #[serde(rename = "Identification", default, deserialize_with = "null_as_default")]
    pub identification: Identification,
    #[serde(rename = "UserInterface", default, deserialize_with = "null_as_default")]
    pub user_interface: UserInterface,
}

/// Identity of the codec that sent the event.
///
/// Which of these are populated depends on the codec's configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Identification {
    #[serde(rename = "IPAddress", default, deserialize_with = "deserialize_ip_field")]
    pub ip_address: FieldValue<IpAddr>,
    #[serde(rename = "MACAddress", default, deserialize_with = "null_as_default")]
    pub mac_address: FieldValue<String>,
    #[serde(rename = "ProductID", default, deserialize_with = "null_as_default")]
    pub product_id: FieldValue<String>,
    #[serde(rename = "ProductType", default, deserialize_with = "null_as_default")]
    pub product_type: FieldValue<String>,
    #[serde(rename = "SWVersion", default, deserialize_with = "null_as_default")]
    pub sw_version: FieldValue<String>,
    #[serde(rename = "SerialNumber", default, deserialize_with = "null_as_default")]
    pub serial_number: FieldValue<String>,
    #[serde(rename = "SystemName", default, deserialize_with = "null_as_default")]
    pub system_name: FieldValue<String>,
}

/// A `{ "Value": ... }` leaf.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldValue<T> {
    #[serde(rename = "Value")]
    pub value: Option<T>,
}

impl<T> Default for FieldValue<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> FieldValue<T> {
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserInterface {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i64>,
    #[serde(rename = "Extensions", default, deserialize_with = "null_as_default")]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Extensions {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i64>,
    #[serde(rename = "Widget", default, deserialize_with = "null_as_default")]
    pub widget: Widget,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Widget {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i64>,
    #[serde(rename = "Action", default, deserialize_with = "null_as_default")]
    pub action: WidgetAction,
}

/// The interaction that fired: which widget, and what happened to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WidgetAction {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i64>,
    /// Interaction state such as `pressed`, `released` or `clicked`
    #[serde(rename = "Type", default, deserialize_with = "null_as_default")]
    pub action_type: ActionField,
    #[serde(rename = "Value", default, deserialize_with = "null_as_default")]
    pub value: ActionField,
    /// Identifier of the in-room control panel widget
    #[serde(rename = "WidgetId", default, deserialize_with = "null_as_default")]
    pub widget_id: ActionField,
}

/// A `{ "id": ..., "Value": "..." }` leaf under `Action`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ActionField {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<i64>,
    #[serde(rename = "Value")]
    pub value: Option<String>,
}

impl EventEnvelope {
    pub fn identification(&self) -> &Identification {
        &self.event.identification
    }

    pub fn action(&self) -> &WidgetAction {
        &self.event.user_interface.extensions.widget.action
    }

    pub fn widget_id(&self) -> Option<&str> {
        self.action().widget_id.value.as_deref()
    }

    pub fn action_type(&self) -> Option<&str> {
        self.action().action_type.value.as_deref()
    }

    pub fn action_value(&self) -> Option<&str> {
        self.action().value.value.as_deref()
    }

    pub fn mac_address(&self) -> Option<&str> {
        self.identification().mac_address.value.as_deref()
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An empty `Value` means the codec has no address; anything else must parse.
fn deserialize_ip_field<'de, D>(deserializer: D) -> Result<FieldValue<IpAddr>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: FieldValue<String> = null_as_default(deserializer)?;
    let value = match raw.value.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(text) => Some(text.parse::<IpAddr>().map_err(|_| {
            de::Error::custom(format!("invalid IP address {text:?}"))
        })?),
    };
    Ok(FieldValue { value })
}

/// Ids arrive as string-encoded integers; plain numbers are accepted too.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) => text.trim().parse::<i64>().map(Some).map_err(|_| {
            de::Error::custom(format!(
                "invalid id {text:?}: expected a string-encoded integer"
            ))
        }),
    }
}
