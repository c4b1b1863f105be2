use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Keys understood by the watch firmware.
///
/// Serialized by name; `id()` gives the numeric key used on the watch side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AppMessageKey {
    #[serde(rename = "KEY_LOCATION")]
    Location,
    #[serde(rename = "KEY_CONDITIONS")]
    Conditions,
    #[serde(rename = "KEY_TEMPERATURE")]
    Temperature,
    #[serde(rename = "KEY_REQUEST_TEMPERATURE")]
    RequestTemperature,
    #[serde(rename = "KEY_UPDATE")]
    Update,
}

impl AppMessageKey {
    pub fn id(&self) -> u32 {
        match self {
            Self::Location => 0,
            Self::Conditions => 1,
            Self::Temperature => 2,
            Self::RequestTemperature => 3,
            Self::Update => 999,
        }
    }
}

/// A single value in an app message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageValue {
    Int(i32),
    Text(String),
}

impl From<i32> for MessageValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<String> for MessageValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for MessageValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Flat key/value dictionary sent to the watch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutboundMessage {
    entries: BTreeMap<AppMessageKey, MessageValue>,
}

impl OutboundMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: AppMessageKey, value: impl Into<MessageValue>) -> Self {
        self.entries.insert(key, value.into());
        self
    }

    /// Weather fields for the watchface card
    pub fn weather(location: &str, conditions: &str, temperature: i32) -> Self {
        Self::new()
            .with(AppMessageKey::Location, location)
            .with(AppMessageKey::Conditions, conditions)
            .with(AppMessageKey::Temperature, temperature)
    }

    /// Signals that the position could not be determined
    pub fn location_error() -> Self {
        Self::new().with(AppMessageKey::RequestTemperature, "ERR")
    }

    /// Signals that a newer app version is published
    pub fn update_available() -> Self {
        Self::new().with(AppMessageKey::Update, 0)
    }

    pub fn get(&self, key: AppMessageKey) -> Option<&MessageValue> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: AppMessageKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AppMessageKey, &MessageValue)> {
        self.entries.iter()
    }

    /// Single-line JSON rendering, keyed by key name
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Message received from the watch.
///
/// The payload is kept loosely typed; the companion only inspects it for logging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub payload: BTreeMap<String, serde_json::Value>,
}

impl InboundMessage {
    /// Parse a JSON object into a message payload
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let payload = serde_json::from_str(text)?;
        Ok(Self { payload })
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.payload.contains_key(key)
    }

    /// Value of `key` rendered as a string
    pub fn get_value(&self, key: &str) -> Option<String> {
        match self.payload.get(key) {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
            None => {
                tracing::error!("Key '{}' does not exist in received dictionary", key);
                None
            }
        }
    }
}
