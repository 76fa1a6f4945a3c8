//! Event - the unit of data accepted by the receiver
//!
//! An `Event` pairs a caller-supplied identifier with an arbitrary JSON
//! payload. The identifier is what the sink uses as the document id, so
//! re-delivery of the same record overwrites rather than duplicates.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::error::ProtocolError;

/// Stable event identifier supplied by the producer
///
/// # Example
///
/// ```
/// use relay_protocol::EventId;
///
/// let id = EventId::new("90020230101000000000000000000000000000000000000000");
/// assert!(id.as_str().starts_with("9002"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EventId(Arc<str>);

impl EventId {
    /// Create a new event ID
    #[inline]
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Get the event ID as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EventId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for EventId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Immutable event record
///
/// Cloning is cheap for the identifier (shared `Arc<str>`); the payload is
/// cloned deeply, so the pipeline moves events rather than cloning them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    id: EventId,
    payload: Value,
}

impl Event {
    /// Create an event from an identifier and payload
    pub fn new(id: impl Into<EventId>, payload: Value) -> Self {
        Self {
            id: id.into(),
            payload,
        }
    }

    /// Build an event from a JSON record, taking the identifier from `id_field`
    ///
    /// The whole record becomes the payload. The identifier must be a
    /// non-empty string.
    pub fn from_record(record: Value, id_field: &str) -> crate::Result<Self> {
        let Value::Object(ref map) = record else {
            return Err(ProtocolError::NotAnObject(json_kind(&record)));
        };

        let id = match map.get(id_field) {
            None | Some(Value::Null) => return Err(ProtocolError::missing_field(id_field)),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return Err(ProtocolError::invalid_field(id_field, "must not be empty"));
            }
            Some(Value::String(s)) => EventId::new(s.as_str()),
            Some(other) => {
                return Err(ProtocolError::invalid_field(
                    id_field,
                    format!("expected string, got {}", json_kind(other)),
                ));
            }
        };

        Ok(Self {
            id,
            payload: record,
        })
    }

    /// Get the event identifier
    #[inline]
    pub fn id(&self) -> &EventId {
        &self.id
    }

    /// Get the event payload
    #[inline]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Consume the event, returning its parts
    #[inline]
    pub fn into_parts(self) -> (EventId, Value) {
        (self.id, self.payload)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
