//! Application message and frame codec.
//!
//! Outbound frames carry one JSON object whose `type` field names the
//! message kind:
//!
//! ```json
//! { "type": "chat.delta", "sessionId": "abc", "text": "hello" }
//! ```
//!
//! Inbound frames only have to be valid JSON. Whatever the peer sent is kept
//! as-is, so a frame without `type`, or one that is not an object at all,
//! still reaches the caller.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

// ============================================================================
// Constants
// ============================================================================

/// Name of the field that carries the message kind.
pub const TYPE_FIELD: &str = "type";

// ============================================================================
// Message
// ============================================================================

/// A single application-level message.
///
/// Wraps the JSON value of one frame. Messages built with [`Message::new`]
/// are objects with a string `type`; decoded messages are whatever JSON the
/// peer sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    /// Creates a message of the given kind with no further fields.
    #[inline]
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(TYPE_FIELD.to_string(), Value::String(kind.into()));
        Self(Value::Object(fields))
    }

    /// Wraps an arbitrary JSON value.
    #[inline]
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Adds a field and returns the message.
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field, returning the previous value if any.
    ///
    /// Has no effect if the message is not a JSON object.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0
            .as_object_mut()
            .and_then(|fields| fields.insert(key.into(), value.into()))
    }

    /// Returns the `type` field if it is a string.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.get_str(TYPE_FIELD)
    }

    /// Returns `true` if the message is of the given kind.
    #[inline]
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind() == Some(kind)
    }

    /// Returns a field of an object message.
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|fields| fields.get(key))
    }

    /// Returns a string field.
    #[inline]
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Returns the fields if the message is a JSON object.
    ///
    /// Keys come back sorted, not in wire order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// Returns the underlying JSON value.
    #[inline]
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the message, returning the JSON value.
    #[inline]
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Deserializes the message into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the message does not
    /// match `T`.
    pub fn parse<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(T::deserialize(&self.0)?)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// ============================================================================
// Frame Codec
// ============================================================================

/// Encodes a value as one text frame.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the value cannot be
/// serialized, for example a map with non-string keys.
pub fn encode_frame<T: Serialize + ?Sized>(message: &T) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Decodes one text frame into a [`Message`].
///
/// Any valid JSON is accepted and kept unchanged.
///
/// # Errors
///
/// Returns [`Error::Json`](crate::Error::Json) if the frame is not valid JSON.
pub fn decode_frame(text: &str) -> Result<Message> {
    Ok(Message(serde_json::from_str(text)?))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    use crate::error::Error;

    #[test]
    fn test_encode_includes_type_and_fields() {
        let message = Message::new("chat.send").with("text", "hi").with("n", 3);
        let frame = encode_frame(&message).expect("encode");
        let value: Value = serde_json::from_str(&frame).expect("valid json");
        assert_eq!(value, json!({"type": "chat.send", "text": "hi", "n": 3}));
    }

    #[test]
    fn test_decode_keeps_extra_fields() {
        let message = assert_ok!(decode_frame(r#"{"type":"pong","seq":4,"meta":{"a":true}}"#));
        assert_eq!(message.kind(), Some("pong"));
        assert!(message.is("pong"));
        assert_eq!(message.get("seq"), Some(&json!(4)));
        assert_eq!(message.get("meta"), Some(&json!({"a": true})));
    }

    #[test]
    fn test_decode_rejects_non_json() {
        let err = assert_err!(decode_frame("not json"));
        assert!(matches!(err, Error::Json(_)));
        assert!(decode_frame("").is_err());
        assert!(decode_frame(r#"{"type":"x""#).is_err());
    }

    #[test]
    fn test_decode_accepts_any_json_shape() {
        let cases = [
            ("[1,2]", json!([1, 2])),
            (r#"{"kind":"x"}"#, json!({"kind": "x"})),
            (r#"{"type":5}"#, json!({"type": 5})),
            ("null", Value::Null),
            ("\"text\"", json!("text")),
        ];

        for (frame, expected) in cases {
            let message = assert_ok!(decode_frame(frame));
            assert_eq!(message.as_value(), &expected, "frame {frame}");
            assert_eq!(message.kind(), None, "frame {frame}");
        }
    }

    #[test]
    fn test_insert_on_non_object_is_ignored() {
        let mut message = Message::from_value(json!([1]));
        assert_eq!(message.insert("a", 1), None);
        assert_eq!(message.into_value(), json!([1]));

        let mut message = Message::new("a");
        assert_eq!(message.insert("type", "b"), Some(json!("a")));
        assert_eq!(message.kind(), Some("b"));
    }

    #[test]
    fn test_encode_failure_is_json_error() {
        use std::collections::BTreeMap;

        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], "value");
        let err = encode_frame(&bad).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_display_is_json_text() {
        let message = Message::new("ping").with("seq", 1);
        let text = message.to_string();
        assert_eq!(assert_ok!(decode_frame(&text)), message);
    }

    #[test]
    fn test_parse_into_typed() {
        #[derive(Deserialize)]
        struct Delta {
            #[serde(rename = "type")]
            kind: String,
            text: String,
        }

        let message = Message::new("delta").with("text", "abc");
        let delta: Delta = message.parse().expect("parse");
        assert_eq!(delta.kind, "delta");
        assert_eq!(delta.text, "abc");
    }
}
