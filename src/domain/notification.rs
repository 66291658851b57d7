//! Pub/Sub push envelopes carrying Cloud Storage object events.
//!
//! The loader is invoked with
//!
//! ```json
//! { "message": { "data": "<base64 of {\"bucket\": ..., \"name\": ...}>" } }
//! ```
//!
//! A request that is not a POSTed JSON object with `message.data` is an
//! invalid request (400). A `data` field that does not decode into a
//! storage event naming a bucket and an object is a malformed notification
//! (500), the same class as any downstream failure.

use std::collections::HashMap;
use std::fmt;

use axum::http::Method;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::EtlError;

/// Outer push request body.
///
/// Only `message` and `message.data` shape the outcome. The remaining
/// Pub/Sub fields are read best-effort: a value of an unexpected type is
/// dropped instead of failing the request.
#[derive(Debug, Clone, Deserialize)]
pub struct PushEnvelope {
    /// The wrapped Pub/Sub message.
    pub message: PushMessage,
    /// Subscription that delivered the message.
    #[serde(default, deserialize_with = "lenient_string")]
    pub subscription: Option<String>,
}

/// Pub/Sub message inside a push envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PushMessage {
    /// Base64-encoded event document. `None` only when the key is absent;
    /// an explicit `null` is `Some(Value::Null)`, so any present but
    /// non-string value is reported as a malformed notification.
    #[serde(default, deserialize_with = "present")]
    pub data: Option<Value>,
    /// Server-assigned message identifier.
    #[serde(default, rename = "messageId", deserialize_with = "lenient_string")]
    pub message_id: Option<String>,
    /// Publish timestamp (RFC 3339).
    #[serde(default, rename = "publishTime", deserialize_with = "lenient_string")]
    pub publish_time: Option<String>,
    /// Message attributes (`eventType`, `objectId`, ...).
    #[serde(default, deserialize_with = "lenient_attributes")]
    pub attributes: Option<HashMap<String, String>>,
}

/// Keeps a present key as `Some`, even when its value is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(scalar_to_string)
}

fn lenient_attributes<'de, D>(deserializer: D) -> Result<Option<HashMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Object(map) => Some(
            map.into_iter()
                .filter_map(|(k, v)| scalar_to_string(v).map(|v| (k, v)))
                .collect(),
        ),
        _ => None,
    })
}

/// Decoded Cloud Storage object event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEvent {
    /// Bucket holding the new object.
    pub bucket: String,
    /// Name of the new object.
    pub name: String,
    /// Content type reported by storage, when present.
    #[serde(default, rename = "contentType", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Location of one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    /// Bucket name.
    pub bucket: String,
    /// Object name.
    pub name: String,
}

impl ObjectRef {
    /// Creates an object reference.
    #[must_use]
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.name)
    }
}

impl StorageEvent {
    /// Wraps this event the way Pub/Sub push delivers it.
    #[must_use]
    pub fn to_push_body(&self) -> Value {
        let inner = serde_json::json!({
            "bucket": self.bucket,
            "name": self.name,
        });
        serde_json::json!({
            "message": { "data": STANDARD.encode(inner.to_string()) }
        })
    }
}

impl From<StorageEvent> for ObjectRef {
    fn from(event: StorageEvent) -> Self {
        Self {
            bucket: event.bucket,
            name: event.name,
        }
    }
}

impl PushEnvelope {
    /// Validates the HTTP shape of a push request and deserializes it.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::InvalidRequestFormat`] if the method is not
    /// POST, the content type is not JSON, the body is not a JSON object
    /// with a `message` object, or `message.data` is absent.
    pub fn from_request(
        method: &Method,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<Self, EtlError> {
        if method != Method::POST || !is_json_content_type(content_type) {
            return Err(EtlError::InvalidRequestFormat);
        }
        let envelope: Self =
            serde_json::from_slice(body).map_err(|_| EtlError::InvalidRequestFormat)?;
        if envelope.message.data.is_none() {
            return Err(EtlError::InvalidRequestFormat);
        }
        Ok(envelope)
    }

    /// Decodes `message.data` into the storage event it carries.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::InvalidRequestFormat`] if `data` is absent and
    /// [`EtlError::MalformedNotification`] if it is not a base64 string of
    /// a UTF-8 JSON document with string `bucket` and `name` fields.
    pub fn storage_event(&self) -> Result<StorageEvent, EtlError> {
        let data = self
            .message
            .data
            .as_ref()
            .ok_or(EtlError::InvalidRequestFormat)?;
        let encoded = data.as_str().ok_or_else(|| {
            EtlError::MalformedNotification("message.data is not a string".to_string())
        })?;
        let decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| EtlError::MalformedNotification(format!("invalid base64: {e}")))?;
        let text = String::from_utf8(decoded)
            .map_err(|e| EtlError::MalformedNotification(format!("invalid UTF-8: {e}")))?;
        serde_json::from_str(&text)
            .map_err(|e| EtlError::MalformedNotification(format!("invalid event document: {e}")))
    }
}

/// Accepts `application/json` and `application/*+json`, ignoring parameters.
fn is_json_content_type(content_type: Option<&str>) -> bool {
    let Some(value) = content_type else {
        return false;
    };
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence == "application/json"
        || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Parses a loader request into the object it refers to.
///
/// # Errors
///
/// See [`PushEnvelope::from_request`] and [`PushEnvelope::storage_event`].
pub fn parse_notification(
    method: &Method,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<(PushEnvelope, ObjectRef), EtlError> {
    let envelope = PushEnvelope::from_request(method, content_type, body)?;
    let object = envelope.storage_event()?.into();
    Ok((envelope, object))
}
