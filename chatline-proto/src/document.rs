//! Lenient decoding of backend message documents.
//!
//! The backend stores messages as loosely typed JSON documents with
//! camelCase keys:
//!
//! ```json
//! {"messageId": "m1", "userId": "alice", "text": "hi",
//!  "timestamp": 1710201600000, "status": "SENT"}
//! ```
//!
//! Only `messageId` is mandatory. A timestamp that is missing, negative,
//! out of calendar range or not a number decodes to [`Timestamp::EPOCH`];
//! an unknown status decodes to [`MessageStatus::Sent`].
//!
//! A snapshot payload groups documents by change kind:
//!
//! ```json
//! {"added": [..], "modified": [..], "removed": ["m7", {"messageId": "m8"}]}
//! ```

use serde_json::Value;

use crate::change::ChangeBatch;
use crate::message::{Message, MessageId, MessageStatus, Timestamp, UserId};

/// Latest accepted timestamp: 9999-12-31T23:59:59.999Z.
pub const MAX_TIMESTAMP_MILLIS: i64 = 253_402_300_799_999;

/// Errors that can occur while decoding backend documents.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The payload is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload or document is not a JSON object.
    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The document has no usable `messageId`.
    #[error("document has no messageId")]
    MissingId,
}

/// A decoded snapshot payload plus the documents that had to be skipped.
#[derive(Debug, Default)]
pub struct DecodedBatch {
    /// The changes that decoded successfully.
    pub batch: ChangeBatch,
    /// One error per skipped document.
    pub rejected: Vec<DocumentError>,
}

/// Decodes a single message document.
///
/// # Errors
///
/// Returns [`DocumentError::NotAnObject`] if `value` is not a JSON object,
/// or [`DocumentError::MissingId`] if `messageId` is absent or empty.
pub fn decode_message(value: &Value) -> Result<Message, DocumentError> {
    let Value::Object(fields) = value else {
        return Err(DocumentError::NotAnObject(kind_of(value)));
    };

    let message_id = message_id_of(value).ok_or(DocumentError::MissingId)?;
    let user_id = fields.get("userId").and_then(Value::as_str).unwrap_or_default();
    let text = fields.get("text").and_then(Value::as_str).unwrap_or_default();
    let timestamp = fields
        .get("timestamp")
        .map_or(Timestamp::EPOCH, lenient_timestamp);
    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(MessageStatus::parse)
        .unwrap_or_default();

    Ok(Message {
        message_id,
        user_id: UserId::new(user_id),
        text: text.to_string(),
        timestamp,
        status,
    })
}

/// Decodes a snapshot payload into a [`ChangeBatch`].
///
/// Every key is optional. Documents that fail to decode are skipped and
/// reported in [`DecodedBatch::rejected`]; `removed` entries may be bare id
/// strings or documents carrying a `messageId`.
///
/// # Errors
///
/// Returns [`DocumentError::Json`] if `json` does not parse, or
/// [`DocumentError::NotAnObject`] if the payload is not a JSON object.
pub fn decode_batch(json: &str) -> Result<DecodedBatch, DocumentError> {
    let payload: Value = serde_json::from_str(json)?;
    let Value::Object(ref fields) = payload else {
        return Err(DocumentError::NotAnObject(kind_of(&payload)));
    };

    let mut decoded = DecodedBatch::default();

    for doc in documents(fields.get("added")) {
        match decode_message(doc) {
            Ok(message) => decoded.batch.added.push(message),
            Err(err) => decoded.rejected.push(err),
        }
    }
    for doc in documents(fields.get("modified")) {
        match decode_message(doc) {
            Ok(message) => decoded.batch.updated.push(message),
            Err(err) => decoded.rejected.push(err),
        }
    }
    for entry in documents(fields.get("removed")) {
        match message_id_of(entry) {
            Some(id) => decoded.batch.removed_ids.push(id),
            None => decoded.rejected.push(DocumentError::MissingId),
        }
    }

    Ok(decoded)
}

/// Interprets a timestamp field, falling back to the epoch.
///
/// Accepts integer or fractional milliseconds, numeric strings, and
/// `{"seconds": s, "nanoseconds": n}` objects.
#[must_use]
pub fn lenient_timestamp(value: &Value) -> Timestamp {
    let millis = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(float_millis)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(float_millis))
        }
        Value::Object(fields) => {
            let seconds = fields.get("seconds").and_then(Value::as_i64);
            let nanos = fields
                .get("nanoseconds")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            seconds.and_then(|s| s.checked_mul(1000)?.checked_add(nanos / 1_000_000))
        }
        _ => None,
    };

    millis
        .filter(|ms| (0..=MAX_TIMESTAMP_MILLIS).contains(ms))
        .map_or(Timestamp::EPOCH, Timestamp::from_millis)
}

#[allow(clippy::cast_possible_truncation)]
fn float_millis(f: f64) -> Option<i64> {
    // `as` saturates, so NaN becomes 0 and infinities hit the range check.
    f.is_finite().then_some(f.trunc() as i64)
}

fn message_id_of(value: &Value) -> Option<MessageId> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(fields) => fields.get("messageId")?.as_str()?,
        _ => return None,
    };
    (!raw.is_empty()).then(|| MessageId::new(raw))
}

fn documents(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .into_iter()
        .flat_map(|docs| docs.iter())
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
