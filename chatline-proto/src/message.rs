//! Message model shared by the `Chatline` reconciler and its feeds.
//!
//! A [`Message`] mirrors one message document held by the chat backend.
//! Identity is the opaque [`MessageId`]; every lookup for update or removal
//! goes through it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque, stable identifier of a message document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    /// Wraps an identifier assigned by the backend.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a fresh time-ordered identifier (UUID v7).
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies the author of a message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wraps a user identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Millisecond-precision UTC timestamp.
///
/// Values the backend delivers in a malformed shape are collapsed to
/// [`Timestamp::EPOCH`], so they sort before every real message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    /// The UNIX epoch, used as the fallback for unusable timestamps.
    pub const EPOCH: Self = Self(0);

    /// Creates a timestamp for the current instant.
    #[must_use]
    pub fn now() -> Self {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Self(i64::try_from(millis).unwrap_or(i64::MAX))
    }

    /// Creates a timestamp from milliseconds since the UNIX epoch.
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as milliseconds since the UNIX epoch.
    #[must_use]
    pub const fn as_millis(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Delivery state of a message as recorded by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    /// Written to the backend.
    #[default]
    Sent,
    /// Received by the other participant's device.
    Delivered,
    /// Seen by the other participant.
    Read,
}

impl MessageStatus {
    /// Parses a backend status string, ignoring ASCII case.
    ///
    /// Returns `None` for anything other than `SENT`, `DELIVERED` or `READ`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.eq_ignore_ascii_case("sent") {
            Some(Self::Sent)
        } else if raw.eq_ignore_ascii_case("delivered") {
            Some(Self::Delivered)
        } else if raw.eq_ignore_ascii_case("read") {
            Some(Self::Read)
        } else {
            None
        }
    }
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Stable identity of the message document.
    pub message_id: MessageId,
    /// Who wrote the message.
    pub user_id: UserId,
    /// Message body.
    pub text: String,
    /// When the message was written.
    pub timestamp: Timestamp,
    /// Current delivery state.
    pub status: MessageStatus,
}

impl Message {
    /// Creates a message in the [`MessageStatus::Sent`] state.
    pub fn new(
        message_id: MessageId,
        user_id: UserId,
        text: impl Into<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            message_id,
            user_id,
            text: text.into(),
            timestamp,
            status: MessageStatus::Sent,
        }
    }

    /// Returns this message with a different status.
    #[must_use]
    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = status;
        self
    }
}
