//! Symmetric chat room identifiers for two-party conversations.

use serde::{Deserialize, Serialize};

use crate::message::UserId;

/// Separator placed between the two user ids.
pub const SEPARATOR: char = '-';

/// Identifier of the room shared by exactly two users.
///
/// Both participants derive the same value regardless of who opens the
/// conversation: the lexicographically smaller id always comes first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(String);

impl ChatId {
    /// Derives the room identifier shared by `a` and `b`.
    #[must_use]
    pub fn between(a: &UserId, b: &UserId) -> Self {
        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Self(format!("{first}{SEPARATOR}{second}"))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
