//! Chat timeline: ordered messages interleaved with date separators.
//!
//! The backend listener is the only source of truth. A [`Timeline`] is a
//! cache rebuilt from each change batch through the pure reducer
//! [`apply_changes`], and is thrown away when the chat is closed.
//!
//! Items are kept chronological ascending. Presentation layers that show
//! the newest message at the bottom of a reversed list use
//! [`Timeline::rendered`].

pub mod day;
pub mod merge;

pub use day::{DEFAULT_DATE_FORMAT, DayLabeler, with_separators};
pub use merge::apply_changes;

use chrono::{NaiveDate, TimeZone};

use chatline_proto::change::ChangeBatch;
use chatline_proto::message::{Message, MessageId};

/// One renderable row of the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatItem {
    /// A chat message.
    Message(Message),
    /// Marks the start of a calendar day.
    DateSeparator {
        /// The calendar day that starts here.
        day: NaiveDate,
        /// Formatted label, e.g. "12 Mar 2024".
        label: String,
    },
}

impl ChatItem {
    /// Returns the message if this item is one.
    #[must_use]
    pub const fn as_message(&self) -> Option<&Message> {
        match self {
            Self::Message(message) => Some(message),
            Self::DateSeparator { .. } => None,
        }
    }

    /// Returns `true` for date separators.
    #[must_use]
    pub const fn is_separator(&self) -> bool {
        matches!(self, Self::DateSeparator { .. })
    }
}

/// The reconciled timeline of one chat room.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    items: Vec<ChatItem>,
}

impl Timeline {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a change batch; see [`apply_changes`].
    pub fn apply<Tz: TimeZone>(&mut self, batch: &ChangeBatch, labeler: &DayLabeler<Tz>) {
        self.items = apply_changes(&self.items, batch, labeler);
    }

    /// All items, oldest first.
    #[must_use]
    pub fn items(&self) -> &[ChatItem] {
        &self.items
    }

    /// All items, newest first.
    pub fn rendered(&self) -> impl DoubleEndedIterator<Item = &ChatItem> + ExactSizeIterator {
        self.items.iter().rev()
    }

    /// Messages only, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.items.iter().filter_map(ChatItem::as_message)
    }

    /// Number of messages, separators excluded.
    #[must_use]
    pub fn message_count(&self) -> usize {
        self.messages().count()
    }

    /// Number of items, separators included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the timeline holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Looks up a message by id.
    #[must_use]
    pub fn find(&self, id: &MessageId) -> Option<&Message> {
        self.messages().find(|m| &m.message_id == id)
    }
}

/// Checks the timeline invariant for `items`.
///
/// Messages must be sorted by timestamp. A separator must precede the first
/// message of every calendar day (per `labeler`) and appear nowhere else,
/// which also rules out adjacent separators and trailing ones.
pub fn is_well_formed<Tz: TimeZone>(items: &[ChatItem], labeler: &DayLabeler<Tz>) -> bool {
    let mut open_day: Option<NaiveDate> = None;
    let mut separator_pending = false;
    let mut last_timestamp = None;

    for item in items {
        match item {
            ChatItem::DateSeparator { day, .. } => {
                if separator_pending || open_day.is_some_and(|open| open == *day) {
                    return false;
                }
                open_day = Some(*day);
                separator_pending = true;
            }
            ChatItem::Message(message) => {
                if open_day != Some(labeler.day_of(message.timestamp)) {
                    return false;
                }
                if last_timestamp.is_some_and(|last| last > message.timestamp) {
                    return false;
                }
                last_timestamp = Some(message.timestamp);
                separator_pending = false;
            }
        }
    }

    !separator_pending
}
