//! Unread bookkeeping relative to the reader's scroll position.
//!
//! While the reader is scrolled away from the newest message, incoming
//! messages pile up in an [`UnreadTracker`]. They leave it once they are
//! seen ([`UnreadTracker::dismiss`]) or when the reader jumps back to the
//! bottom ([`UnreadTracker::reset`]).

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chatline_proto::message::{Message, MessageId};

/// Set of messages that arrived while the reader was scrolled away.
#[derive(Debug, Clone, Default)]
pub struct UnreadTracker {
    unread: HashMap<MessageId, Message>,
}

impl UnreadTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `added` as unread if the reader is scrolled past `threshold`.
    ///
    /// `scroll_offset` is the index of the first visible item counted from
    /// the newest one, so `0` means the newest message is on screen.
    /// An id that is already unread keeps its stored copy, so the first
    /// occurrence wins as it does in the timeline. Returns how many
    /// messages became unread.
    pub fn track<'a>(
        &mut self,
        added: impl IntoIterator<Item = &'a Message>,
        scroll_offset: usize,
        threshold: usize,
    ) -> usize {
        if scroll_offset <= threshold {
            return 0;
        }
        let mut newly_unread = 0;
        for message in added {
            if let Entry::Vacant(slot) = self.unread.entry(message.message_id.clone()) {
                slot.insert(message.clone());
                newly_unread += 1;
            }
        }
        newly_unread
    }

    /// Marks one message as seen. Returns `true` if it was unread.
    pub fn dismiss(&mut self, id: &MessageId) -> bool {
        self.unread.remove(id).is_some()
    }

    /// Clears the set, e.g. when the reader scrolls back to the bottom.
    pub fn reset(&mut self) {
        self.unread.clear();
    }

    /// Drops messages that left the timeline.
    pub fn forget<'a>(&mut self, removed: impl IntoIterator<Item = &'a MessageId>) {
        for id in removed {
            self.unread.remove(id);
        }
    }

    /// Replaces unread copies of messages whose content changed.
    pub fn refresh<'a>(&mut self, updated: impl IntoIterator<Item = &'a Message>) {
        for message in updated {
            if let Some(slot) = self.unread.get_mut(&message.message_id) {
                slot.clone_from(message);
            }
        }
    }

    /// Number of unread messages.
    #[must_use]
    pub fn count(&self) -> usize {
        self.unread.len()
    }

    /// Returns `true` if nothing is unread.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.unread.is_empty()
    }

    /// Returns `true` if the message with `id` is unread.
    #[must_use]
    pub fn contains(&self, id: &MessageId) -> bool {
        self.unread.contains_key(id)
    }

    /// The unread message with `id`, if any.
    #[must_use]
    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.unread.get(id)
    }
}
