//! State container for one open chat room.
//!
//! A [`ChatSession`] owns the reconciled [`Timeline`] and the
//! [`UnreadTracker`] of a room and is the single writer for both. Feeds
//! deliver batches to whoever owns the session (the UI loop in the
//! binary), which applies them one at a time with [`ChatSession::apply`].
//! Dropping the session discards all local state.

use std::collections::HashSet;

use chrono::{Local, TimeZone};

use chatline_proto::change::ChangeBatch;
use chatline_proto::chat_id::ChatId;
use chatline_proto::message::{Message, MessageId};

use crate::timeline::{DayLabeler, Timeline};
use crate::unread::UnreadTracker;

/// Default scroll offset beyond which new messages count as unread.
pub const DEFAULT_SCROLL_THRESHOLD: usize = 2;

/// Summary of what one [`ChatSession::apply`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    /// New messages the batch added.
    pub added: usize,
    /// Messages the batch updated, including redelivered ones.
    pub updated: usize,
    /// Ids the batch removed.
    pub removed: usize,
    /// Added messages that became unread.
    pub newly_unread: usize,
    /// Unread count after the batch.
    pub unread: usize,
}

/// Timeline, unread set and scroll position of one chat room.
#[derive(Debug)]
pub struct ChatSession<Tz: TimeZone = Local> {
    chat_id: ChatId,
    timeline: Timeline,
    unread: UnreadTracker,
    labeler: DayLabeler<Tz>,
    scroll_offset: usize,
    scroll_threshold: usize,
}

impl<Tz: TimeZone> ChatSession<Tz> {
    /// Opens an empty session for `chat_id`.
    pub fn new(chat_id: ChatId, labeler: DayLabeler<Tz>, scroll_threshold: usize) -> Self {
        tracing::debug!(chat_id = %chat_id, scroll_threshold, "chat session opened");
        Self {
            chat_id,
            timeline: Timeline::new(),
            unread: UnreadTracker::new(),
            labeler,
            scroll_offset: 0,
            scroll_threshold,
        }
    }

    /// Applies a listener batch to the timeline and the unread set.
    ///
    /// Added messages the timeline does not hold yet are tracked as unread
    /// against the current scroll offset. Added messages it already holds
    /// are redeliveries and only refresh their unread copy, like updates.
    /// Removed messages leave the unread set.
    pub fn apply(&mut self, batch: &ChangeBatch) -> SessionUpdate {
        let (known, fresh) = self.split_added(batch);
        self.timeline.apply(batch, &self.labeler);

        self.unread.forget(&batch.removed_ids);
        self.unread.refresh(&batch.updated);
        let newly_unread = self.unread.track(
            fresh.iter().copied(),
            self.scroll_offset,
            self.scroll_threshold,
        );
        self.unread.refresh(known.iter().copied());

        let update = SessionUpdate {
            added: fresh.len(),
            updated: batch.updated.len() + known.len(),
            removed: batch.removed_ids.len(),
            newly_unread,
            unread: self.unread.count(),
        };
        tracing::debug!(
            chat_id = %self.chat_id,
            added = update.added,
            updated = update.updated,
            removed = update.removed,
            unread = update.unread,
            items = self.timeline.len(),
            "applied change batch"
        );
        update
    }

    /// Splits `batch.added` into redeliveries of ids the timeline keeps
    /// through the batch's removals, and the first copy of each new id.
    fn split_added<'b>(&self, batch: &'b ChangeBatch) -> (Vec<&'b Message>, Vec<&'b Message>) {
        let removed: HashSet<&MessageId> = batch.removed_ids.iter().collect();
        let existing: HashSet<&MessageId> = self
            .timeline
            .messages()
            .map(|m| &m.message_id)
            .filter(|id| !removed.contains(id))
            .collect();

        let mut seen = HashSet::new();
        let mut known = Vec::new();
        let mut fresh = Vec::new();
        for message in &batch.added {
            if existing.contains(&message.message_id) {
                known.push(message);
            } else if seen.insert(&message.message_id) {
                fresh.push(message);
            }
        }
        (known, fresh)
    }

    /// Records the reader's scroll offset (items from the newest one).
    ///
    /// Returning to offset `0` means the reader is back at the bottom, which
    /// clears the unread set.
    pub fn set_scroll_offset(&mut self, offset: usize) {
        self.scroll_offset = offset;
        if offset == 0 && !self.unread.is_empty() {
            tracing::trace!(chat_id = %self.chat_id, "scrolled to bottom, clearing unread");
            self.unread.reset();
        }
    }

    /// Marks messages that entered the viewport as seen.
    ///
    /// Returns how many of them were unread.
    pub fn mark_visible<'a>(&mut self, ids: impl IntoIterator<Item = &'a MessageId>) -> usize {
        ids.into_iter()
            .map(|id| self.unread.dismiss(id))
            .filter(|&dismissed| dismissed)
            .count()
    }

    /// The room this session shows.
    pub const fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    /// The reconciled timeline.
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// The unread set.
    pub const fn unread(&self) -> &UnreadTracker {
        &self.unread
    }

    /// Number of unread messages.
    pub fn unread_count(&self) -> usize {
        self.unread.count()
    }

    /// Current scroll offset.
    pub const fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Offset beyond which incoming messages count as unread.
    pub const fn scroll_threshold(&self) -> usize {
        self.scroll_threshold
    }

    /// Labeler used for date separators.
    pub const fn labeler(&self) -> &DayLabeler<Tz> {
        &self.labeler
    }
}
