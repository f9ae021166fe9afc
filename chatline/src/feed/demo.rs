//! Simulated two-party conversation.
//!
//! The first delivery is a history spanning the last few days, newest
//! first, as a backend query ordered by descending timestamp would return
//! it. Afterwards the feed emits one change at a time: new messages from
//! either side, status upgrades of the local user's messages, edits and
//! deletions.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use chatline_proto::change::ChangeBatch;
use chatline_proto::message::{Message, MessageId, MessageStatus, Timestamp, UserId};

use super::{ChangeFeed, FeedError};

const PHRASES: &[&str] = &[
    "hey, are you around?",
    "just landed, will call later",
    "did you see the match last night?",
    "sounds good to me",
    "can you send me the address?",
    "running ten minutes late, sorry",
    "haha that's amazing",
    "let's do lunch tomorrow",
    "ok, on my way",
    "thanks!",
    "what time works for you?",
    "I pushed the fix, can you check?",
];

const HISTORY_DAYS: i64 = 3;
const HISTORY_PER_DAY: usize = 4;
const DAY_MS: i64 = 86_400_000;
const MAX_HISTORY_AGE_MS: i64 = 20 * 60 * 60 * 1000;

/// Feed that makes up a conversation between two users.
pub struct DemoFeed {
    local: UserId,
    remote: UserId,
    interval: Duration,
    rng: StdRng,
    live: Vec<Message>,
    started: bool,
}

impl DemoFeed {
    /// Creates a feed between `local` and `remote`, pausing up to
    /// `interval` between changes.
    #[must_use]
    pub fn new(local: UserId, remote: UserId, interval: Duration) -> Self {
        Self::with_rng(local, remote, interval, StdRng::from_os_rng())
    }

    /// Same as [`new`](Self::new) with a fixed seed, for reproducible runs.
    #[must_use]
    pub fn seeded(local: UserId, remote: UserId, interval: Duration, seed: u64) -> Self {
        Self::with_rng(local, remote, interval, StdRng::seed_from_u64(seed))
    }

    fn with_rng(local: UserId, remote: UserId, interval: Duration, rng: StdRng) -> Self {
        Self {
            local,
            remote,
            interval,
            rng,
            live: Vec::new(),
            started: false,
        }
    }

    /// Builds the initial history, newest first.
    fn history(&mut self, now: Timestamp) -> ChangeBatch {
        let mut added = Vec::new();
        for days_ago in (0..HISTORY_DAYS).rev() {
            let day_start = now.as_millis() - days_ago * DAY_MS;
            for _ in 0..HISTORY_PER_DAY {
                let age = self.rng.random_range(0..MAX_HISTORY_AGE_MS);
                let ts = Timestamp::from_millis((day_start - age).max(0));
                let mut message = self.compose(ts);
                message.status = if message.user_id == self.local {
                    MessageStatus::Read
                } else {
                    MessageStatus::Sent
                };
                added.push(message);
            }
        }
        added.sort_by_key(|m| std::cmp::Reverse(m.timestamp));
        self.live.clone_from(&added);
        ChangeBatch {
            added,
            ..ChangeBatch::default()
        }
    }

    /// Picks one random change to the live conversation.
    fn next_change(&mut self, now: Timestamp) -> ChangeBatch {
        let roll = self.rng.random_range(0..100);
        let batch = match roll {
            0..60 => None,
            60..80 => self.upgrade_status(),
            80..90 => self.edit(),
            _ => self.delete(),
        };
        batch.unwrap_or_else(|| {
            let message = self.compose(now);
            self.live.push(message.clone());
            ChangeBatch::new().with_added(message)
        })
    }

    fn compose(&mut self, timestamp: Timestamp) -> Message {
        let author = if self.rng.random_bool(0.5) {
            self.local.clone()
        } else {
            self.remote.clone()
        };
        let text = PHRASES.choose(&mut self.rng).copied().unwrap_or("...");
        Message::new(MessageId::generate(), author, text, timestamp)
    }

    fn upgrade_status(&mut self) -> Option<ChangeBatch> {
        let local = &self.local;
        let message = self
            .live
            .iter_mut()
            .filter(|m| &m.user_id == local && m.status != MessageStatus::Read)
            .min_by_key(|m| m.timestamp)?;
        message.status = match message.status {
            MessageStatus::Sent => MessageStatus::Delivered,
            MessageStatus::Delivered | MessageStatus::Read => MessageStatus::Read,
        };
        Some(ChangeBatch::new().with_updated(message.clone()))
    }

    fn edit(&mut self) -> Option<ChangeBatch> {
        let idx = self.random_live_index()?;
        let message = &mut self.live[idx];
        if !message.text.ends_with(" (edited)") {
            message.text.push_str(" (edited)");
        }
        Some(ChangeBatch::new().with_updated(message.clone()))
    }

    fn delete(&mut self) -> Option<ChangeBatch> {
        let idx = self.random_live_index()?;
        let message = self.live.swap_remove(idx);
        Some(ChangeBatch::new().with_removed(message.message_id))
    }

    fn random_live_index(&mut self) -> Option<usize> {
        (!self.live.is_empty()).then(|| self.rng.random_range(0..self.live.len()))
    }
}

impl ChangeFeed for DemoFeed {
    async fn next_batch(&mut self) -> Result<Option<ChangeBatch>, FeedError> {
        if !self.started {
            self.started = true;
            let batch = self.history(Timestamp::now());
            tracing::debug!(messages = batch.added.len(), "demo feed history");
            return Ok(Some(batch));
        }

        if !self.interval.is_zero() {
            let max_ms = u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX);
            let pause = self.rng.random_range(max_ms / 4..=max_ms);
            tokio::time::sleep(Duration::from_millis(pause)).await;
        }
        Ok(Some(self.next_change(Timestamp::now())))
    }
}
