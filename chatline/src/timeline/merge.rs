//! Pure reconciliation of listener change batches into a timeline.
//!
//! [`apply_changes`] is a reducer over `(current items, batch) -> items`.
//! It never fails and never performs I/O, so callers may run it on any
//! thread as long as batches are applied one at a time.

use std::collections::{HashMap, HashSet};

use chrono::TimeZone;

use chatline_proto::change::ChangeBatch;
use chatline_proto::message::{Message, MessageId};

use super::ChatItem;
use super::day::{DayLabeler, with_separators};

/// Applies one change batch to the current timeline items.
///
/// Steps, in order:
/// 1. Keep the messages of `current`; separators are dropped and rebuilt.
/// 2. Drop every message whose id is in `removed_ids`.
/// 3. Replace updated messages in place. Updates for unknown ids are ignored.
/// 4. Upsert added messages: a known id is replaced in place, new ids are
///    prepended in delivery order. Repeated ids within `added` keep the
///    first occurrence.
/// 5. Stable-sort by timestamp and regenerate date separators.
///
/// The result is chronological ascending and re-applying the same batch
/// leaves it unchanged.
pub fn apply_changes<Tz: TimeZone>(
    current: &[ChatItem],
    batch: &ChangeBatch,
    labeler: &DayLabeler<Tz>,
) -> Vec<ChatItem> {
    let removed: HashSet<&MessageId> = batch.removed_ids.iter().collect();
    let mut seen = HashSet::new();
    let mut messages: Vec<Message> = current
        .iter()
        .filter_map(ChatItem::as_message)
        .filter(|m| !removed.contains(&m.message_id) && seen.insert(&m.message_id))
        .cloned()
        .collect();

    let positions: HashMap<MessageId, usize> = messages
        .iter()
        .enumerate()
        .map(|(idx, m)| (m.message_id.clone(), idx))
        .collect();

    for update in &batch.updated {
        if let Some(&idx) = positions.get(&update.message_id) {
            messages[idx] = update.clone();
        }
    }

    let mut fresh = Vec::with_capacity(batch.added.len());
    let mut fresh_ids = HashSet::new();
    for added in &batch.added {
        if let Some(&idx) = positions.get(&added.message_id) {
            messages[idx] = added.clone();
        } else if fresh_ids.insert(&added.message_id) {
            fresh.push(added.clone());
        }
    }

    fresh.append(&mut messages);
    fresh.sort_by_key(|m| m.timestamp);

    with_separators(fresh, labeler)
}
