//! Incremental change batches as delivered by a snapshot listener.

use serde::{Deserialize, Serialize};

use crate::message::{Message, MessageId};

/// How a document changed between two listener snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// The document entered the listener's query scope.
    Added,
    /// The document's fields changed.
    Modified,
    /// The document left the query scope or was deleted.
    Removed,
}

/// A single tagged document change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange {
    /// What happened to the document.
    pub kind: ChangeKind,
    /// The document contents after the change (before it, for removals).
    pub message: Message,
}

/// One delivery from the listener, split by change kind.
///
/// Within each list the listener's order is kept: descending timestamp for
/// `added`, as the backend query sorts newest-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    /// Newly visible messages, newest first.
    pub added: Vec<Message>,
    /// Messages whose fields changed.
    pub updated: Vec<Message>,
    /// Ids of messages that went away.
    pub removed_ids: Vec<MessageId>,
}

impl ChangeBatch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Partitions tagged changes into a batch, keeping delivery order.
    pub fn from_changes(changes: impl IntoIterator<Item = DocumentChange>) -> Self {
        let mut batch = Self::new();
        for change in changes {
            match change.kind {
                ChangeKind::Added => batch.added.push(change.message),
                ChangeKind::Modified => batch.updated.push(change.message),
                ChangeKind::Removed => batch.removed_ids.push(change.message.message_id),
            }
        }
        batch
    }

    /// Adds a newly visible message.
    #[must_use]
    pub fn with_added(mut self, message: Message) -> Self {
        self.added.push(message);
        self
    }

    /// Adds a modified message.
    #[must_use]
    pub fn with_updated(mut self, message: Message) -> Self {
        self.updated.push(message);
        self
    }

    /// Adds the id of a removed message.
    #[must_use]
    pub fn with_removed(mut self, id: MessageId) -> Self {
        self.removed_ids.push(id);
        self
    }

    /// Returns `true` if the batch carries no changes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.updated.is_empty() && self.removed_ids.is_empty()
    }

    /// Total number of changes in the batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed_ids.len()
    }
}
