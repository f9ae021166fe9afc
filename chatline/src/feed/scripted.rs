//! Scripted feed for testing.
//!
//! Replays a fixed queue of deliveries and then ends the subscription.

use std::collections::VecDeque;

use chatline_proto::change::ChangeBatch;

use super::{ChangeFeed, FeedError};

/// Feed that replays queued batches and errors in order.
#[derive(Debug, Default)]
pub struct ScriptedFeed {
    queue: VecDeque<Result<ChangeBatch, FeedError>>,
}

impl ScriptedFeed {
    /// Creates a feed that delivers `batches` in order.
    pub fn new(batches: impl IntoIterator<Item = ChangeBatch>) -> Self {
        Self {
            queue: batches.into_iter().map(Ok).collect(),
        }
    }

    /// Queues another batch.
    pub fn push_batch(&mut self, batch: ChangeBatch) {
        self.queue.push_back(Ok(batch));
    }

    /// Queues an error.
    pub fn push_error(&mut self, err: FeedError) {
        self.queue.push_back(Err(err));
    }

    /// Number of deliveries still queued.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl ChangeFeed for ScriptedFeed {
    async fn next_batch(&mut self) -> Result<Option<ChangeBatch>, FeedError> {
        self.queue.pop_front().transpose()
    }
}
