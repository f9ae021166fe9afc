//! Change feeds: the in-process stand-in for the backend snapshot listener.
//!
//! Defines the [`ChangeFeed`] trait every feed implements, plus
//! [`spawn_feed`] which drives a feed on a background tokio task.
//! Concrete feeds:
//! - [`json_lines::JsonLinesFeed`]: snapshot payloads read line by line
//! - [`scripted::ScriptedFeed`]: a fixed queue of batches, for tests
//! - [`demo::DemoFeed`]: a simulated two-party conversation
//!
//! # Architecture
//!
//! ```text
//! feed task  ─── FeedEvent ──→  UI loop (single writer of ChatSession)
//! ```
//!
//! Dropping the receiver returned by [`spawn_feed`] ends the task, which is
//! how the chat screen unsubscribes on teardown.

pub mod demo;
pub mod json_lines;
pub mod scripted;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use chatline_proto::change::ChangeBatch;
use chatline_proto::document::DocumentError;

/// Errors a feed can report.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// Reading the underlying source failed.
    #[error("feed I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// One delivery could not be decoded.
    #[error("undecodable snapshot on line {line}: {source}")]
    Decode {
        /// 1-based line number of the payload.
        line: usize,
        /// What was wrong with it.
        source: DocumentError,
    },
}

impl FeedError {
    /// Whether the feed can keep delivering after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }
}

/// Events forwarded from a running feed.
#[derive(Debug)]
pub enum FeedEvent {
    /// A change batch to apply.
    Batch(ChangeBatch),
    /// The feed hit an error; the message is suitable for display.
    Error(String),
    /// The feed ended; no more events follow.
    Closed,
}

/// A source of change batches for one chat room.
pub trait ChangeFeed: Send {
    /// Waits for the next delivery.
    ///
    /// Returns `Ok(None)` once the subscription has ended.
    fn next_batch(
        &mut self,
    ) -> impl std::future::Future<Output = Result<Option<ChangeBatch>, FeedError>> + Send;
}

/// Runs `feed` on a background task and forwards its deliveries.
///
/// The channel holds up to `capacity` undelivered events. Recoverable
/// errors are forwarded and the feed keeps going; any other error is
/// forwarded and followed by [`FeedEvent::Closed`].
pub fn spawn_feed<F>(mut feed: F, capacity: usize) -> (mpsc::Receiver<FeedEvent>, JoinHandle<()>)
where
    F: ChangeFeed + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));

    let handle = tokio::spawn(async move {
        loop {
            let (event, keep_going) = match feed.next_batch().await {
                Ok(Some(batch)) => (FeedEvent::Batch(batch), true),
                Ok(None) => {
                    tracing::info!("change feed ended");
                    (FeedEvent::Closed, false)
                }
                Err(err) if err.is_recoverable() => {
                    tracing::warn!(error = %err, "skipping bad delivery");
                    (FeedEvent::Error(err.to_string()), true)
                }
                Err(err) => {
                    tracing::error!(error = %err, "change feed failed");
                    if tx.send(FeedEvent::Error(err.to_string())).await.is_err() {
                        break;
                    }
                    (FeedEvent::Closed, false)
                }
            };

            if tx.send(event).await.is_err() {
                tracing::debug!("feed receiver dropped, unsubscribing");
                break;
            }
            if !keep_going {
                break;
            }
        }
    });

    (rx, handle)
}
