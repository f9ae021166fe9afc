//! Integration tests for the feed → session pipeline.
//!
//! Drives scripted listener deliveries through `spawn_feed` into a
//! `ChatSession` and the TUI `App`, the way the binary's event loop does:
//!
//! 1. Batches arrive in order and fold into a well-formed timeline.
//! 2. Messages arriving while scrolled away are unread until the reader
//!    sees them or jumps back to the bottom.
//! 3. A fatal feed error closes the subscription after being reported.

use chatline::app::{App, FeedStatus};
use chatline::feed::scripted::ScriptedFeed;
use chatline::feed::{FeedError, FeedEvent, spawn_feed};
use chatline::session::ChatSession;
use chatline::timeline::{ChatItem, DEFAULT_DATE_FORMAT, DayLabeler, is_well_formed};
use chatline_proto::change::ChangeBatch;
use chatline_proto::chat_id::ChatId;
use chatline_proto::message::{Message, MessageId, MessageStatus, Timestamp, UserId};
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 2024-03-11T10:00:00Z
const MAR_11: i64 = 1_710_151_200_000;
const MINUTE: i64 = 60_000;
const DAY: i64 = 86_400_000;

fn session() -> ChatSession<Utc> {
    ChatSession::new(
        ChatId::between(&UserId::new("alice"), &UserId::new("bob")),
        DayLabeler::new(Utc, DEFAULT_DATE_FORMAT),
        2,
    )
}

fn msg(id: &str, from: &str, at: i64) -> Message {
    Message::new(
        MessageId::new(id),
        UserId::new(from),
        format!("text of {id}"),
        Timestamp::from_millis(at),
    )
}

/// Listener history: newest first, spanning two days.
fn history() -> ChangeBatch {
    ChangeBatch::new()
        .with_added(msg("h4", "bob", MAR_11 + DAY + 2 * MINUTE))
        .with_added(msg("h3", "alice", MAR_11 + DAY + MINUTE))
        .with_added(msg("h2", "bob", MAR_11 + 2 * MINUTE))
        .with_added(msg("h1", "alice", MAR_11 + MINUTE))
        .with_added(msg("h0", "bob", MAR_11))
}

/// Collect events until the feed reports `Closed`.
async fn collect(mut rx: mpsc::Receiver<FeedEvent>) -> Vec<FeedEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let closed = matches!(event, FeedEvent::Closed);
        events.push(event);
        if closed {
            break;
        }
    }
    events
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn scripted_deliveries_build_the_timeline() {
    let feed = ScriptedFeed::new([
        history(),
        ChangeBatch::new().with_updated(msg("h3", "alice", MAR_11 + DAY + MINUTE).with_status(MessageStatus::Read)),
        ChangeBatch::new().with_removed(MessageId::new("h0")),
        ChangeBatch::new().with_added(msg("n0", "bob", MAR_11 + DAY + 3 * MINUTE)),
    ]);
    let (rx, handle) = spawn_feed(feed, 8);
    let events = collect(rx).await;
    handle.await.unwrap();

    let mut session = session();
    for event in events {
        if let FeedEvent::Batch(batch) = event {
            session.apply(&batch);
        }
    }

    let items = session.timeline().items();
    assert!(is_well_formed(items, session.labeler()));

    let labels: Vec<&str> = items
        .iter()
        .filter_map(|item| match item {
            ChatItem::DateSeparator { label, .. } => Some(label.as_str()),
            ChatItem::Message(_) => None,
        })
        .collect();
    assert_eq!(labels, ["11 Mar 2024", "12 Mar 2024"]);

    let ids: Vec<&str> = session
        .timeline()
        .messages()
        .map(|m| m.message_id.as_str())
        .collect();
    assert_eq!(ids, ["h1", "h2", "h3", "h4", "n0"]);

    let h3 = session.timeline().find(&MessageId::new("h3")).unwrap();
    assert_eq!(h3.status, MessageStatus::Read);
}

#[tokio::test]
async fn unread_flow_through_the_app() {
    let (tx, mut rx) = mpsc::channel(8);
    let mut app = App::new(session(), UserId::new("alice"), "%H:%M");
    app.set_viewport_rows(3);

    tx.send(FeedEvent::Batch(history())).await.unwrap();
    app.apply_feed_event(rx.recv().await.unwrap());
    assert_eq!(app.feed_status(), &FeedStatus::Live);

    // Scroll to the oldest messages, past the unread threshold.
    for _ in 0..5 {
        app.handle_key_event(key(KeyCode::Up));
    }
    assert_eq!(app.session().scroll_offset(), 5);

    tx.send(FeedEvent::Batch(
        ChangeBatch::new()
            .with_added(msg("n1", "bob", MAR_11 + DAY + 4 * MINUTE))
            .with_added(msg("n0", "bob", MAR_11 + DAY + 3 * MINUTE)),
    ))
    .await
    .unwrap();
    app.apply_feed_event(rx.recv().await.unwrap());
    assert_eq!(app.session().unread_count(), 2);

    // A status change keeps the message unread.
    tx.send(FeedEvent::Batch(ChangeBatch::new().with_updated(
        msg("n0", "bob", MAR_11 + DAY + 3 * MINUTE).with_status(MessageStatus::Delivered),
    )))
    .await
    .unwrap();
    app.apply_feed_event(rx.recv().await.unwrap());
    assert_eq!(app.session().unread_count(), 2);

    // A deleted unread message no longer counts.
    tx.send(FeedEvent::Batch(
        ChangeBatch::new().with_removed(MessageId::new("n1")),
    ))
    .await
    .unwrap();
    app.apply_feed_event(rx.recv().await.unwrap());
    assert_eq!(app.session().unread_count(), 1);

    app.handle_key_event(key(KeyCode::End));
    assert_eq!(app.session().scroll_offset(), 0);
    assert_eq!(app.session().unread_count(), 0);
}

#[tokio::test]
async fn messages_at_the_bottom_are_never_unread() {
    let feed = ScriptedFeed::new([
        history(),
        ChangeBatch::new().with_added(msg("n0", "bob", MAR_11 + DAY + 3 * MINUTE)),
    ]);
    let (rx, _handle) = spawn_feed(feed, 8);

    let mut app = App::new(session(), UserId::new("alice"), "%H:%M");
    app.set_viewport_rows(10);
    for event in collect(rx).await {
        app.apply_feed_event(event);
    }

    assert_eq!(app.session().unread_count(), 0);
    assert_eq!(app.feed_status(), &FeedStatus::Closed);
    assert_eq!(app.session().timeline().message_count(), 6);
}

#[tokio::test]
async fn fatal_error_is_reported_then_feed_closes() {
    let mut feed = ScriptedFeed::new([history()]);
    feed.push_error(FeedError::Io(std::io::Error::other("listener detached")));
    feed.push_batch(ChangeBatch::new().with_added(msg("late", "bob", MAR_11)));
    let (rx, handle) = spawn_feed(feed, 8);

    let mut app = App::new(session(), UserId::new("alice"), "%H:%M");
    for event in collect(rx).await {
        app.apply_feed_event(event);
    }
    handle.await.unwrap();

    assert_eq!(app.feed_status(), &FeedStatus::Closed);
    assert!(app.last_error().unwrap().contains("listener detached"));
    assert!(app.session().timeline().find(&MessageId::new("late")).is_none());
    assert_eq!(app.session().timeline().message_count(), 5);
}
