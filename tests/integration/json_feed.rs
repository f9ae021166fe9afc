//! Integration tests for replaying recorded snapshot payloads.
//!
//! Writes JSON-lines files the way a recorded listener session looks and
//! replays them through `JsonLinesFeed` into a `ChatSession`:
//!
//! 1. Lenient documents (string, float and `{seconds, nanoseconds}`
//!    timestamps, unknown statuses) decode and sort correctly.
//! 2. Malformed timestamps fall back to the epoch and sort first.
//! 3. A corrupt line is reported and replay continues past it.

use std::path::PathBuf;

use chatline::feed::json_lines::JsonLinesFeed;
use chatline::feed::{FeedEvent, spawn_feed};
use chatline::session::ChatSession;
use chatline::timeline::{ChatItem, DEFAULT_DATE_FORMAT, DayLabeler, is_well_formed};
use chatline_proto::chat_id::ChatId;
use chatline_proto::message::{MessageId, MessageStatus, Timestamp, UserId};
use chrono::Utc;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// 2024-03-11T10:00:00Z
const MAR_11: i64 = 1_710_151_200_000;

fn session() -> ChatSession<Utc> {
    ChatSession::new(
        ChatId::between(&UserId::new("alice"), &UserId::new("bob")),
        DayLabeler::new(Utc, DEFAULT_DATE_FORMAT),
        2,
    )
}

/// Write `lines` to a fresh file under the temp dir.
async fn write_feed(name: &str, lines: &[String]) -> PathBuf {
    let dir = std::env::temp_dir().join("chatline-integ-json-feed");
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join(format!("{name}-{}.jsonl", std::process::id()));
    tokio::fs::write(&path, lines.join("\n")).await.unwrap();
    path
}

/// Replay the file at `path` into a fresh session, returning the session
/// and any reported feed errors.
async fn replay(path: &PathBuf) -> (ChatSession<Utc>, Vec<String>) {
    let feed = JsonLinesFeed::open(path).await.unwrap();
    let (mut rx, handle) = spawn_feed(feed, 4);

    let mut session = session();
    let mut errors = Vec::new();
    while let Some(event) = rx.recv().await {
        match event {
            FeedEvent::Batch(batch) => {
                session.apply(&batch);
            }
            FeedEvent::Error(msg) => errors.push(msg),
            FeedEvent::Closed => break,
        }
    }
    handle.await.unwrap();
    (session, errors)
}

fn ids(session: &ChatSession<Utc>) -> Vec<&str> {
    session
        .timeline()
        .messages()
        .map(|m| m.message_id.as_str())
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn lenient_documents_replay_in_order() {
    let lines = [
        json!({
            "added": [
                { "messageId": "c", "userId": "bob", "text": "third",
                  "timestamp": { "seconds": (MAR_11 / 1000) + 120, "nanoseconds": 500_000_000 } },
                { "messageId": "b", "userId": "alice", "text": "second",
                  "timestamp": format!("{}", MAR_11 + 60_000), "status": "delivered" },
                { "messageId": "a", "userId": "bob", "text": "first",
                  "timestamp": MAR_11 as f64 + 0.75, "status": "SEEN_BY_ALIEN" },
            ]
        })
        .to_string(),
        json!({ "modified": [
            { "messageId": "b", "userId": "alice", "text": "second (edited)",
              "timestamp": MAR_11 + 60_000, "status": "READ" }
        ] })
        .to_string(),
    ];
    let path = write_feed("lenient", &lines).await;
    let (session, errors) = replay(&path).await;

    assert!(errors.is_empty());
    assert_eq!(ids(&session), ["a", "b", "c"]);

    let a = session.timeline().find(&MessageId::new("a")).unwrap();
    assert_eq!(a.timestamp, Timestamp::from_millis(MAR_11));
    assert_eq!(a.status, MessageStatus::Sent);

    let b = session.timeline().find(&MessageId::new("b")).unwrap();
    assert_eq!(b.text, "second (edited)");
    assert_eq!(b.status, MessageStatus::Read);

    let c = session.timeline().find(&MessageId::new("c")).unwrap();
    assert_eq!(c.timestamp, Timestamp::from_millis(MAR_11 + 120_500));
}

#[tokio::test]
async fn malformed_timestamp_sorts_first() {
    let lines = [json!({
        "added": [
            { "messageId": "ok", "userId": "bob", "text": "hi", "timestamp": MAR_11 },
            { "messageId": "broken", "userId": "bob", "text": "??", "timestamp": "yesterday" },
        ]
    })
    .to_string()];
    let path = write_feed("malformed", &lines).await;
    let (session, _) = replay(&path).await;

    assert_eq!(ids(&session), ["broken", "ok"]);
    let items = session.timeline().items();
    assert!(is_well_formed(items, session.labeler()));
    assert!(matches!(
        &items[0],
        ChatItem::DateSeparator { label, .. } if label == "01 Jan 1970"
    ));
}

#[tokio::test]
async fn corrupt_line_is_reported_and_skipped() {
    let lines = [
        json!({ "added": [{ "messageId": "a", "timestamp": MAR_11 }] }).to_string(),
        "{ this is not json".to_string(),
        String::new(),
        json!({ "added": [{ "text": "no id" }, { "messageId": "b", "timestamp": MAR_11 + 1 }] })
            .to_string(),
        json!({ "removed": ["a", { "messageId": "ghost" }] }).to_string(),
    ];
    let path = write_feed("corrupt", &lines).await;
    let (session, errors) = replay(&path).await;

    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("line 2"));
    assert_eq!(ids(&session), ["b"]);
}

#[tokio::test]
async fn missing_file_fails_to_open() {
    let path = std::env::temp_dir().join("chatline-integ-json-feed/does-not-exist.jsonl");
    assert!(JsonLinesFeed::open(&path).await.is_err());
}
