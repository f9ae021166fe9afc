//! Application state and event handling.

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use chatline_proto::message::{Message, MessageId, Timestamp, UserId};

use crate::config::ClientConfig;
use crate::feed::FeedEvent;
use crate::session::ChatSession;
use crate::timeline::{ChatItem, DayLabeler};

/// Time format used when the configured one cannot be rendered.
const FALLBACK_TIME_FORMAT: &str = "%H:%M";

/// State of the change feed as shown in the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    /// Subscribed, nothing delivered yet.
    Waiting,
    /// At least one batch has arrived.
    Live,
    /// The feed ended; no more changes will arrive.
    Closed,
}

impl FeedStatus {
    /// Short label for the status bar.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting for messages",
            Self::Live => "Live",
            Self::Closed => "Feed closed",
        }
    }
}

/// Main application state.
pub struct App<Tz: TimeZone = Local> {
    session: ChatSession<Tz>,
    local_user: UserId,
    time_format: String,
    viewport_rows: usize,
    feed_status: FeedStatus,
    last_error: Option<String>,
    /// Whether the app should quit.
    pub should_quit: bool,
}

impl App<Local> {
    /// Create the app for the room described by `config`.
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        let session = ChatSession::new(
            config.chat_id(),
            DayLabeler::local(config.date_format.as_str()),
            config.scroll_threshold,
        );
        Self::new(
            session,
            UserId::new(config.local_user.as_str()),
            config.time_format.as_str(),
        )
    }
}

impl<Tz: TimeZone> App<Tz> {
    /// Create an app around an open session.
    pub fn new(session: ChatSession<Tz>, local_user: UserId, time_format: impl Into<String>) -> Self {
        Self {
            session,
            local_user,
            time_format: time_format.into(),
            viewport_rows: 0,
            feed_status: FeedStatus::Waiting,
            last_error: None,
            should_quit: false,
        }
    }

    /// Handle a key event.
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc | KeyCode::Char('q'), _) => {
                self.should_quit = true;
            }
            (KeyCode::Up | KeyCode::Char('k'), _) => self.scroll_by(1),
            (KeyCode::Down | KeyCode::Char('j'), _) => self.scroll_back_by(1),
            (KeyCode::PageUp, _) => self.scroll_by(self.viewport_rows.max(1)),
            (KeyCode::PageDown, _) => self.scroll_back_by(self.viewport_rows.max(1)),
            (KeyCode::End | KeyCode::Char('G'), _) => self.scroll_to_bottom(),
            _ => {}
        }
    }

    /// Apply one event from the change feed.
    pub fn apply_feed_event(&mut self, event: FeedEvent) {
        match event {
            FeedEvent::Batch(batch) => {
                self.session.apply(&batch);
                self.feed_status = FeedStatus::Live;
                self.clamp_scroll();
                self.report_visible();
            }
            FeedEvent::Error(msg) => {
                self.last_error = Some(msg);
            }
            FeedEvent::Closed => self.feed_status = FeedStatus::Closed,
        }
    }

    /// Record how many timeline rows fit on screen.
    pub fn set_viewport_rows(&mut self, rows: usize) {
        if rows != self.viewport_rows {
            self.viewport_rows = rows;
            self.report_visible();
        }
    }

    /// Dismiss unread messages currently on screen.
    ///
    /// Returns how many were dismissed.
    pub fn report_visible(&mut self) -> usize {
        let visible: Vec<MessageId> = self
            .visible_items()
            .filter_map(ChatItem::as_message)
            .map(|m| m.message_id.clone())
            .collect();
        self.session.mark_visible(&visible)
    }

    /// Items on screen, newest first.
    pub fn visible_items(&self) -> impl Iterator<Item = &ChatItem> {
        self.session
            .timeline()
            .rendered()
            .skip(self.session.scroll_offset())
            .take(self.viewport_rows)
    }

    /// Time of day of `timestamp`, rendered with the configured format.
    pub fn time_label(&self, timestamp: Timestamp) -> String {
        let time = DateTime::<Utc>::from_timestamp_millis(timestamp.as_millis())
            .unwrap_or_default()
            .with_timezone(self.session.labeler().time_zone())
            .time();
        let mut label = String::new();
        if write!(label, "{}", time.format(&self.time_format)).is_err() {
            label.clear();
            label.push_str(&time.format(FALLBACK_TIME_FORMAT).to_string());
        }
        label
    }

    /// Whether `message` was written by the local user.
    #[must_use]
    pub fn is_own(&self, message: &Message) -> bool {
        message.user_id == self.local_user
    }

    /// Whether `id` is in the unread set.
    #[must_use]
    pub fn is_unread(&self, id: &MessageId) -> bool {
        self.session.unread().contains(id)
    }

    /// The chat session.
    pub const fn session(&self) -> &ChatSession<Tz> {
        &self.session
    }

    /// The local user.
    pub const fn local_user(&self) -> &UserId {
        &self.local_user
    }

    /// Current feed status.
    pub const fn feed_status(&self) -> &FeedStatus {
        &self.feed_status
    }

    /// Most recent feed error, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Rows available for the timeline.
    pub const fn viewport_rows(&self) -> usize {
        self.viewport_rows
    }

    /// Scroll toward older items.
    fn scroll_by(&mut self, rows: usize) {
        let max = self.max_scroll();
        let offset = self.session.scroll_offset().saturating_add(rows).min(max);
        self.session.set_scroll_offset(offset);
        self.report_visible();
    }

    /// Scroll toward the newest item.
    fn scroll_back_by(&mut self, rows: usize) {
        let offset = self.session.scroll_offset().saturating_sub(rows);
        self.session.set_scroll_offset(offset);
        self.report_visible();
    }

    fn scroll_to_bottom(&mut self) {
        self.session.set_scroll_offset(0);
    }

    /// Keep the offset on an existing item after removals.
    fn clamp_scroll(&mut self) {
        let max = self.max_scroll();
        if self.session.scroll_offset() > max {
            self.session.set_scroll_offset(max);
        }
    }

    fn max_scroll(&self) -> usize {
        self.session.timeline().len().saturating_sub(1)
    }
}
