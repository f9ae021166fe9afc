//! Calendar-day bucketing and date separator synthesis.

use std::fmt::Write as _;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use chatline_proto::message::{Message, Timestamp};

use super::ChatItem;

/// Default day label format, e.g. "12 Mar 2024".
pub const DEFAULT_DATE_FORMAT: &str = "%d %b %Y";

/// Label format used when the configured one cannot be rendered.
const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps timestamps to calendar days in a time zone and labels those days.
#[derive(Debug, Clone)]
pub struct DayLabeler<Tz: TimeZone = Local> {
    tz: Tz,
    format: String,
}

impl DayLabeler<Local> {
    /// Labeler for the system's local time zone.
    pub fn local(format: impl Into<String>) -> Self {
        Self::new(Local, format)
    }
}

impl Default for DayLabeler<Local> {
    fn default() -> Self {
        Self::local(DEFAULT_DATE_FORMAT)
    }
}

impl<Tz: TimeZone> DayLabeler<Tz> {
    /// Labeler for an explicit time zone and chrono `strftime` format.
    pub fn new(tz: Tz, format: impl Into<String>) -> Self {
        Self {
            tz,
            format: format.into(),
        }
    }

    /// The time zone days are computed in.
    pub const fn time_zone(&self) -> &Tz {
        &self.tz
    }

    /// Calendar day of `timestamp` in this labeler's time zone.
    ///
    /// Timestamps chrono cannot represent are treated as the epoch.
    pub fn day_of(&self, timestamp: Timestamp) -> NaiveDate {
        DateTime::<Utc>::from_timestamp_millis(timestamp.as_millis())
            .unwrap_or_default()
            .with_timezone(&self.tz)
            .date_naive()
    }

    /// Renders the label shown on a separator for `day`.
    pub fn label(&self, day: NaiveDate) -> String {
        let mut label = String::new();
        if write!(label, "{}", day.format(&self.format)).is_err() {
            label.clear();
            label.push_str(&day.format(FALLBACK_DATE_FORMAT).to_string());
        }
        label
    }
}

/// Builds timeline items from messages already sorted by timestamp.
///
/// A separator is emitted before the first message and whenever the
/// calendar day changes, so every separator has at least one message after
/// it and no two separators touch.
pub fn with_separators<Tz: TimeZone>(
    messages: impl IntoIterator<Item = Message>,
    labeler: &DayLabeler<Tz>,
) -> Vec<ChatItem> {
    let messages = messages.into_iter();
    let mut items = Vec::with_capacity(messages.size_hint().0);
    let mut current_day = None;

    for message in messages {
        let day = labeler.day_of(message.timestamp);
        if current_day != Some(day) {
            items.push(ChatItem::DateSeparator {
                day,
                label: labeler.label(day),
            });
            current_day = Some(day);
        }
        items.push(ChatItem::Message(message));
    }

    items
}
