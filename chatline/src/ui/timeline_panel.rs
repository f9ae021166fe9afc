//! Timeline rendering: messages and date separators, newest at the bottom.

use chrono::TimeZone;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

use chatline_proto::message::{Message, MessageStatus};

use super::theme;
use crate::app::App;
use crate::timeline::ChatItem;

/// Delivery glyph shown after the local user's messages.
#[must_use]
pub const fn status_symbol(status: MessageStatus) -> &'static str {
    match status {
        MessageStatus::Sent => "\u{2713}",
        MessageStatus::Delivered | MessageStatus::Read => "\u{2713}\u{2713}",
    }
}

/// Render the timeline panel.
pub fn render<Tz: TimeZone>(frame: &mut Frame, area: Rect, app: &App<Tz>) {
    // visible_items is newest first; the list draws top down.
    let mut lines: Vec<Line> = app.visible_items().map(|item| item_line(app, item)).collect();
    lines.reverse();

    // Bottom-align short timelines.
    let rows = usize::from(area.height.saturating_sub(2));
    let padding = rows.saturating_sub(lines.len());
    let items: Vec<ListItem> = std::iter::repeat_n(Line::default(), padding)
        .chain(lines)
        .map(ListItem::new)
        .collect();

    let title = if app.session().scroll_offset() > 0 {
        format!("Chat (\u{2191}{})", app.session().scroll_offset())
    } else {
        "Chat".to_string()
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme::highlighted());

    frame.render_widget(List::new(items).block(block), area);
}

fn item_line<'a, Tz: TimeZone>(app: &App<Tz>, item: &'a ChatItem) -> Line<'a> {
    match item {
        ChatItem::DateSeparator { label, .. } => {
            Line::from(Span::styled(format!("\u{2500}\u{2500} {label} \u{2500}\u{2500}"), theme::separator()))
                .centered()
        }
        ChatItem::Message(message) => message_line(app, message),
    }
}

fn message_line<'a, Tz: TimeZone>(app: &App<Tz>, message: &'a Message) -> Line<'a> {
    let sender = message.user_id.as_str();
    let mut spans = Vec::with_capacity(8);

    if app.is_unread(&message.message_id) {
        spans.push(Span::styled("\u{25cf} ", theme::unread_badge()));
    }
    spans.push(Span::styled(app.time_label(message.timestamp), theme::timestamp()));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(sender, theme::bold().fg(theme::sender_color(sender))));
    spans.push(Span::raw(": "));
    spans.push(Span::styled(message.text.as_str(), theme::normal()));

    if app.is_own(message) {
        let style = if message.status == MessageStatus::Read {
            theme::read_receipt()
        } else {
            theme::dimmed()
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(status_symbol(message.status), style));
    }

    Line::from(spans)
}
