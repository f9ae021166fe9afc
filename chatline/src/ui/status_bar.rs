//! Status bar rendering.

use chrono::TimeZone;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
};

use super::theme;
use crate::app::{App, FeedStatus};

const HELP_TEXT: &str = "\u{2191}\u{2193}/jk: scroll | End/G: bottom | q: quit";

/// Render the status bar at the bottom of the screen.
pub fn render<Tz: TimeZone>(frame: &mut Frame, area: Rect, app: &App<Tz>) {
    let dot_color = match app.feed_status() {
        FeedStatus::Live => theme::SUCCESS,
        FeedStatus::Waiting => theme::WARNING,
        FeedStatus::Closed => theme::OFFLINE,
    };

    let mut spans = vec![
        Span::styled(concat!("Chatline v", env!("CARGO_PKG_VERSION")), theme::bold()),
        Span::raw(" | "),
        Span::styled("\u{25cf}", theme::normal().fg(dot_color)),
        Span::raw(format!(" {}", app.feed_status().label())),
    ];

    let unread = app.session().unread_count();
    if unread > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(format!("{unread} unread"), theme::unread_badge()));
    }
    if let Some(err) = app.last_error() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(err, theme::normal().fg(theme::ERROR)));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(HELP_TEXT, theme::dimmed()));

    let paragraph = Paragraph::new(Line::from(spans)).style(theme::status_bar_bg());
    frame.render_widget(paragraph, area);
}
