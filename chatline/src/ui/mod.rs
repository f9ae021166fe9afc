//! Terminal UI rendering.

pub mod status_bar;
pub mod theme;
pub mod timeline_panel;

use chrono::TimeZone;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::App;

/// Rows taken by everything except the timeline (header, status bar, borders).
const CHROME_ROWS: u16 = 4;

/// Number of timeline rows that fit in a terminal `height` rows tall.
#[must_use]
pub fn timeline_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(CHROME_ROWS))
}

/// Main draw function for the entire UI.
pub fn draw<Tz: TimeZone>(frame: &mut Frame, app: &App<Tz>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Timeline
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    timeline_panel::render(frame, chunks[1], app);
    status_bar::render(frame, chunks[2], app);
}

/// Render the room header.
fn render_header<Tz: TimeZone>(frame: &mut Frame, area: Rect, app: &App<Tz>) {
    let session = app.session();
    let header = Line::from(vec![
        Span::styled(format!(" {} ", session.chat_id()), theme::highlighted()),
        Span::styled(
            format!("{} messages", session.timeline().message_count()),
            theme::dimmed(),
        ),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}
