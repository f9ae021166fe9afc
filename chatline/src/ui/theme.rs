//! Theme and styling constants for the TUI.

use ratatui::style::{Color, Modifier, Style};

/// Primary foreground color.
pub const FG_PRIMARY: Color = Color::White;

/// Secondary foreground color (dimmed text).
pub const FG_SECONDARY: Color = Color::Gray;

/// Highlight color for borders and the header.
pub const HIGHLIGHT: Color = Color::Cyan;

/// Live feed indicator color.
pub const SUCCESS: Color = Color::Green;

/// Waiting feed indicator and unread marker color.
pub const WARNING: Color = Color::Yellow;

/// Feed error color.
pub const ERROR: Color = Color::Red;

/// Closed feed indicator color.
pub const OFFLINE: Color = Color::DarkGray;

/// Color for sender names in chat.
pub const SENDER_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::LightCyan,
    Color::LightGreen,
    Color::Rgb(255, 165, 0),
    Color::Rgb(180, 120, 255),
];

/// Normal text style.
#[must_use]
pub fn normal() -> Style {
    Style::default().fg(FG_PRIMARY)
}

/// Dimmed text style (metadata, help text).
#[must_use]
pub fn dimmed() -> Style {
    Style::default().fg(FG_SECONDARY)
}

/// Bold text style.
#[must_use]
pub fn bold() -> Style {
    Style::default().fg(FG_PRIMARY).add_modifier(Modifier::BOLD)
}

/// Highlighted text style (panel borders, header).
#[must_use]
pub fn highlighted() -> Style {
    Style::default().fg(HIGHLIGHT).add_modifier(Modifier::BOLD)
}

/// Get a color for a sender based on their name.
#[must_use]
pub fn sender_color(name: &str) -> Color {
    let hash = name.bytes().fold(0u32, |acc, b| {
        acc.wrapping_mul(31).wrapping_add(u32::from(b))
    });
    SENDER_COLORS[(hash as usize) % SENDER_COLORS.len()]
}

/// Style for date separators (italic, dim blue).
#[must_use]
pub fn separator() -> Style {
    Style::default()
        .fg(Color::Rgb(100, 140, 180))
        .add_modifier(Modifier::ITALIC)
}

/// Style for timestamps (dark gray).
#[must_use]
pub fn timestamp() -> Style {
    Style::default().fg(Color::Rgb(120, 120, 120))
}

/// Style for read receipts.
#[must_use]
pub fn read_receipt() -> Style {
    Style::default().fg(HIGHLIGHT)
}

/// Style for the status bar background (dark background with white foreground).
#[must_use]
pub fn status_bar_bg() -> Style {
    Style::default().fg(Color::White).bg(Color::Rgb(30, 30, 50))
}

/// Style for unread markers and counts (bold yellow).
#[must_use]
pub fn unread_badge() -> Style {
    Style::default().fg(WARNING).add_modifier(Modifier::BOLD)
}
