//! `Chatline`: terminal viewer for a listener-driven chat timeline.
//!
//! Subscribes to a change feed for one two-party room and renders the
//! reconciled timeline. Configuration via CLI flags, environment variables,
//! or config file (`~/.config/chatline/config.toml`).
//!
//! ```bash
//! # Simulated conversation
//! cargo run --bin chatline -- --local-user alice --remote-user bob
//!
//! # Replay a recorded session, one snapshot payload per line
//! cargo run --bin chatline -- --feed session.jsonl
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use chatline::app::App;
use chatline::config::{CliArgs, ClientConfig};
use chatline::feed::demo::DemoFeed;
use chatline::feed::json_lines::JsonLinesFeed;
use chatline::feed::{FeedEvent, spawn_feed};
use chatline::ui;
use chatline_proto::message::UserId;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Initialize logging before terminal setup (logs go to file, not stdout).
    let _log_guard = init_logging(cli.log_filter(), cli.log_file.as_deref());

    tracing::info!(chat_id = %config.chat_id(), "chatline starting");

    // Subscribe before taking over the terminal so a bad path is reported plainly.
    let mut feed_rx = match subscribe(&config).await {
        Ok(rx) => rx,
        Err(e) => {
            eprintln!("Error: {e}");
            return Err(e);
        }
    };

    // Set up terminal.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app.
    let result = run_app(&mut terminal, &mut feed_rx, &config);

    // Restore terminal.
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Dropping the receiver unsubscribes the feed task.
    drop(feed_rx);
    tracing::info!("chatline exiting");
    result
}

/// Initialize file-based logging.
///
/// Logs are written to a file (never stdout, since ratatui owns the terminal).
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(
    env_filter: tracing_subscriber::EnvFilter,
    file_path: Option<&Path>,
) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("chatline.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Start the configured change feed on a background task.
async fn subscribe(config: &ClientConfig) -> io::Result<mpsc::Receiver<FeedEvent>> {
    let (rx, _handle) = if let Some(path) = &config.feed_path {
        let feed = JsonLinesFeed::open(path)
            .await
            .map_err(io::Error::other)?
            .with_interval(config.feed_interval);
        spawn_feed(feed, config.channel_capacity)
    } else {
        tracing::info!("no feed file configured, running demo conversation");
        let feed = DemoFeed::new(
            UserId::new(config.local_user.as_str()),
            UserId::new(config.remote_user.as_str()),
            config.feed_interval,
        );
        spawn_feed(feed, config.channel_capacity)
    };
    Ok(rx)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    feed_rx: &mut mpsc::Receiver<FeedEvent>,
    config: &ClientConfig,
) -> io::Result<()> {
    let mut app = App::from_config(config);

    loop {
        // Step 1: Size the viewport and draw the UI frame.
        app.set_viewport_rows(ui::timeline_rows(terminal.size()?.height));
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Step 2: Drain all pending feed events (non-blocking).
        while let Ok(event) = feed_rx.try_recv() {
            app.apply_feed_event(event);
        }

        // Step 3: Poll for terminal input events.
        if event::poll(config.poll_timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key_event(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
