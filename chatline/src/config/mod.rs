//! Configuration system for the `Chatline` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/chatline/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

use chatline_proto::chat_id::ChatId;
use chatline_proto::message::UserId;

use crate::session::DEFAULT_SCROLL_THRESHOLD;
use crate::timeline::DEFAULT_DATE_FORMAT;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    chat: ChatFileConfig,
    timeline: TimelineFileConfig,
    unread: UnreadFileConfig,
    feed: FeedFileConfig,
    ui: UiFileConfig,
}

/// `[chat]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ChatFileConfig {
    local_user: Option<String>,
    remote_user: Option<String>,
}

/// `[timeline]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct TimelineFileConfig {
    date_format: Option<String>,
    time_format: Option<String>,
}

/// `[unread]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UnreadFileConfig {
    scroll_threshold: Option<usize>,
}

/// `[feed]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct FeedFileConfig {
    path: Option<PathBuf>,
    channel_capacity: Option<usize>,
    interval_ms: Option<u64>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- Chat --
    /// The user running the client.
    pub local_user: String,
    /// The other participant of the two-party room.
    pub remote_user: String,

    // -- Timeline --
    /// Day label format for date separators (chrono).
    pub date_format: String,
    /// Time-of-day format shown next to messages (chrono).
    pub time_format: String,

    // -- Unread --
    /// Scroll offset beyond which incoming messages count as unread.
    pub scroll_threshold: usize,

    // -- Feed --
    /// JSON-lines snapshot file to replay. `None` runs the demo feed.
    pub feed_path: Option<PathBuf>,
    /// Capacity of the feed event channel.
    pub channel_capacity: usize,
    /// Pause between feed deliveries.
    pub feed_interval: Duration,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_user: "me".to_string(),
            remote_user: "friend".to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: "%H:%M".to_string(),
            scroll_threshold: DEFAULT_SCROLL_THRESHOLD,
            feed_path: None,
            channel_capacity: 256,
            feed_interval: Duration::from_millis(1500),
            poll_timeout: Duration::from_millis(50),
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// CLI args and env vars are parsed via `clap`. If `--config` is given
    /// and the file does not exist, returns an error. If no `--config` is
    /// given, the default path (`~/.config/chatline/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config file cannot be read or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Resolve a `ClientConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. Kept separate from `load()` so it can
    /// be unit tested without CLI parsing.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            local_user: cli
                .local_user
                .clone()
                .or_else(|| file.chat.local_user.clone())
                .unwrap_or(defaults.local_user),
            remote_user: cli
                .remote_user
                .clone()
                .or_else(|| file.chat.remote_user.clone())
                .unwrap_or(defaults.remote_user),
            date_format: cli
                .date_format
                .clone()
                .or_else(|| file.timeline.date_format.clone())
                .unwrap_or(defaults.date_format),
            time_format: file
                .timeline
                .time_format
                .clone()
                .unwrap_or(defaults.time_format),
            scroll_threshold: cli
                .scroll_threshold
                .or(file.unread.scroll_threshold)
                .unwrap_or(defaults.scroll_threshold),
            feed_path: cli.feed.clone().or_else(|| file.feed.path.clone()),
            channel_capacity: file
                .feed
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
            feed_interval: file
                .feed
                .interval_ms
                .map_or(defaults.feed_interval, Duration::from_millis),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
        }
    }

    /// The room shared by the local and remote user.
    #[must_use]
    pub fn chat_id(&self) -> ChatId {
        ChatId::between(
            &UserId::new(self.local_user.as_str()),
            &UserId::new(self.remote_user.as_str()),
        )
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Chat timeline viewer")]
pub struct CliArgs {
    /// Your user id.
    #[arg(long, env = "CHATLINE_USER")]
    pub local_user: Option<String>,

    /// The user you are chatting with.
    #[arg(long, env = "CHATLINE_PEER")]
    pub remote_user: Option<String>,

    /// JSON-lines snapshot file to replay instead of the demo feed.
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Path to config file (default: `~/.config/chatline/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Date separator format (chrono format string).
    #[arg(long)]
    pub date_format: Option<String>,

    /// Scroll offset beyond which new messages count as unread.
    #[arg(long)]
    pub scroll_threshold: Option<usize>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "CHATLINE_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/chatline.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl CliArgs {
    /// Log filter for `--log-level`, which clap has already resolved against
    /// `CHATLINE_LOG`. A directive that does not parse falls back to `info`.
    #[must_use]
    pub fn log_filter(&self) -> tracing_subscriber::EnvFilter {
        tracing_subscriber::EnvFilter::try_new(&self.log_level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            // No config dir on this platform, fall back to defaults.
            return Ok(ConfigFile::default());
        };
        config_dir.join("chatline").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
