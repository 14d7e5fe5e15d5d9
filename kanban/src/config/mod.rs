//! Configuration system for the kanban client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/kanban/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use kanban_proto::ProtoError;
use kanban_proto::snapshot::{BOARD_ROOT, CONTACTS_ROOT};
use kanban_proto::task::MAX_TASK_TITLE_LENGTH;

use crate::drag::AutoScroll;
use crate::sync::SyncConfig;

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

    /// Failed to read the seed document.
    #[error("failed to read seed file {path}: {source}")]
    ReadSeed {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The seed document is not valid JSON.
    #[error("failed to parse seed file: {0}")]
    ParseSeed(#[from] ProtoError),
}

/// Which controller turns mouse input into drags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DragMode {
    /// Desktop drag and drop semantics.
    #[default]
    Pointer,
    /// Touch semantics with zone highlighting and edge auto-scroll.
    Touch,
}

impl fmt::Display for DragMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointer => write!(f, "pointer"),
            Self::Touch => write!(f, "touch"),
        }
    }
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    ui: UiFileConfig,
    autoscroll: AutoScrollFileConfig,
    sync: SyncFileConfig,
    demo: DemoFileConfig,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    drag_mode: Option<DragMode>,
    card_height: Option<u16>,
    max_title_len: Option<usize>,
    notification_ttl_secs: Option<u64>,
}

/// `[autoscroll]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct AutoScrollFileConfig {
    margin: Option<f64>,
    max_speed: Option<f64>,
}

/// `[sync]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SyncFileConfig {
    board_path: Option<String>,
    contacts_path: Option<String>,
    channel_capacity: Option<usize>,
}

/// `[demo]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct DemoFileConfig {
    seed_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Controller used for mouse drags.
    pub drag_mode: DragMode,
    /// Rows per task card.
    pub card_height: u16,
    /// Maximum task title length in characters.
    pub max_title_len: usize,
    /// How long a notification stays in the status bar.
    pub notification_ttl: Duration,

    // -- Auto-scroll --
    /// Edge margin in rows.
    pub autoscroll_margin: f64,
    /// Rows scrolled per tick at the very edge.
    pub autoscroll_max_speed: f64,

    // -- Sync --
    /// Path of the board subtree.
    pub board_path: String,
    /// Path of the contacts subtree.
    pub contacts_path: String,
    /// Channel capacity for command/event mpsc channels.
    pub channel_capacity: usize,

    // -- Demo --
    /// JSON document with `board` and `contacts` to seed the store with.
    pub seed_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(50),
            drag_mode: DragMode::Pointer,
            card_height: 4,
            max_title_len: MAX_TASK_TITLE_LENGTH,
            notification_ttl: Duration::from_secs(4),
            autoscroll_margin: 2.0,
            autoscroll_max_speed: 1.0,
            board_path: BOARD_ROOT.to_string(),
            contacts_path: CONTACTS_ROOT.to_string(),
            channel_capacity: 256,
            seed_file: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// If `--config` is given and the file does not exist, returns an
    /// error. Otherwise the default path (`~/.config/kanban/config.toml`)
    /// is tried and silently ignored if missing.
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
    /// Priority: CLI > file > default. Separated from `load()` for testing
    /// without CLI parsing.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            drag_mode: cli
                .drag_mode
                .or(file.ui.drag_mode)
                .unwrap_or(defaults.drag_mode),
            card_height: file
                .ui
                .card_height
                .filter(|h| *h > 0)
                .unwrap_or(defaults.card_height),
            max_title_len: file.ui.max_title_len.unwrap_or(defaults.max_title_len),
            notification_ttl: file
                .ui
                .notification_ttl_secs
                .map_or(defaults.notification_ttl, Duration::from_secs),
            autoscroll_margin: file
                .autoscroll
                .margin
                .unwrap_or(defaults.autoscroll_margin),
            autoscroll_max_speed: file
                .autoscroll
                .max_speed
                .unwrap_or(defaults.autoscroll_max_speed),
            board_path: file
                .sync
                .board_path
                .clone()
                .unwrap_or(defaults.board_path),
            contacts_path: file
                .sync
                .contacts_path
                .clone()
                .unwrap_or(defaults.contacts_path),
            channel_capacity: file
                .sync
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
            seed_file: cli
                .seed
                .clone()
                .or_else(|| file.demo.seed_file.clone()),
        }
    }

    /// Sync coordinator settings.
    #[must_use]
    pub fn to_sync_config(&self) -> SyncConfig {
        SyncConfig {
            board_path: self.board_path.clone(),
            contacts_path: self.contacts_path.clone(),
            channel_capacity: self.channel_capacity,
        }
    }

    /// Auto-scroll settings for the touch controller.
    #[must_use]
    pub fn autoscroll(&self) -> AutoScroll {
        AutoScroll::new(self.autoscroll_margin, self.autoscroll_max_speed)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Live-synchronized terminal kanban board")]
pub struct CliArgs {
    /// Path to config file (default: `~/.config/kanban/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// How mouse drags behave.
    #[arg(long, value_enum, env = "KANBAN_DRAG_MODE")]
    pub drag_mode: Option<DragMode>,

    /// JSON seed document with `board` and `contacts` subtrees.
    #[arg(long, env = "KANBAN_SEED")]
    pub seed: Option<PathBuf>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "KANBAN_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/kanban.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
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
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        // No config dir available, use defaults.
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("kanban").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
