//! TOML-based configuration persistence for the agent.
//!
//! Reads and writes [`AppConfig`] to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\AutoCopy\config.toml`
//! - Linux:    `~/.config/autocopy/config.toml`
//! - macOS:    `~/Library/Application Support/AutoCopy/config.toml`
//!
//! Example:
//!
//! ```toml
//! [general]
//! enabled = true
//! auto_start = true
//! log_level = "info"
//!
//! [selection]
//! copy_delay_ms = 100
//! require_caret = false
//!
//! [notification]
//! fade_step = 0.1
//! fade_tick_ms = 50
//! width = 200
//! height = 40
//! bottom_margin = 10
//! copied_message = "Text copied"
//! ```
//!
//! # Serde default values
//!
//! Every field carries `#[serde(default = "…")]`, so a missing file, a missing
//! section or a missing key all fall back to the built-in defaults.  Values
//! that parse but make no sense (a zero tick, a fade step outside `(0, 1]`)
//! are replaced by [`AppConfig::sanitized`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use autocopy_core::{
    timing::{DEFAULT_COPIED_MESSAGE, DEFAULT_COPY_DELAY, DEFAULT_FADE_STEP, DEFAULT_FADE_TICK},
    NotificationGeometry,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::notification::PresenterSettings;
use crate::application::orchestrator::ConfigStore;
use crate::application::selection_copy::SelectionSettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// On/off state, login registration and logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// Whether copy-on-select and paste-on-middle-click are active.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Whether the agent registers itself to run at login. On unless the
    /// user opts out.
    #[serde(default = "default_true")]
    pub auto_start: bool,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SelectionConfig {
    /// Delay between the primary button-up and the synthetic copy.
    #[serde(default = "default_copy_delay_ms")]
    pub copy_delay_ms: u64,
    /// Only copy when the focused window shows a text caret.
    #[serde(default)]
    pub require_caret: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationConfig {
    /// Opacity removed per tick, in `(0, 1]`.
    #[serde(default = "default_fade_step")]
    pub fade_step: f32,
    /// Milliseconds between fade ticks.
    #[serde(default = "default_fade_tick_ms")]
    pub fade_tick_ms: u64,
    #[serde(default = "default_width")]
    pub width: i32,
    #[serde(default = "default_height")]
    pub height: i32,
    /// Gap between the window and the bottom of the work area.
    #[serde(default = "default_bottom_margin")]
    pub bottom_margin: i32,
    /// Text shown when new text lands on the clipboard.
    #[serde(default = "default_copied_message")]
    pub copied_message: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_copy_delay_ms() -> u64 {
    DEFAULT_COPY_DELAY.as_millis() as u64
}
fn default_fade_step() -> f32 {
    DEFAULT_FADE_STEP
}
fn default_fade_tick_ms() -> u64 {
    DEFAULT_FADE_TICK.as_millis() as u64
}
fn default_width() -> i32 {
    NotificationGeometry::default().width
}
fn default_height() -> i32 {
    NotificationGeometry::default().height
}
fn default_bottom_margin() -> i32 {
    NotificationGeometry::default().bottom_margin
}
fn default_copied_message() -> String {
    DEFAULT_COPIED_MESSAGE.to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            auto_start: default_true(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            copy_delay_ms: default_copy_delay_ms(),
            require_caret: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            fade_step: default_fade_step(),
            fade_tick_ms: default_fade_tick_ms(),
            width: default_width(),
            height: default_height(),
            bottom_margin: default_bottom_margin(),
            copied_message: default_copied_message(),
        }
    }
}

impl AppConfig {
    /// Replaces nonsensical values with their defaults, logging each one.
    pub fn sanitized(mut self) -> Self {
        let n = &mut self.notification;
        if !(n.fade_step > 0.0 && n.fade_step <= 1.0) {
            warn!(fade_step = n.fade_step, "fade_step must be in (0, 1]; using default");
            n.fade_step = default_fade_step();
        }
        if n.fade_tick_ms == 0 {
            warn!("fade_tick_ms must be positive; using default");
            n.fade_tick_ms = default_fade_tick_ms();
        }
        if n.width <= 0 || n.height <= 0 {
            warn!(width = n.width, height = n.height, "notification size must be positive; using default");
            n.width = default_width();
            n.height = default_height();
        }
        if n.copied_message.trim().is_empty() {
            n.copied_message = default_copied_message();
        }
        self
    }

    pub fn selection_settings(&self) -> SelectionSettings {
        SelectionSettings {
            copy_delay: Duration::from_millis(self.selection.copy_delay_ms),
            require_caret: self.selection.require_caret,
        }
    }

    pub fn presenter_settings(&self) -> PresenterSettings {
        let n = &self.notification;
        PresenterSettings {
            fade_step: n.fade_step,
            tick_interval: Duration::from_millis(n.fade_tick_ms),
            geometry: NotificationGeometry {
                width: n.width,
                height: n.height,
                bottom_margin: n.bottom_margin,
            },
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not yet exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg.sanitized())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Resolves the platform config base directory including the `AutoCopy` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("AutoCopy"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("autocopy"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("AutoCopy")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── ConfigStore adapter ───────────────────────────────────────────────────────

/// [`ConfigStore`] backed by a TOML file.
///
/// The in-memory [`AppConfig`] is authoritative; a failed write leaves it
/// untouched and the next flush tries again.
pub struct TomlConfigStore {
    path: Option<PathBuf>,
    config: AppConfig,
}

impl TomlConfigStore {
    /// Opens the store at `path`.  An unreadable or malformed file is logged
    /// and replaced by defaults; it is overwritten on the next flush.
    pub fn open(path: PathBuf) -> Self {
        let config = match load_config_from(&path) {
            Ok(cfg) => {
                debug!(path = %path.display(), "configuration loaded");
                cfg
            }
            Err(e) => {
                warn!("using default configuration: {e}");
                AppConfig::default()
            }
        };
        Self {
            path: Some(path),
            config,
        }
    }

    /// Opens the store at the platform default location, or an unsaved
    /// in-memory store when that location cannot be determined.
    pub fn open_default() -> Self {
        match config_file_path() {
            Ok(path) => Self::open(path),
            Err(e) => {
                warn!("settings will not be persisted: {e}");
                Self {
                    path: None,
                    config: AppConfig::default(),
                }
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl ConfigStore for TomlConfigStore {
    fn enabled(&self) -> bool {
        self.config.general.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.config.general.enabled = enabled;
    }

    fn auto_start(&self) -> bool {
        self.config.general.auto_start
    }

    fn set_auto_start(&mut self, auto_start: bool) {
        self.config.general.auto_start = auto_start;
    }

    fn flush(&mut self) -> Result<(), ConfigError> {
        let path = self.path.as_deref().ok_or(ConfigError::NoPlatformConfigDir)?;
        save_config_to(path, &self.config)?;
        debug!(path = %path.display(), "configuration saved");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
