//! Layered runtime configuration.
//!
//! # Responsibility
//! - Merge built-in defaults, an optional TOML file and `TASKMINDER__*`
//!   environment variables into one [`AppConfig`].
//! - Enforce reminder timing invariants before anything is started.
//!
//! # Invariants
//! - `poll_interval > 0` and `window > 0`.
//! - `window >= poll_interval`; otherwise a deadline can fall between two
//!   scans and never be selected.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "tasks.db";
pub const DEFAULT_CONFIG_FILE: &str = "taskminder.toml";
pub const DEFAULT_WINDOW_SECS: u64 = 10 * 60;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const ENV_PREFIX: &str = "TASKMINDER";

#[derive(Debug)]
pub enum ConfigError {
    Load(config::ConfigError),
    ZeroInterval,
    ZeroWindow,
    WindowShorterThanInterval {
        window: Duration,
        poll_interval: Duration,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Load(err) => write!(f, "failed to load configuration: {err}"),
            Self::ZeroInterval => write!(f, "reminder poll interval must be greater than zero"),
            Self::ZeroWindow => write!(f, "reminder window must be greater than zero"),
            Self::WindowShorterThanInterval {
                window,
                poll_interval,
            } => write!(
                f,
                "reminder window ({}s) must not be shorter than the poll interval ({}s)",
                window.as_secs(),
                poll_interval.as_secs()
            ),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(value: config::ConfigError) -> Self {
        Self::Load(value)
    }
}

/// Reminder timing validated against the window/interval invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    window: Duration,
    poll_interval: Duration,
}

impl ReminderSettings {
    /// Builds settings, rejecting zero durations and `window < poll_interval`.
    pub fn new(window: Duration, poll_interval: Duration) -> Result<Self, ConfigError> {
        if poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if window.is_zero() {
            return Err(ConfigError::ZeroWindow);
        }
        if window < poll_interval {
            return Err(ConfigError::WindowShorterThanInterval {
                window,
                poll_interval,
            });
        }
        Ok(Self {
            window,
            poll_interval,
        })
    }

    /// Span before a deadline during which a task is eligible for a reminder.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Pause between two scheduler scans.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Window as a calendar delta for deadline arithmetic.
    pub fn window_delta(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.window).unwrap_or(chrono::Duration::MAX)
    }
}

impl Default for ReminderSettings {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawReminderConfig {
    window_secs: u64,
    poll_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct RawAppConfig {
    database_path: PathBuf,
    log_level: Option<String>,
    log_dir: Option<PathBuf>,
    reminder: RawReminderConfig,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_path: PathBuf,
    /// `None` falls back to [`crate::default_log_level`].
    pub log_level: Option<String>,
    /// `None` falls back to `<cwd>/logs`.
    pub log_dir: Option<PathBuf>,
    pub reminder: ReminderSettings,
}

impl AppConfig {
    /// Loads configuration from defaults, an optional file and the environment.
    ///
    /// When `file` is `None`, `taskminder.toml` in the working directory is
    /// read if present. An explicitly passed file must exist.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?;
        let builder = match file {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let raw = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_raw(raw.try_deserialize()?)
    }

    /// Parses configuration from a TOML string layered over the defaults.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let raw = Self::defaults()?
            .add_source(File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Self::from_raw(raw.try_deserialize()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Ok(Config::builder()
            .set_default("database_path", DEFAULT_DATABASE_PATH)?
            .set_default("reminder.window_secs", DEFAULT_WINDOW_SECS)?
            .set_default("reminder.poll_interval_secs", DEFAULT_POLL_INTERVAL_SECS)?)
    }

    fn from_raw(raw: RawAppConfig) -> Result<Self, ConfigError> {
        let reminder = ReminderSettings::new(
            Duration::from_secs(raw.reminder.window_secs),
            Duration::from_secs(raw.reminder.poll_interval_secs),
        )?;
        Ok(Self {
            database_path: raw.database_path,
            log_level: raw.log_level,
            log_dir: raw.log_dir,
            reminder,
        })
    }
}
