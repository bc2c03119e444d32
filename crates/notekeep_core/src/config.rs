//! Runtime configuration.
//!
//! # Responsibility
//! - Resolve data/log/export locations and the log level.
//! - Apply precedence: explicit override > environment > default.
//!
//! # Invariants
//! - Resolved directories are absolute.
//! - `log_level` is one of `trace|debug|info|warn|error`.

use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "NOTEKEEP_DATA_DIR";
pub const LOG_LEVEL_ENV: &str = "NOTEKEEP_LOG_LEVEL";
pub const EXPORT_DIR_ENV: &str = "NOTEKEEP_EXPORT_DIR";

const DEFAULT_DIR_NAME: &str = ".notekeep";
const DB_FILE_NAME: &str = "notekeep.sqlite3";
const LOG_DIR_NAME: &str = "logs";
const EXPORT_DIR_NAME: &str = "exports";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    UnsupportedLogLevel(String),
    RelativePath { setting: &'static str, path: PathBuf },
    /// No override, no environment value and no `HOME` to derive a default.
    NoDataDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativePath { setting, path } => write!(
                f,
                "{setting} must be an absolute path, got `{}`",
                path.display()
            ),
            Self::NoDataDir => write!(
                f,
                "cannot determine data directory; set {DATA_DIR_ENV} or HOME"
            ),
        }
    }
}

impl Error for ConfigError {}

/// Values supplied by the presentation layer (for example CLI flags).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub log_level: &'static str,
    pub export_dir: PathBuf,
}

impl AppConfig {
    /// Resolves configuration against the process environment.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::resolve_with(overrides, |key| std::env::var_os(key))
    }

    /// Resolves configuration against an injected environment lookup.
    pub fn resolve_with(
        overrides: ConfigOverrides,
        env: impl Fn(&str) -> Option<OsString>,
    ) -> Result<Self, ConfigError> {
        let data_dir = match overrides
            .data_dir
            .or_else(|| non_empty(env(DATA_DIR_ENV)).map(PathBuf::from))
        {
            Some(dir) => dir,
            None => non_empty(env("HOME"))
                .map(|home| PathBuf::from(home).join(DEFAULT_DIR_NAME))
                .ok_or(ConfigError::NoDataDir)?,
        };
        ensure_absolute("data_dir", &data_dir)?;

        let log_level = match overrides
            .log_level
            .or_else(|| non_empty(env(LOG_LEVEL_ENV)).map(|v| v.to_string_lossy().into_owned()))
        {
            Some(level) => normalize_level(&level)?,
            None => default_log_level(),
        };

        let export_dir = overrides
            .export_dir
            .or_else(|| non_empty(env(EXPORT_DIR_ENV)).map(PathBuf::from))
            .unwrap_or_else(|| data_dir.join(EXPORT_DIR_NAME));
        ensure_absolute("export_dir", &export_dir)?;

        Ok(Self {
            data_dir,
            log_level,
            export_dir,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

/// Returns the default log level for the current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Maps user input onto a supported level name.
pub fn normalize_level(level: &str) -> Result<&'static str, ConfigError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(ConfigError::UnsupportedLogLevel(other.to_string())),
    }
}

fn non_empty(value: Option<OsString>) -> Option<OsString> {
    value.filter(|v| !v.is_empty())
}

fn ensure_absolute(setting: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(ConfigError::RelativePath {
            setting,
            path: path.to_path_buf(),
        })
    }
}
