//! Logging settings: stdout level plus an optional rolling JSON file
//!
//! The TOML keys stay flat under `[logging]`; in memory the file sink is
//! grouped into [`LogFileConfig`] so the subscriber setup takes one value.

use serde::Deserialize;
use std::path::PathBuf;
use tracing_appender::rolling::Rotation;

/// How often the JSON log file rolls over
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl LogRotation {
    /// Case-insensitive lookup; `None` for anything unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        [Self::Hourly, Self::Daily, Self::Never]
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }

    /// Matching rotation policy for the rolling appender
    pub fn rotation(self) -> Rotation {
        match self {
            Self::Hourly => Rotation::HOURLY,
            Self::Daily => Rotation::DAILY,
            Self::Never => Rotation::NEVER,
        }
    }
}

/// JSON file sink, written next to stdout output when enabled
#[derive(Debug, Clone)]
pub struct LogFileConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub rotation: LogRotation,
    /// File name stem, e.g. "samplesink" -> "samplesink.2024-01-15"
    pub prefix: String,
}

impl Default for LogFileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("./logs"),
            rotation: LogRotation::Daily,
            prefix: "samplesink".to_string(),
        }
    }
}

/// Effective logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Level for this crate's targets; `RUST_LOG` replaces the whole filter
    pub level: String,
    pub file: LogFileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: LogFileConfig::default(),
        }
    }
}

/// `[logging]` section as written in the config file
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Overlay whatever the file sets onto the defaults
    ///
    /// An unrecognized rotation keeps the default rather than failing startup.
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let mut config = Self::default();
        let Some(file) = file else {
            return config;
        };

        if let Some(level) = file.level {
            config.level = level;
        }
        if let Some(enabled) = file.file_enabled {
            config.file.enabled = enabled;
        }
        if let Some(dir) = file.file_dir {
            config.file.dir = PathBuf::from(dir);
        }
        if let Some(rotation) = file.file_rotation.as_deref().and_then(LogRotation::parse) {
            config.file.rotation = rotation;
        }
        if let Some(prefix) = file.file_prefix {
            config.file.prefix = prefix;
        }
        config
    }
}
