//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

/// A TOML string literal, quoted and escaped by the `toml` crate
fn toml_str(value: impl std::fmt::Display) -> String {
    toml::Value::String(value.to_string()).to_string()
}

impl Config {
    /// Render the effective configuration as a commented TOML document
    pub fn to_toml(&self) -> String {
        format!(
            r#"# samplesink configuration

# Listen address (PORT and SAMPLESINK_HOST env vars override)
host = {host}
port = {port}

# SQLite database file (SAMPLESINK_DB env var overrides)
db_path = {db_path}

# Connection tuning
[storage]
pool_size = {pool_size}
busy_timeout_ms = {busy_timeout_ms}

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = {log_level}
# JSON file logging (in addition to stdout)
file_enabled = {log_file_enabled}
file_dir = {log_file_dir}
file_rotation = {log_file_rotation}  # hourly, daily, never
file_prefix = {log_file_prefix}
"#,
            host = toml_str(self.bind_addr.ip()),
            port = self.bind_addr.port(),
            db_path = toml_str(self.storage.db_path.display()),
            pool_size = self.storage.pool_size,
            busy_timeout_ms = self.storage.busy_timeout_ms,
            log_level = toml_str(&self.logging.level),
            log_file_enabled = self.logging.file.enabled,
            log_file_dir = toml_str(self.logging.file.dir.display()),
            log_file_rotation = toml_str(self.logging.file.rotation.as_str()),
            log_file_prefix = toml_str(&self.logging.file.prefix),
        )
    }
}
