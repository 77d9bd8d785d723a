//! Runtime configuration for hosts embedding the core.
//!
//! # Responsibility
//! - Collect database, logging and cookie settings in one value.
//! - Load them from environment variables or a JSON document.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown JSON fields are rejected.
//! - Log level defaults follow build mode (see `default_log_level`).

use crate::logging::default_log_level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "NOTEVAULT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "NOTEVAULT_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEVAULT_LOG_DIR";
pub const ENV_SECURE_COOKIES: &str = "NOTEVAULT_SECURE_COOKIES";

const DEFAULT_DB_FILE_NAME: &str = "notevault.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite database file. `None` selects an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<PathBuf>,
    /// Whether session cookies carry the `Secure` attribute.
    pub secure_cookies: bool,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: Some(PathBuf::from(DEFAULT_DB_FILE_NAME)),
            log_level: default_log_level().to_string(),
            log_dir: None,
            secure_cookies: false,
        }
    }
}

impl CoreConfig {
    /// Reads `NOTEVAULT_*` variables on top of defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_DB_PATH) {
            let path = path.trim();
            config.db_path = if path.is_empty() || path == ":memory:" {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            config.log_level = level.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|value| !value.trim().is_empty()) {
            config.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(flag) = lookup(ENV_SECURE_COOKIES) {
            config.secure_cookies = parse_flag(&flag);
        }
        config
    }

    /// Parses a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::{CoreConfig, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_SECURE_COOKIES};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn lookup_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            (ENV_DB_PATH, ":memory:"),
            (ENV_LOG_LEVEL, " warn "),
            (ENV_SECURE_COOKIES, "TRUE"),
        ]);
        let config = CoreConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.db_path, None);
        assert_eq!(config.log_level, "warn");
        assert!(config.secure_cookies);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = CoreConfig::from_json_str(r#"{"db_path": "/tmp/notes.db"}"#)
            .expect("partial config should parse");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/notes.db")));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
    }

    #[test]
    fn json_rejects_unknown_fields() {
        assert!(CoreConfig::from_json_str(r#"{"dbpath": "x"}"#).is_err());
    }
}
