//! Configuration for the board server and client.
//!
//! Settings are read from `taskboard.toml` and layered
//! file → environment → CLI flags.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 3142
//! db_path = ".taskboard/board.db"
//! dev_mode = false
//!
//! [client]
//! base_url = "http://127.0.0.1:3142"
//! user_id = 1
//! request_timeout_ms = 10000
//!
//! [logging]
//! level = "info"
//! format = "text"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::server::ServerConfig;

pub const CONFIG_FILE: &str = "taskboard.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Invalid log format '{}'. Valid values: text, json", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        let defaults = ServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            db_path: defaults.db_path,
            dev_mode: defaults.dev_mode,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub base_url: String,
    /// Identity sent as `x-user-id` on board requests.
    pub user_id: Option<i64>,
    pub request_timeout_ms: u64,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3142".to_string(),
            user_id: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Contents of `taskboard.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardToml {
    pub server: ServerSection,
    pub client: ClientSection,
    pub logging: LoggingSection,
}

impl BoardToml {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskboard.toml")
    }

    /// Load `taskboard.toml` from `dir`, or defaults if there is none.
    pub fn load_or_default(dir: &Path) -> Result<Self> {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// File layer plus environment layer.
    ///
    /// An explicit path must exist. Otherwise the working directory is
    /// searched first, then the user config directory.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => match default_config_path() {
                Some(path) => Self::load(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `TASKBOARD_*` overrides using `lookup` to read variables.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(url) = lookup("TASKBOARD_URL") {
            self.client.base_url = url;
        }
        if let Some(user) = lookup("TASKBOARD_USER") {
            let id = user
                .trim()
                .parse::<i64>()
                .with_context(|| format!("TASKBOARD_USER must be a user id, got '{}'", user))?;
            self.client.user_id = Some(id);
        }
        if let Some(db) = lookup("TASKBOARD_DB") {
            self.server.db_path = PathBuf::from(db);
        }
        if let Some(format) = lookup("TASKBOARD_LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            db_path: self.server.db_path.clone(),
            dev_mode: self.server.dev_mode,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.client.request_timeout_ms)
    }
}

/// First existing config file among `./taskboard.toml` and the user config
/// directory.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("taskboard").join(CONFIG_FILE))
        .filter(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BoardToml::default();
        assert_eq!(config.server.port, 3142);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.client.user_id, None);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = BoardToml::parse(
            r#"
            [server]
            port = 8080
            dev_mode = true

            [client]
            user_id = 7

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.dev_mode);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.client.user_id, Some(7));
        assert_eq!(config.client.request_timeout_ms, 10_000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_rejects_bad_format() {
        let err = BoardToml::parse("[logging]\nformat = \"yaml\"").unwrap_err();
        assert!(err.to_string().contains("taskboard.toml"));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let config = BoardToml::load_or_default(dir.path()).unwrap();
        assert_eq!(config, BoardToml::default());
    }

    #[test]
    fn test_load_or_default_reads_file() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "[server]\ndb_path = \"/tmp/other.db\"\n",
        )
        .unwrap();
        let config = BoardToml::load_or_default(dir.path()).unwrap();
        assert_eq!(config.server.db_path, PathBuf::from("/tmp/other.db"));
    }

    #[test]
    fn test_resolve_explicit_missing_file_fails() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(BoardToml::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = BoardToml::parse("[client]\nuser_id = 1\n").unwrap();
        config
            .apply_env_from(env(&[
                ("TASKBOARD_URL", "http://board.local:9000"),
                ("TASKBOARD_USER", "42"),
                ("TASKBOARD_DB", "/var/lib/board.db"),
                ("TASKBOARD_LOG_FORMAT", "JSON"),
            ]))
            .unwrap();
        assert_eq!(config.client.base_url, "http://board.local:9000");
        assert_eq!(config.client.user_id, Some(42));
        assert_eq!(config.server.db_path, PathBuf::from("/var/lib/board.db"));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_rejects_non_numeric_user() {
        let mut config = BoardToml::default();
        let err = config
            .apply_env_from(env(&[("TASKBOARD_USER", "alice")]))
            .unwrap_err();
        assert!(err.to_string().contains("TASKBOARD_USER"));
    }

    #[test]
    fn test_apply_env_reads_process_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let saved = std::env::var("TASKBOARD_URL").ok();
        unsafe { std::env::set_var("TASKBOARD_URL", "http://from-env:1") };

        let mut config = BoardToml::default();
        let result = config.apply_env_from(|key| {
            if key == "TASKBOARD_URL" {
                std::env::var(key).ok()
            } else {
                None
            }
        });

        match saved {
            Some(v) => unsafe { std::env::set_var("TASKBOARD_URL", v) },
            None => unsafe { std::env::remove_var("TASKBOARD_URL") },
        }
        result.unwrap();
        assert_eq!(config.client.base_url, "http://from-env:1");
    }

    #[test]
    fn test_server_config_from_file() {
        let config = BoardToml::parse("[server]\nhost = \"0.0.0.0\"\nport = 1\n").unwrap();
        let server = config.server_config();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 1);
    }
}
