//! Configuration for the taskboard client.
//!
//! Settings come from `taskboard.toml` in the user config directory (or the
//! path given with `--config`), layered file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:3000"
//! timeout_secs = 30
//!
//! [notifications]
//! poll_interval_secs = 30
//!
//! [session]
//! path = "/home/me/.config/taskboard/session.json"
//! ```
//!
//! Environment overrides: `TASKBOARD_BASE_URL`, `TASKBOARD_SESSION_PATH`,
//! `TASKBOARD_POLL_SECS`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::session::SESSION_FILE_NAME;

pub const CONFIG_FILE_NAME: &str = "taskboard.toml";
pub const ENV_BASE_URL: &str = "TASKBOARD_BASE_URL";
pub const ENV_SESSION_PATH: &str = "TASKBOARD_SESSION_PATH";
pub const ENV_POLL_SECS: &str = "TASKBOARD_POLL_SECS";

/// Server connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    /// Base URL of the board service
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsSection {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    30
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSection {
    /// Where credentials are persisted (default: `<config dir>/taskboard/session.json`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Contents of `taskboard.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskboardToml {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub notifications: NotificationsSection,
    #[serde(default)]
    pub session: SessionSection,
}

impl TaskboardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse taskboard.toml")
    }

    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize taskboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !is_http_url(&self.server.base_url) {
            warnings.push(format!(
                "Invalid base_url '{}': should start with http:// or https://",
                self.server.base_url
            ));
        }
        if self.server.timeout_secs == 0 {
            warnings.push("timeout_secs is 0: requests would fail immediately".to_string());
        }
        if self.notifications.poll_interval_secs == 0 {
            warnings.push("poll_interval_secs is 0: notification polling is disabled".to_string());
        }
        warnings
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"));
    rest.is_some_and(|host| !host.is_empty())
}

/// `<config dir>/taskboard`, when the platform has a config directory.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("taskboard"))
}

pub fn default_config_path() -> PathBuf {
    default_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

/// Resolved runtime configuration.
///
/// Merges, lowest to highest precedence:
/// 1. taskboard.toml
/// 2. Environment variables
/// 3. CLI arguments
#[derive(Debug, Clone)]
pub struct TaskboardConfig {
    /// Path the file layer was read from (it may not exist)
    pub config_path: PathBuf,
    /// Parsed file contents, before overrides
    pub toml: TaskboardToml,
    pub base_url: String,
    pub timeout: Duration,
    pub poll_interval: Duration,
    pub session_path: PathBuf,
}

impl TaskboardConfig {
    /// Load from the given or default config path, then apply the process
    /// environment and CLI overrides.
    pub fn load(config_path: Option<PathBuf>, cli_base_url: Option<String>) -> Result<Self> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let toml = TaskboardToml::load_or_default(&config_path)?;
        Self::resolve(config_path, toml, |key| std::env::var(key).ok(), cli_base_url)
    }

    /// Apply overrides from `env` and the CLI on top of `toml`.
    pub fn resolve(
        config_path: PathBuf,
        toml: TaskboardToml,
        env: impl Fn(&str) -> Option<String>,
        cli_base_url: Option<String>,
    ) -> Result<Self> {
        let base_url = cli_base_url
            .or_else(|| env(ENV_BASE_URL))
            .unwrap_or_else(|| toml.server.base_url.clone());

        let poll_secs = match env(ENV_POLL_SECS) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid {}: '{}'", ENV_POLL_SECS, raw))?,
            None => toml.notifications.poll_interval_secs,
        };

        let session_path = match env(ENV_SESSION_PATH).map(PathBuf::from) {
            Some(path) => path,
            None => match &toml.session.path {
                Some(path) => path.clone(),
                None => default_config_dir()
                    .map(|dir| dir.join(SESSION_FILE_NAME))
                    .with_context(|| {
                        format!(
                            "Could not determine a config directory; set {} or [session] path",
                            ENV_SESSION_PATH
                        )
                    })?,
            },
        };

        Ok(Self {
            config_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(toml.server.timeout_secs),
            poll_interval: Duration::from_secs(poll_secs),
            session_path,
            toml,
        })
    }

    /// Validate the effective configuration and return warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut effective = self.toml.clone();
        effective.server.base_url = self.base_url.clone();
        effective.notifications.poll_interval_secs = self.poll_interval.as_secs();
        effective.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let toml = TaskboardToml::default();
        assert_eq!(toml.server.base_url, "http://localhost:3000");
        assert_eq!(toml.server.timeout_secs, 30);
        assert_eq!(toml.notifications.poll_interval_secs, 30);
        assert!(toml.session.path.is_none());
        assert!(toml.validate().is_empty());
    }

    #[test]
    fn test_parse_partial_file_fills_defaults() {
        let toml = TaskboardToml::parse(
            r#"
[server]
base_url = "https://boards.example.com"
"#,
        )
        .unwrap();
        assert_eq!(toml.server.base_url, "https://boards.example.com");
        assert_eq!(toml.server.timeout_secs, 30);
        assert_eq!(toml.notifications.poll_interval_secs, 30);
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(TaskboardToml::parse("[server]\ntimeout_secs = \"soon\"").is_err());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut toml = TaskboardToml::default();
        toml.notifications.poll_interval_secs = 5;
        toml.session.path = Some(dir.path().join("s.json"));
        toml.save(&path).unwrap();

        let loaded = TaskboardToml::load(&path).unwrap();
        assert_eq!(loaded.notifications.poll_interval_secs, 5);
        assert_eq!(loaded.session.path, Some(dir.path().join("s.json")));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempdir().unwrap();
        let toml = TaskboardToml::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(toml.server.base_url, default_base_url());
    }

    #[test]
    fn test_validate_flags_bad_values() {
        let mut toml = TaskboardToml::default();
        toml.server.base_url = "localhost:3000".into();
        toml.notifications.poll_interval_secs = 0;
        let warnings = toml.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("base_url"));
        assert!(warnings[1].contains("poll_interval_secs"));
    }

    #[test]
    fn test_layering_file_env_cli() {
        let dir = tempdir().unwrap();
        let mut toml = TaskboardToml::default();
        toml.server.base_url = "http://file:1".into();
        toml.session.path = Some(dir.path().join("file-session.json"));

        let file_only =
            TaskboardConfig::resolve(dir.path().join("t.toml"), toml.clone(), env_of(&[]), None)
                .unwrap();
        assert_eq!(file_only.base_url, "http://file:1");
        assert_eq!(file_only.session_path, dir.path().join("file-session.json"));

        let env = env_of(&[
            (ENV_BASE_URL, "http://env:2/"),
            (ENV_POLL_SECS, "7"),
            (ENV_SESSION_PATH, "/tmp/env-session.json"),
        ]);
        let with_env =
            TaskboardConfig::resolve(dir.path().join("t.toml"), toml.clone(), &env, None).unwrap();
        assert_eq!(with_env.base_url, "http://env:2");
        assert_eq!(with_env.poll_interval, Duration::from_secs(7));
        assert_eq!(with_env.session_path, PathBuf::from("/tmp/env-session.json"));

        let with_cli = TaskboardConfig::resolve(
            dir.path().join("t.toml"),
            toml,
            &env,
            Some("https://cli:3".into()),
        )
        .unwrap();
        assert_eq!(with_cli.base_url, "https://cli:3");
    }

    #[test]
    fn test_invalid_poll_env_is_an_error() {
        let err = TaskboardConfig::resolve(
            PathBuf::from("t.toml"),
            TaskboardToml::default(),
            env_of(&[(ENV_POLL_SECS, "often"), (ENV_SESSION_PATH, "/tmp/s.json")]),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains(ENV_POLL_SECS));
    }
}
