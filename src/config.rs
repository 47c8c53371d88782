//! Gateway configuration.
//!
//! Resolution order: built-in defaults → optional TOML file → environment
//! overrides. The Gemini API key is never part of the file; it is read from
//! `GEMINI_API_KEY` once at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MultitoolError, Result};
use crate::providers::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_TIMEOUT_SECS, GEMINI_API_BASE};

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (default: 0.0.0.0).
    pub bind: String,
    /// Listen port (default: 5000, overridden by `PORT`).
    pub port: u16,
    /// Maximum accepted request body, in bytes. Inline base64 images count
    /// against this.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 5000,
            max_body_bytes: 20 * 1024 * 1024,
        }
    }
}

/// On-disk layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory; logs live in `{cache_dir}/logs`, images in
    /// `{cache_dir}/images`.
    pub cache_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("cache"),
        }
    }
}

impl StorageConfig {
    pub fn logs_dir(&self) -> PathBuf {
        self.cache_dir.join("logs")
    }

    pub fn images_dir(&self) -> PathBuf {
        self.cache_dir.join("images")
    }
}

/// Upstream generation service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_base: String,
    pub model: String,
    /// Timeout for a single upstream call (and image fetches), in seconds.
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: GEMINI_API_BASE.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GeminiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub gemini: GeminiConfig,
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        toml::from_str(&data)
            .map_err(|e| MultitoolError::Config(format!("{}: {e}", path.display())))
    }

    /// Apply overrides from `lookup` (the process environment in production).
    ///
    /// Recognised keys: `PORT`, `MULTITOOL_BIND`, `MULTITOOL_CACHE_DIR`,
    /// `GEMINI_MODEL`, `GEMINI_API_BASE`. Empty values and unparsable ports
    /// are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get("PORT").and_then(|v| v.trim().parse().ok()) {
            self.server.port = port;
        }
        if let Some(bind) = get("MULTITOOL_BIND") {
            self.server.bind = bind;
        }
        if let Some(dir) = get("MULTITOOL_CACHE_DIR") {
            self.storage.cache_dir = PathBuf::from(dir);
        }
        if let Some(model) = get("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(base) = get("GEMINI_API_BASE") {
            self.gemini.api_base = base;
        }
    }

    /// `bind:port` listen address.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

/// Read the Gemini API key from the environment.
///
/// # Errors
///
/// Returns [`MultitoolError::Config`] when the variable is unset or empty;
/// callers treat this as fatal at startup.
pub fn api_key() -> Result<String> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn api_key_from(value: Option<String>) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MultitoolError::Config(format!("{API_KEY_ENV} not found in environment")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.storage.cache_dir, PathBuf::from("cache"));
        assert_eq!(cfg.gemini.model, "gemini-2.0-flash");
        assert_eq!(cfg.gemini.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_storage_layout() {
        let cfg = StorageConfig::default();
        assert_eq!(cfg.logs_dir(), PathBuf::from("cache/logs"));
        assert_eq!(cfg.images_dir(), PathBuf::from("cache/images"));
    }

    #[test]
    fn test_toml_partial() {
        let cfg: Config = toml::from_str(
            r#"
            [server]
            port = 8000

            [gemini]
            model = "gemini-2.5-flash"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.server.port, 8000);
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.gemini.timeout_secs, 30);
    }

    #[test]
    fn test_from_file_reports_path_on_bad_toml() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("multitool.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("multitool.toml"));
    }

    #[test]
    fn test_env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(env(&[
            ("PORT", "8000"),
            ("MULTITOOL_BIND", "127.0.0.1"),
            ("MULTITOOL_CACHE_DIR", "/var/lib/multitool"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
        ]));
        assert_eq!(cfg.listen_addr(), "127.0.0.1:8000");
        assert_eq!(cfg.storage.cache_dir, PathBuf::from("/var/lib/multitool"));
        assert_eq!(cfg.gemini.model, "gemini-2.5-pro");
    }

    #[test]
    fn test_env_overrides_ignore_bad_port_and_empty_values() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides(env(&[("PORT", "eighty"), ("GEMINI_MODEL", "  ")]));
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.gemini.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_api_key_missing_is_error() {
        assert!(api_key_from(None).is_err());
        assert!(api_key_from(Some("   ".into())).is_err());
    }

    #[test]
    fn test_api_key_present() {
        assert_eq!(api_key_from(Some(" abc ".into())).unwrap(), "abc");
    }
}
