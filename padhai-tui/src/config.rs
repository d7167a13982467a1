use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PadhaiConfig {
    /// Base URL of the backend, e.g. "http://localhost:5000"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// How long fetched data is served from the cache
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for PadhaiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            stale_after_secs: default_stale_after_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl PadhaiConfig {
    pub fn root_dir() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("padhai"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::root_dir()?.join("config.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::root_dir()?.join("padhai.log"))
    }

    /// Defaults, then the config file if present, then `PADHAI_*` environment
    /// variables.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::build(
            &path,
            config::Environment::with_prefix("PADHAI")
                .prefix_separator("_")
                .try_parsing(true),
        )
    }

    fn build(path: &Path, env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        settings
            .try_deserialize::<Self>()
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }

    /// Path of the config file, written with defaults if it doesn't exist yet.
    pub fn ensure_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("padhai-config-{}-{name}", std::process::id()))
            .join("config.toml")
    }

    fn env(vars: &[(&str, &str)]) -> config::Environment {
        let map = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        config::Environment::with_prefix("PADHAI")
            .prefix_separator("_")
            .try_parsing(true)
            .source(Some(map))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = PadhaiConfig::build(&scratch("missing"), env(&[])).unwrap();
        assert_eq!(config, PadhaiConfig::default());
        assert_eq!(config.stale_after(), Duration::from_secs(300));
    }

    #[test]
    fn file_then_environment_override_defaults() {
        let path = scratch("layered");
        PadhaiConfig {
            api_url: "https://padhai.example.com".to_string(),
            stale_after_secs: 60,
            request_timeout_secs: 30,
        }
        .save_to(&path)
        .unwrap();

        let config =
            PadhaiConfig::build(&path, env(&[("PADHAI_REQUEST_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.api_url, "https://padhai.example.com");
        assert_eq!(config.stale_after_secs, 60);
        assert_eq!(config.request_timeout(), Duration::from_secs(5));

        let config = PadhaiConfig::build(
            &path,
            env(&[("PADHAI_API_URL", "http://127.0.0.1:9000")]),
        )
        .unwrap();
        assert_eq!(config.api_url, "http://127.0.0.1:9000");

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
