use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_DIR: &str = "sentinel";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentinelConfig {
    /// Base URL of the data service, e.g. "https://abc.supabase.co"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Public API key sent with every request as `apikey`
    #[serde(default)]
    pub anon_key: String,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "http://localhost:54321".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            anon_key: String::new(),
            log_level: default_log_level(),
        }
    }
}

pub fn root_path() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Cannot determine config directory")?
        .join(APP_DIR))
}

impl SentinelConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(root_path()?.join("config.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(root_path()?.join("sentinel.log"))
    }

    /// Load config from disk, then apply environment overrides. Returns defaults if
    /// the file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let config = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config at {}", path.display()))?;
            Self::parse(&raw)
                .with_context(|| format!("Failed to parse config at {}", path.display()))?
        } else {
            Self::default()
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// `SENTINEL_API_URL` and `SENTINEL_ANON_KEY` win over the file.
    fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SENTINEL_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(key) = lookup("SENTINEL_ANON_KEY").filter(|v| !v.trim().is_empty()) {
            self.anon_key = key;
        }
        self
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(&path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(())
    }
}
