//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the identity service endpoint and project, whether the
//! session is remembered between launches, and the last email used to sign in.
//!
//! Configuration is stored at `~/.config/habitrack/config.json`. The
//! `HABITRACK_ENDPOINT` and `HABITRACK_PROJECT_ID` environment variables
//! override the stored values.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "habitrack";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Appwrite Cloud, used when no endpoint is configured.
pub const DEFAULT_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENDPOINT_ENV: &str = "HABITRACK_ENDPOINT";
pub const PROJECT_ID_ENV: &str = "HABITRACK_PROJECT_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub project_id: String,
    pub remember_session: bool,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            project_id: String::new(),
            remember_session: true,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    ///
    /// A config file that cannot be read or parsed falls back to defaults,
    /// with the overrides still applied. The load error is handed back so
    /// the caller can report it once logging is up.
    pub fn load() -> (Self, Option<anyhow::Error>) {
        let loaded = Self::config_path().and_then(|path| Self::load_from(&path));
        Self::with_overrides(
            loaded,
            std::env::var(ENDPOINT_ENV).ok(),
            std::env::var(PROJECT_ID_ENV).ok(),
        )
    }

    fn with_overrides(
        loaded: Result<Self>,
        endpoint: Option<String>,
        project_id: Option<String>,
    ) -> (Self, Option<anyhow::Error>) {
        let (mut config, error) = match loaded {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        };
        config.apply_overrides(endpoint, project_id);
        (config, error)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record the last signed-in email in the file at `path`.
    ///
    /// Only `last_email` changes: the rest is re-read from disk so values
    /// that came from environment overrides are never written back.
    pub fn save_last_email(path: &Path, email: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.last_email = Some(email.to_string());
        on_disk.save_to(path)
    }

    /// Non-empty override values replace the stored ones
    pub fn apply_overrides(&mut self, endpoint: Option<String>, project_id: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|v| !v.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
        if let Some(project_id) = project_id.filter(|v| !v.trim().is_empty()) {
            self.project_id = project_id.trim().to_string();
        }
    }

    /// Reject configurations the identity client cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.project_id.trim().is_empty() {
            bail!(
                "No project id configured. Set {} or add \"project_id\" to {}",
                PROJECT_ID_ENV,
                Self::config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| CONFIG_FILE.to_string())
            );
        }
        if !(self.endpoint.starts_with("https://") || self.endpoint.starts_with("http://")) {
            bail!("Endpoint must be an http(s) URL, got {:?}", self.endpoint);
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// Default location of the config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for log files
    pub fn log_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
