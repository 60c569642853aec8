//! Configuration management for rx-export

use crate::error::{Result, RxError};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Project-local configuration file, relative to the working directory
pub const LOCAL_CONFIG_PATH: &str = ".rx-export/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server connection settings
    pub server: ServerConfig,
    /// Export submission settings
    pub export: ExportConfig,
    /// Terminal output settings
    pub output: OutputConfig,
}

/// Server connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the platform server
    pub base_url: String,
    /// Value sent in the AUTH-TOKEN header
    pub auth_token: Option<String>,
    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8021".to_string(),
            auth_token: None,
            timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Request timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Export-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Delay before the one-shot status refresh after a submit
    pub refresh_delay_ms: u64,
    /// Number of jobs fetched per status page
    pub status_page_size: u32,
    /// Initial value of the include-voided flag
    pub include_voided: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            refresh_delay_ms: 1000,
            status_page_size: 10,
            include_voided: false,
        }
    }
}

impl ExportConfig {
    /// Refresh delay as a duration
    pub fn refresh_delay(&self) -> Duration {
        Duration::from_millis(self.refresh_delay_ms)
    }
}

/// Output-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Colored terminal output
    pub color: bool,
    /// strftime pattern for job timestamps
    pub date_format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RxError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| e.with_context(format!("Invalid config {}", path.display())))?;
        debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check values that serde alone cannot reject
    pub fn validate(&self) -> Result<()> {
        let url = self.server.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RxError::Config(format!(
                "server.base_url must start with http:// or https://, got '{}'",
                self.server.base_url
            )));
        }
        if self.server.timeout_secs == 0 {
            return Err(RxError::Config(
                "server.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.export.status_page_size == 0 {
            return Err(RxError::Config(
                "export.status_page_size must be greater than zero".to_string(),
            ));
        }
        if StrftimeItems::new(&self.output.date_format).any(|item| matches!(item, Item::Error)) {
            return Err(RxError::Config(format!(
                "output.date_format is not a valid strftime pattern: '{}'",
                self.output.date_format
            )));
        }
        Ok(())
    }

    /// Resolve which config file to use, if any
    ///
    /// An explicit path wins, then the project-local file, then the user
    /// config directory.
    pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        let local = PathBuf::from(LOCAL_CONFIG_PATH);
        if local.exists() {
            return Some(local);
        }
        let user = user_config_path();
        user.exists().then_some(user)
    }
}

/// Per-user configuration file location
pub fn user_config_path() -> PathBuf {
    directories::ProjectDirs::from("org", "rx-export", "rx-export")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".rx-export")
        })
        .join("config.toml")
}
