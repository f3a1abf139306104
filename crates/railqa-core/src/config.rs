use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{RailqaError, Result};

/// Top-level configuration for the railqa client.
///
/// Loaded from `~/.railqa/config.toml` by default. Every section falls back
/// to its defaults when missing, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RailqaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub viewer: ViewerConfig,
}

impl RailqaConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RailqaConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Reject values the client cannot run with.
    pub fn validate(&self) -> Result<()> {
        for (field, url) in [
            ("gateway.base_url", &self.gateway.base_url),
            ("viewer.base_url", &self.viewer.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(RailqaError::Config(format!(
                    "{} must be an http:// or https:// URL, got: {}",
                    field, url
                )));
            }
        }
        if self.gateway.request_timeout_secs == 0 {
            return Err(RailqaError::Config(
                "gateway.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.gateway.probe_timeout_secs == 0 {
            return Err(RailqaError::Config(
                "gateway.probe_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.health.poll_interval_secs == 0 {
            return Err(RailqaError::Config(
                "health.poll_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// General client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Directory that downloaded diagram documents are written to.
    pub download_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            download_dir: ".".to_string(),
        }
    }
}

/// Backend gateway connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the backend, without a trailing path.
    pub base_url: String,
    /// Upper bound on a question or generation call.
    pub request_timeout_secs: u64,
    /// Upper bound on a single liveness probe.
    pub probe_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 120,
            probe_timeout_secs: 5,
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Health monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Seconds between poll rounds.
    pub poll_interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
        }
    }
}

impl HealthConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// External diagram viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Editor URL that the state fragment is appended to.
    pub base_url: String,
    /// Mermaid theme embedded in the editor state.
    pub theme: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://mermaid.live/edit".to_string(),
            theme: "default".to_string(),
        }
    }
}
