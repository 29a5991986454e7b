//! Configuration types for the gateway
//!
//! Stored as `config.json` in the application directory. Secrets usually come
//! from the environment instead (see [`GatewayConfig::apply_env`]).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::constants::{defaults, env, limits, paths};

/// Model tuning knobs for one call kind
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelTuning {
    /// Reasoning token budget (None = backend default)
    #[serde(default)]
    pub thinking_budget: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Overrides the output MIME type requested for structured calls
    #[serde(default)]
    pub response_mime_type: Option<String>,
}

impl ModelTuning {
    pub fn with_thinking_budget(budget: u32) -> Self {
        Self {
            thinking_budget: Some(budget),
            ..Self::default()
        }
    }
}

/// Per-call-kind tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningProfiles {
    pub audience: ModelTuning,
    pub copy: ModelTuning,
    pub creative: ModelTuning,
    pub chat: ModelTuning,
}

impl Default for TuningProfiles {
    fn default() -> Self {
        Self {
            audience: ModelTuning::with_thinking_budget(defaults::TEXT_THINKING_BUDGET),
            copy: ModelTuning::with_thinking_budget(defaults::TEXT_THINKING_BUDGET),
            creative: ModelTuning::with_thinking_budget(defaults::VISION_THINKING_BUDGET),
            chat: ModelTuning::default(),
        }
    }
}

/// Full gateway configuration
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// API key for the generative backend
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Deadline applied when a call does not set its own (0 = none)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
    #[serde(default)]
    pub tuning: TuningProfiles,
}

fn default_api_base() -> String {
    defaults::API_BASE.to_string()
}

fn default_model() -> String {
    defaults::MODEL.to_string()
}

fn default_request_timeout() -> u64 {
    defaults::REQUEST_TIMEOUT_SECS
}

fn default_max_attachment_bytes() -> u64 {
    limits::MAX_ATTACHMENT_BYTES
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
            model: default_model(),
            request_timeout_secs: default_request_timeout(),
            max_attachment_bytes: default_max_attachment_bytes(),
            tuning: TuningProfiles::default(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_attachment_bytes", &self.max_attachment_bytes)
            .field("tuning", &self.tuning)
            .finish()
    }
}

impl GatewayConfig {
    /// Platform config directory for the application, if one exists
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(paths::APP_DIR))
    }

    /// Load configuration from disk
    pub async fn load(dir: &Path) -> Result<Self, ConfigError> {
        let config_path = dir.join(paths::CONFIG_FILE);

        if !fs::try_exists(&config_path).await.map_err(ConfigError::Io)? {
            log::debug!("No config at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_path)
            .await
            .map_err(ConfigError::Io)?;

        serde_json::from_str(&contents).map_err(ConfigError::Parse)
    }

    /// Save configuration to disk
    pub async fn save(&self, dir: &Path) -> Result<(), ConfigError> {
        fs::create_dir_all(dir).await.map_err(ConfigError::Io)?;

        let config_path = dir.join(paths::CONFIG_FILE);
        let contents = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        fs::write(&config_path, contents)
            .await
            .map_err(ConfigError::Io)?;

        log::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Override fields from process environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Override fields from `lookup`; blank values are ignored
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(base) = first_env(&lookup, env::API_BASE) {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(key) = first_env(&lookup, env::API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = first_env(&lookup, &[env::MODEL]) {
            self.model = model;
        }
    }

    /// Deadline for calls that do not set their own
    pub fn default_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }
}

fn first_env(lookup: &impl Fn(&str) -> Option<String>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        lookup(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(serde_json::Error),
    #[error("Failed to serialize config: {0}")]
    Serialize(serde_json::Error),
}
