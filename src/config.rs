//! Locator configuration at ~/.afrocarib/locator.json.
//!
//! Every field is optional in the file; missing fields take the defaults the
//! home page uses (French localisation, 5 km accuracy gate, 10 s fresh fix).

use crate::location::types::{PositionOptions, DEFAULT_ACCURACY_THRESHOLD_M};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Malformed config {}: {source}", .path.display())]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    /// Reverse-geocoding endpoint (BigDataCloud client API).
    pub endpoint: String,
    /// Value of `localityLanguage`.
    pub language: String,
    pub accuracy_threshold_m: f64,
    pub high_accuracy: bool,
    pub position_timeout_ms: u64,
    pub maximum_age_ms: u64,
    pub user_agent: String,
    /// Overall HTTP timeout. None leaves requests unbounded.
    pub http_timeout_secs: Option<u64>,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        let position = PositionOptions::default();
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            language: "fr".to_string(),
            accuracy_threshold_m: DEFAULT_ACCURACY_THRESHOLD_M,
            high_accuracy: position.high_accuracy,
            position_timeout_ms: position.timeout.as_millis() as u64,
            maximum_age_ms: position.maximum_age.as_millis() as u64,
            user_agent: format!("AfrocaribLocator/{}", env!("CARGO_PKG_VERSION")),
            http_timeout_secs: None,
        }
    }
}

impl LocatorConfig {
    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_path())
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = match fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };

        let config: Self = serde_json::from_str(&data)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".afrocarib")
            .join("locator.json")
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accuracy_threshold_m.is_nan() || self.accuracy_threshold_m < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "accuracy_threshold_m must be a non-negative number, got {}",
                self.accuracy_threshold_m
            )));
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::Invalid("language must not be empty".into()));
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }
        Ok(())
    }

    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            high_accuracy: self.high_accuracy,
            timeout: Duration::from_millis(self.position_timeout_ms),
            maximum_age: Duration::from_millis(self.maximum_age_ms),
        }
    }

    pub fn http_timeout(&self) -> Option<Duration> {
        self.http_timeout_secs.map(Duration::from_secs)
    }
}
