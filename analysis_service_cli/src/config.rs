use std::env;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the analysis service lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ServiceConfig {
    pub fn new(raw_url: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                reason: "timeout must be at least one second".into(),
            });
        }
        Ok(Self {
            base_url: parse_base_url(raw_url)?,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Reads `ANALYSIS_SERVICE_URL` and `REQUEST_TIMEOUT_SECS`, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_url = env::var("ANALYSIS_SERVICE_URL").unwrap_or_else(|_| DEFAULT_SERVICE_URL.to_string());
        let timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "REQUEST_TIMEOUT_SECS",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Self::new(&raw_url, timeout_secs)
    }

    pub fn with_base_url(self, raw_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(raw_url)?,
            ..self
        })
    }
}

// Endpoints are joined relative to the base, so it must end in '/'.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: "ANALYSIS_SERVICE_URL",
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            name: "ANALYSIS_SERVICE_URL",
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
