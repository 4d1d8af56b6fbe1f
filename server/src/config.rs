use analysis_service_cli::error::ConfigError;
use axum::http::HeaderValue;
use std::env;
use std::net::SocketAddr;

pub const DEFAULT_DASHBOARD_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub addr: SocketAddr,
    /// Browser origin allowed by CORS. Any origin when unset.
    pub client_origin: Option<HeaderValue>,
}

impl DashboardConfig {
    pub fn new(addr: &str, client_url: Option<&str>) -> Result<Self, ConfigError> {
        let addr = addr.trim().parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            name: "DASHBOARD_ADDR",
            reason: e.to_string(),
        })?;

        let client_origin = match client_url.map(str::trim).filter(|url| !url.is_empty()) {
            // an Origin header never carries a trailing slash
            Some(url) => Some(
                url.trim_end_matches('/')
                    .parse::<HeaderValue>()
                    .map_err(|e| ConfigError::Invalid {
                        name: "CLIENT_URL",
                        reason: e.to_string(),
                    })?,
            ),
            None => None,
        };

        Ok(Self { addr, client_origin })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("DASHBOARD_ADDR").unwrap_or_else(|_| DEFAULT_DASHBOARD_ADDR.to_string());
        let client_url = env::var("CLIENT_URL").ok();
        Self::new(&addr, client_url.as_deref())
    }
}
