use std::env;

/// Connection settings for the rental backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 30,
            user_agent: format!("drivio-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Build from `DRIVIO_API_BASE_URL` / `DRIVIO_API_TIMEOUT_SECS`, falling
    /// back to the defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("DRIVIO_API_BASE_URL") {
            if !url.is_empty() {
                config.base_url = url;
            }
        }
        if let Some(secs) = env::var("DRIVIO_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout_secs = secs;
        }
        config
    }
}
