//! Service configuration
//!
//! Loaded from the environment at startup; every value has a development
//! default so the service runs with no configuration at all.

use serde::{Deserialize, Serialize};
use std::env;

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 3000)
    #[serde(default = "default_port")]
    pub port: u16,

    /// API key for the upstream weather provider
    #[serde(default)]
    pub weather_api_key: String,

    /// Seconds a cached weather blob stays fresh (default: 3600)
    #[serde(default = "default_weather_cache_secs")]
    pub weather_cache_secs: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_weather_cache_secs() -> u64 {
    60 * 60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            weather_api_key: String::new(),
            weather_cache_secs: default_weather_cache_secs(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from `HOST`, `PORT`, `WEATHER_API_KEY`, and
    /// `WEATHER_CACHE_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.port),
            weather_api_key: env::var("WEATHER_API_KEY").unwrap_or_default(),
            weather_cache_secs: env::var("WEATHER_CACHE_SECS")
                .ok()
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(defaults.weather_cache_secs),
        }
    }

    /// Create a config with a specific port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
