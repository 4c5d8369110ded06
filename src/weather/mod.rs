//! External weather lookup
//!
//! The provider sits behind a trait so handlers and tests never depend on
//! the upstream API directly. Responses are cached in the store by the
//! HTTP layer.

mod openweather;

pub use openweather::OpenWeatherClient;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from the upstream weather API
#[derive(Debug, Clone, Error)]
pub enum WeatherError {
    /// The provider answered with a non-success status
    #[error("weather provider returned status {0}")]
    Upstream(u16),

    /// The request never completed or the body was unreadable
    #[error("weather request failed: {0}")]
    Transport(String),
}

/// A source of current weather for a coordinate pair.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn fetch(&self, lat: &str, lon: &str) -> Result<Value, WeatherError>;
}
