//! OpenWeatherMap-backed provider

use async_trait::async_trait;
use serde_json::Value;

use super::{WeatherError, WeatherProvider};

const API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather provider calling the OpenWeatherMap current-weather endpoint.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    api_key: String,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn fetch(&self, lat: &str, lon: &str) -> Result<Value, WeatherError> {
        let response = self
            .http
            .get(API_URL)
            .query(&[
                ("units", "imperial"),
                ("lat", lat),
                ("lon", lon),
                ("appid", &self.api_key),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(WeatherError::Upstream(response.status().as_u16()));
        }

        response
            .json()
            .await
            .map_err(|e| WeatherError::Transport(e.to_string()))
    }
}
