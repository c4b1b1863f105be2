use crate::types::{ApiResponse, Coordinates, WeatherError, WeatherReport};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Client for an OpenWeatherMap-style current-weather endpoint
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_url: String,
}

impl WeatherProvider {
    pub fn new(api_url: &str) -> Result<Self, WeatherError> {
        Self::with_timeout(api_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(api_url: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_url: api_url.to_string(),
        })
    }

    /// Fetch current weather at `coords` and derive the delivered fields
    #[instrument(skip(self), level = "info")]
    pub async fn fetch(&self, coords: Coordinates) -> Result<WeatherReport, WeatherError> {
        tracing::info!(
            "Getting weather from: {}?lat={}&lon={}",
            self.api_url,
            coords.latitude,
            coords.longitude
        );

        let response = self
            .client
            .get(&self.api_url)
            .query(&[("lat", coords.latitude), ("lon", coords.longitude)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        tracing::debug!("Weather response: {}", body);

        let raw: ApiResponse = serde_json::from_str(&body)?;
        WeatherReport::from_response(raw)
    }
}
