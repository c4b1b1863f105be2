use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const KELVIN_OFFSET: f64 = 273.15;

/// Geographic coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A position fix reported by a location provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coords: Coordinates,
    pub accuracy_meters: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Position {
    pub fn now(coords: Coordinates) -> Self {
        Self {
            coords,
            accuracy_meters: None,
            timestamp: Utc::now(),
        }
    }

    /// Time elapsed since the fix was taken; zero for fixes in the future
    pub fn age(&self) -> Duration {
        (Utc::now() - self.timestamp).to_std().unwrap_or_default()
    }
}

/// Options for a single position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Longest wait for a fresh fix
    pub timeout: Duration,
    /// Oldest cached fix that may be returned instead of a fresh one
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(15_000),
            maximum_age: Duration::from_millis(60_000),
        }
    }
}

/// The three fields delivered to the watchface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub location: String,
    pub conditions: String,
    pub temperature_celsius: i32,
}

impl WeatherReport {
    /// Derive the delivered fields from a raw API response
    pub fn from_response(response: ApiResponse) -> Result<Self, WeatherError> {
        let description = response
            .weather
            .into_iter()
            .next()
            .map(|w| w.description)
            .ok_or_else(|| WeatherError::Parse("response has no weather entries".to_string()))?;

        Ok(Self {
            location: response.name,
            conditions: capitalize_first(&description),
            temperature_celsius: kelvin_to_celsius(response.main.temp),
        })
    }
}

/// Upper-case the first character, leaving the rest untouched
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convert Kelvin to whole degrees Celsius, rounding halves up
pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
    (kelvin - KELVIN_OFFSET + 0.5).floor() as i32
}

/// Current-weather response body
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub name: String,
    pub weather: Vec<ApiCondition>,
    pub main: ApiMain,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCondition {
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMain {
    /// Kelvin
    pub temp: f64,
}

/// Location service errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Weather API returned status {0}")]
    Status(u16),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for WeatherError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
