//! Errors surfaced by lifecycle handlers.

use cards_bridge::BridgeError;
use cards_weather::WeatherError;
use thiserror::Error;

use crate::version::VersionError;

#[derive(Debug, Error)]
pub enum CompanionError {
    #[error("Weather refresh failed: {0}")]
    Weather(#[from] WeatherError),

    #[error("Version check failed: {0}")]
    Version(#[from] VersionError),

    #[error("Message bridge failed: {0}")]
    Bridge(#[from] BridgeError),
}

impl CompanionError {
    /// Short description for log summaries.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Weather(WeatherError::Network(_)) | Self::Version(VersionError::Network(_)) => {
                "Network error. Check your connection."
            }
            Self::Weather(WeatherError::Status(_)) | Self::Version(VersionError::Status(_)) => {
                "The server returned an error."
            }
            Self::Weather(WeatherError::Parse(_)) | Self::Version(VersionError::Parse(_)) => {
                "Received an unexpected response."
            }
            Self::Bridge(_) => "The watch did not accept the message.",
        }
    }
}
