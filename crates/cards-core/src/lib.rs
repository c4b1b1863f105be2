pub mod config;

pub use config::{
    Config, ConfigValidationError, LocationConfig, ValidationResult, VersionConfig, VersionField,
    WeatherConfig,
};

use anyhow::Result;

/// Initialize logging for the companion.
///
/// Output goes to stderr; stdout is reserved for the device message stream.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Cards companion core initialized");
    Ok(())
}
