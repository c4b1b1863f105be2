use std::sync::Arc;

use anyhow::{Context, Result};
use cards_bridge::{ChannelBridge, InboundMessage, MessageBridge};
use cards_core::Config;
use cards_services::{Companion, LifecycleEvent, VersionChecker};
use cards_weather::{
    CachedLocation, FixedLocation, LocationProvider, PositionOptions, UnavailableLocation,
    WeatherProvider, WeatherRefresher,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Runs the companion against stdio: each stdin line is an inbound app
/// message (a JSON object, or anything else for an empty payload) and each
/// outbound message is written to stdout as one JSON line.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    cards_core::init()?;

    let (config, _) = Config::load_validated()?;

    let location: Arc<dyn LocationProvider> = match config.location.fixed_coordinates() {
        Some((lat, lon)) => Arc::new(CachedLocation::new(FixedLocation::new(lat, lon))),
        None => Arc::new(CachedLocation::new(UnavailableLocation)),
    };

    let (bridge, mut outbound) = ChannelBridge::new();
    let bridge: Arc<dyn MessageBridge> = Arc::new(bridge);

    let provider =
        WeatherProvider::with_timeout(&config.weather.api_url, config.weather.request_timeout())
            .context("Failed to create weather client")?;
    let refresher = WeatherRefresher::new(location, provider, bridge.clone()).with_options(
        PositionOptions {
            timeout: config.location.timeout(),
            maximum_age: config.location.maximum_age(),
        },
    );
    let version =
        VersionChecker::from_config(&config.version).context("Failed to create version client")?;

    let companion = Companion::new(refresher, version, bridge);

    let writer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(message) = outbound.recv().await {
            let line = match message.to_json() {
                Ok(line) => line,
                Err(e) => {
                    tracing::warn!("Failed to encode outbound message: {}", e);
                    continue;
                }
            };
            if let Err(e) = stdout.write_all(format!("{}\n", line).as_bytes()).await {
                tracing::error!("Failed to write outbound message: {}", e);
                break;
            }
            if let Err(e) = stdout.flush().await {
                tracing::error!("Failed to flush outbound message: {}", e);
                break;
            }
        }
    });

    let (events_tx, events_rx) = mpsc::channel(16);
    events_tx
        .send(LifecycleEvent::Ready)
        .await
        .context("Event channel closed before startup")?;

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => continue,
                Ok(Some(line)) => {
                    let message = InboundMessage::from_json(&line).unwrap_or_else(|e| {
                        tracing::warn!("Inbound message is not a JSON object ({}), using empty payload", e);
                        InboundMessage::default()
                    });
                    if events_tx.send(LifecycleEvent::AppMessage(message)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!("Failed to read inbound message: {}", e);
                    break;
                }
            }
        }
    });

    tracing::info!("Cards companion started");
    companion.run(events_rx).await;

    writer.await.context("Outbound writer task failed")?;
    Ok(())
}
