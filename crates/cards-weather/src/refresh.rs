//! One weather refresh: locate, fetch, compare, deliver.

use std::sync::Arc;

use cards_bridge::{MessageBridge, OutboundMessage};
use parking_lot::Mutex;

use crate::location::LocationProvider;
use crate::provider::WeatherProvider;
use crate::snapshot::WeatherSnapshot;
use crate::types::{PositionOptions, WeatherError, WeatherReport};

/// Result of a refresh that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Values changed and were handed to the bridge
    Sent(WeatherReport),
    /// Values matched the snapshot; nothing was sent
    Unchanged,
    /// No position; the error signal was sent instead
    LocationUnavailable,
}

pub struct WeatherRefresher {
    location: Arc<dyn LocationProvider>,
    provider: WeatherProvider,
    bridge: Arc<dyn MessageBridge>,
    snapshot: Arc<Mutex<WeatherSnapshot>>,
    options: PositionOptions,
}

impl WeatherRefresher {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        provider: WeatherProvider,
        bridge: Arc<dyn MessageBridge>,
    ) -> Self {
        Self {
            location,
            provider,
            bridge,
            snapshot: Arc::new(Mutex::new(WeatherSnapshot::new())),
            options: PositionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    /// Last delivered report
    pub fn last_sent(&self) -> Option<WeatherReport> {
        self.snapshot.lock().last().cloned()
    }

    /// Run one refresh.
    ///
    /// Sends at most one message. Fetch and parse failures leave the
    /// snapshot untouched and send nothing.
    pub async fn refresh(&self) -> Result<RefreshOutcome, WeatherError> {
        let position = match self.location.current_position(&self.options).await {
            Ok(pos) => pos,
            Err(e) => {
                tracing::warn!("Position unavailable: {}", e);
                self.deliver(OutboundMessage::location_error()).await;
                return Ok(RefreshOutcome::LocationUnavailable);
            }
        };

        let report = self.provider.fetch(position.coords).await?;

        // Overlapping refreshes may finish out of order; the last to finish wins.
        let changed = self.snapshot.lock().update(&report);
        if !changed {
            tracing::debug!("Weather unchanged, nothing to send");
            return Ok(RefreshOutcome::Unchanged);
        }

        let message = OutboundMessage::weather(
            &report.location,
            &report.conditions,
            report.temperature_celsius,
        );
        tracing::debug!("Dict: {:?}", message);

        if self.deliver(message).await {
            tracing::info!("Weather fetch complete!");
        }
        Ok(RefreshOutcome::Sent(report))
    }

    async fn deliver(&self, message: OutboundMessage) -> bool {
        match self.bridge.send(message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to deliver message to device: {}", e);
                false
            }
        }
    }
}
