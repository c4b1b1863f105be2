//! Lifecycle trigger.
//!
//! `Ready` runs a weather refresh and the version check; every inbound app
//! message runs another refresh. Each event is handled on its own task, so
//! refreshes may overlap; nothing is de-duplicated or cancelled.

use std::sync::Arc;

use cards_bridge::{InboundMessage, MessageBridge, OutboundMessage};
use cards_weather::{RefreshOutcome, WeatherRefresher};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::CompanionError;
use crate::version::{VersionChecker, VersionStatus};

#[derive(Debug, Clone)]
pub enum LifecycleEvent {
    /// The companion process is ready
    Ready,
    /// The watch sent a message
    AppMessage(InboundMessage),
}

#[derive(Clone)]
pub struct Companion {
    refresher: Arc<WeatherRefresher>,
    version: Arc<VersionChecker>,
    bridge: Arc<dyn MessageBridge>,
}

impl Companion {
    pub fn new(
        refresher: WeatherRefresher,
        version: VersionChecker,
        bridge: Arc<dyn MessageBridge>,
    ) -> Self {
        Self {
            refresher: Arc::new(refresher),
            version: Arc::new(version),
            bridge,
        }
    }

    pub fn refresher(&self) -> &WeatherRefresher {
        &self.refresher
    }

    pub async fn refresh_weather(&self) -> Result<RefreshOutcome, CompanionError> {
        Ok(self.refresher.refresh().await?)
    }

    /// Check the published version and signal the watch on mismatch
    pub async fn check_version(&self) -> Result<VersionStatus, CompanionError> {
        let status = self.version.check().await?;
        if matches!(status, VersionStatus::UpdateAvailable { .. }) {
            self.bridge.send(OutboundMessage::update_available()).await?;
        }
        Ok(status)
    }

    /// Handle one lifecycle event to completion.
    ///
    /// Failures are logged and go no further.
    pub async fn dispatch(&self, event: LifecycleEvent) {
        match event {
            LifecycleEvent::Ready => {
                tracing::info!("Companion ready");
                let (weather, version) = tokio::join!(self.refresh_weather(), self.check_version());
                log_result("weather refresh", weather);
                log_result("version check", version);
            }
            LifecycleEvent::AppMessage(message) => {
                tracing::debug!("App message received: {:?}", message.payload);
                log_result("weather refresh", self.refresh_weather().await);
            }
        }
    }

    /// Handle events until the channel closes, then wait for in-flight handlers.
    pub async fn run(self, mut events: mpsc::Receiver<LifecycleEvent>) {
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => {
                        let companion = self.clone();
                        tasks.spawn(async move { companion.dispatch(event).await });
                    }
                    None => break,
                },
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        tracing::error!("Event handler task failed: {}", e);
                    }
                }
            }
        }

        tracing::debug!("Event channel closed, waiting for {} handlers", tasks.len());
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Event handler task failed: {}", e);
            }
        }
        tracing::info!("Companion stopped");
    }
}

fn log_result<T: std::fmt::Debug>(what: &str, result: Result<T, CompanionError>) {
    match result {
        Ok(value) => tracing::debug!("{} finished: {:?}", what, value),
        Err(e) => tracing::error!("{} aborted: {} ({})", what, e, e.user_message()),
    }
}
