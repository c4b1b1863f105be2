//! Geolocation capability.
//!
//! Platform position sources sit behind `LocationProvider`; `CachedLocation`
//! adds the `maximum_age` and `timeout` semantics of a position request.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::{Coordinates, LocationError, Position, PositionOptions};

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError>;
}

/// Reports a configured position, stamped at request time
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation {
    coords: Coordinates,
}

impl FixedLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            coords: Coordinates {
                latitude,
                longitude,
            },
        }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Ok(Position::now(self.coords))
    }
}

/// Used when no position source exists on this host
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLocation;

#[async_trait]
impl LocationProvider for UnavailableLocation {
    async fn current_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Reuses the last fix while it is younger than `maximum_age` and bounds
/// fresh lookups by `timeout`.
#[derive(Debug)]
pub struct CachedLocation<P> {
    inner: P,
    last: Mutex<Option<Position>>,
}

impl<P: LocationProvider> CachedLocation<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }

    fn cached(&self, maximum_age: std::time::Duration) -> Option<Position> {
        self.last
            .lock()
            .as_ref()
            .filter(|pos| pos.age() <= maximum_age)
            .cloned()
    }
}

#[async_trait]
impl<P: LocationProvider> LocationProvider for CachedLocation<P> {
    async fn current_position(&self, options: &PositionOptions) -> Result<Position, LocationError> {
        if let Some(pos) = self.cached(options.maximum_age) {
            tracing::debug!("Using cached position ({:?} old)", pos.age());
            return Ok(pos);
        }

        let pos = tokio::time::timeout(options.timeout, self.inner.current_position(options))
            .await
            .map_err(|_| LocationError::Timeout)??;

        *self.last.lock() = Some(pos.clone());
        Ok(pos)
    }
}
