//! Weather refresh for the Cards companion
//!
//! Resolves the device position, queries an OpenWeatherMap-style endpoint,
//! and forwards changed readings over the device message bridge.

pub mod location;
pub mod provider;
pub mod refresh;
pub mod snapshot;
pub mod types;

pub use location::{CachedLocation, FixedLocation, LocationProvider, UnavailableLocation};
pub use provider::WeatherProvider;
pub use refresh::{RefreshOutcome, WeatherRefresher};
pub use snapshot::WeatherSnapshot;
pub use types::*;
