//! Best-accuracy lookup over cached location fixes.
//!
//! No live fix is ever requested. [`best_known_location`] walks the enabled
//! providers, reads whatever each one has cached and keeps the most accurate
//! reading. The result may be arbitrarily old, or absent if nothing on the
//! device has produced a fix yet.

#![warn(missing_docs)]

mod memory;
/// Platform-specific implementations.
pub mod sys;

use std::sync::Arc;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub use memory::MemoryProviders;

/// Well-known provider names.
pub mod provider {
    /// Satellite positioning.
    pub const GPS: &str = "gps";
    /// Cell tower and Wi-Fi positioning.
    pub const NETWORK: &str = "network";
    /// Fixes requested by other apps.
    pub const PASSIVE: &str = "passive";
}

/// A cached fix from a single provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReading {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,
    /// Estimated horizontal error radius in meters. Lower is better.
    pub accuracy: f32,
    /// Name of the provider that produced the fix.
    pub provider: String,
    /// Time of the fix as Unix epoch milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

impl LocationReading {
    /// Creates a reading with a zero timestamp.
    pub fn new(provider: impl Into<String>, latitude: f64, longitude: f64, accuracy: f32) -> Self {
        Self {
            latitude,
            longitude,
            accuracy,
            provider: provider.into(),
            timestamp: 0,
        }
    }

    /// Set the time of the fix.
    #[must_use]
    pub const fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Errors raised while binding to a platform location service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    /// The platform has no location service.
    #[error("location service unavailable")]
    ServiceUnavailable,
    /// A platform call failed.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Access to the device's location providers and their caches.
pub trait LocationProviders: Send + Sync {
    /// Names of the providers that are currently enabled, in platform order.
    fn enabled_providers(&self) -> Vec<String>;

    /// The last fix `provider` has cached, if any.
    fn last_known(&self, provider: &str) -> Option<LocationReading>;
}

impl<T: LocationProviders + ?Sized> LocationProviders for Arc<T> {
    fn enabled_providers(&self) -> Vec<String> {
        (**self).enabled_providers()
    }

    fn last_known(&self, provider: &str) -> Option<LocationReading> {
        (**self).last_known(provider)
    }
}

/// The most accurate cached reading across all enabled providers.
///
/// A reading replaces the current best only if its accuracy is strictly
/// smaller, so ties keep the provider listed first. Returns `None` if no
/// enabled provider has a cached fix.
pub fn best_known_location<P>(providers: &P) -> Option<LocationReading>
where
    P: LocationProviders + ?Sized,
{
    let enabled = providers.enabled_providers();
    debug!("scanning {} enabled location providers", enabled.len());

    enabled
        .iter()
        .filter_map(|name| {
            let reading = providers.last_known(name);
            trace!("{name}: {reading:?}");
            reading
        })
        .fold(None, |best: Option<LocationReading>, candidate| match best {
            Some(best) if candidate.accuracy < best.accuracy => Some(candidate),
            Some(best) => Some(best),
            None => Some(candidate),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_accurate_reading_wins() {
        let providers = MemoryProviders::new()
            .with_reading(LocationReading::new(provider::NETWORK, 1.0, 2.0, 50.0))
            .with_reading(LocationReading::new(provider::GPS, 3.0, 4.0, 10.0));

        let best = best_known_location(&providers).unwrap();

        assert_eq!(best.provider, provider::GPS);
        assert_eq!((best.latitude, best.longitude), (3.0, 4.0));
    }

    #[test]
    fn tie_keeps_first_listed_provider() {
        let providers = MemoryProviders::new()
            .with_reading(LocationReading::new(provider::NETWORK, 1.0, 1.0, 20.0))
            .with_reading(LocationReading::new(provider::GPS, 2.0, 2.0, 20.0));

        assert_eq!(best_known_location(&providers).unwrap().provider, provider::NETWORK);
    }

    #[test]
    fn providers_without_cache_are_skipped() {
        let providers = MemoryProviders::new()
            .with_empty_provider(provider::GPS)
            .with_reading(LocationReading::new(provider::PASSIVE, 5.0, 6.0, 500.0));

        assert_eq!(best_known_location(&providers).unwrap().provider, provider::PASSIVE);
    }

    #[test]
    fn nothing_cached_yields_none() {
        let providers = MemoryProviders::new()
            .with_empty_provider(provider::GPS)
            .with_empty_provider(provider::NETWORK);

        assert_eq!(best_known_location(&providers), None);
        assert_eq!(best_known_location(&MemoryProviders::new()), None);
    }

    #[test]
    fn disabled_provider_is_ignored_even_if_cached() {
        let providers = MemoryProviders::new()
            .with_reading(LocationReading::new(provider::GPS, 1.0, 1.0, 3.0))
            .with_reading(LocationReading::new(provider::NETWORK, 2.0, 2.0, 40.0));
        providers.set_enabled(provider::GPS, false);

        assert_eq!(best_known_location(&providers).unwrap().provider, provider::NETWORK);
    }

    #[test]
    fn nan_accuracy_never_replaces_a_candidate() {
        let providers = MemoryProviders::new()
            .with_reading(LocationReading::new(provider::GPS, 1.0, 1.0, 30.0))
            .with_reading(LocationReading::new(provider::NETWORK, 2.0, 2.0, f32::NAN));

        assert_eq!(best_known_location(&providers).unwrap().provider, provider::GPS);
    }

    #[test]
    fn reading_deserializes_without_timestamp() {
        let reading: LocationReading = serde_json::from_str(
            r#"{"latitude": 52.5, "longitude": 13.4, "accuracy": 12.5, "provider": "gps"}"#,
        )
        .unwrap();

        assert_eq!(reading, LocationReading::new(provider::GPS, 52.5, 13.4, 12.5));
    }
}
