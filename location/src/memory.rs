use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::{LocationProviders, LocationReading};

#[derive(Debug, Clone)]
struct ProviderEntry {
    name: String,
    enabled: bool,
    reading: Option<LocationReading>,
}

/// Provider set held in memory, listed in insertion order.
#[derive(Debug, Default)]
pub struct MemoryProviders {
    entries: Mutex<Vec<ProviderEntry>>,
}

impl MemoryProviders {
    /// Creates an empty provider set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enabled provider named after `reading.provider`, caching `reading`.
    #[must_use]
    pub fn with_reading(self, reading: LocationReading) -> Self {
        let name = reading.provider.clone();
        self.set_reading(&name, Some(reading));
        self
    }

    /// Add an enabled provider with nothing cached.
    #[must_use]
    pub fn with_empty_provider(self, name: &str) -> Self {
        self.set_reading(name, None);
        self
    }

    /// Replace the cached fix of `name`, adding the provider if needed.
    pub fn set_reading(&self, name: &str, reading: Option<LocationReading>) {
        let mut entries = self.entries();
        match entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.reading = reading,
            None => entries.push(ProviderEntry {
                name: name.to_owned(),
                enabled: true,
                reading,
            }),
        }
    }

    /// Enable or disable `name`. Unknown providers are ignored.
    pub fn set_enabled(&self, name: &str, enabled: bool) {
        if let Some(entry) = self.entries().iter_mut().find(|entry| entry.name == name) {
            entry.enabled = enabled;
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<ProviderEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LocationProviders for MemoryProviders {
    fn enabled_providers(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.name.clone())
            .collect()
    }

    fn last_known(&self, provider: &str) -> Option<LocationReading> {
        self.entries()
            .iter()
            .find(|entry| entry.name == provider)
            .and_then(|entry| entry.reading.clone())
    }
}
