//! Platform-specific provider implementations.

/// Android backend over `android.location.LocationManager`.
#[cfg(target_os = "android")]
pub mod android;
