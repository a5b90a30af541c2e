//! Platform-specific bridge construction.

/// Android glue: build a bridge from an `Activity` and feed it permission
/// callbacks.
#[cfg(target_os = "android")]
pub mod android;
