//! Platform-specific permission backends.
//!
//! Hosts without a runtime permission model use
//! [`MemoryPermissions`](crate::MemoryPermissions) instead.

/// Android backend over JNI.
#[cfg(target_os = "android")]
pub mod android;
