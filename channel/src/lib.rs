//! Method-channel dispatcher for the `foss_location` channel.
//!
//! The application layer sends named calls; [`LocationBridge`] routes them
//! to the permission gateway or the provider scan and answers with a
//! [`MethodResponse`]. Two methods exist:
//!
//! | Method | Success | Errors |
//! |---|---|---|
//! | `requestPermission` | `bool` | none |
//! | `getCurrentLocation` | `{latitude, longitude}` | `PERMISSION_DENIED`, `NO_LOCATION` |
//!
//! Any other name is answered with [`MethodResponse::NotImplemented`].

#![warn(missing_docs)]

mod bridge;
/// JSON envelope for method calls and replies.
pub mod codec;
mod config;
mod error;
mod method;
/// Platform-specific glue.
pub mod sys;

pub use bridge::LocationBridge;
pub use codec::CodecError;
pub use config::{BridgeConfig, DEFAULT_CHANNEL};
pub use error::{BridgeError, ConfigError};
pub use method::{Coordinates, Method, MethodCall, MethodResponse};

pub use locbridge_location::{LocationProviders, LocationReading, MemoryProviders};
pub use locbridge_permission::{
    MemoryPermissions, PendingPolicy, Permission, PermissionBackend, PermissionGateway,
    PermissionStatus,
};
