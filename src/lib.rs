//! # Locbridge
//!
//! Native side of the `foss_location` method channel: a runtime location
//! permission request that resolves once the user answers the system prompt,
//! and a one-shot lookup of the most accurate cached location fix.
//!
//! ## Features
//!
//! Each piece lives in its own crate. Enable only what you need.
//!
//! - `permission`: permission checks and the prompt/response correlator.
//! - `location`: enabled-provider scan and best-accuracy selection.
//! - `channel`: the method-call dispatcher, JSON codec and bridge config.
//!
//! Use the `full` feature to enable everything.
//!
//! ## Example
//!
//! ```toml
//! [dependencies]
//! locbridge = { version = "0.1", features = ["channel"] }
//! ```
//!
//! ```rust,ignore
//! use locbridge::channel::{LocationBridge, MemoryPermissions, MemoryProviders, MethodCall};
//!
//! async fn dispatch() {
//!     let bridge = LocationBridge::new(MemoryPermissions::new(), MemoryProviders::new());
//!     let reply = bridge.handle(&MethodCall::new("getCurrentLocation")).await;
//!     println!("{reply:?}");
//! }
//! ```

#[cfg(feature = "channel")]
pub use locbridge_channel as channel;

#[cfg(feature = "location")]
pub use locbridge_location as location;

#[cfg(feature = "permission")]
pub use locbridge_permission as permission;
