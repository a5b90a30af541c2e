//! Location permission checks and prompt/response correlation.
//!
//! The operating system owns the permission state. This crate only observes
//! it through a [`PermissionBackend`] and asks for transitions by showing the
//! system prompt. [`PermissionGateway`] turns the callback-style answer to
//! that prompt into a future the caller can await.

#![warn(missing_docs)]

mod gateway;
/// In-memory backend for hosts without a runtime permission model.
pub mod memory;
/// Platform-specific implementations.
pub mod sys;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use gateway::{
    DEFAULT_REQUEST_CODE, GatewayState, PendingPolicy, PermissionGateway, PermissionRequest,
};
pub use memory::MemoryPermissions;

/// Location permissions the bridge can check or request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
    /// Precise location (satellite-grade fixes).
    FineLocation,
    /// Approximate location (network-grade fixes).
    CoarseLocation,
}

impl Permission {
    /// The Android manifest name of this permission.
    #[must_use]
    pub const fn android_name(self) -> &'static str {
        match self {
            Self::FineLocation => "android.permission.ACCESS_FINE_LOCATION",
            Self::CoarseLocation => "android.permission.ACCESS_COARSE_LOCATION",
        }
    }
}

/// The current status of a permission, as reported by the operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PermissionStatus {
    /// Permission has been granted by the user.
    Granted,
    /// Permission has been denied by the user.
    Denied,
    /// Permission has not been requested yet.
    #[default]
    NotDetermined,
}

impl PermissionStatus {
    /// Returns `true` for [`PermissionStatus::Granted`].
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Errors that can occur when requesting permissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PermissionError {
    /// Another request is still waiting for the user's decision.
    #[error("a permission request is already in progress")]
    RequestPending,
    /// The platform failed to check or prompt.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Access to the operating system's permission model.
///
/// `prompt` only has to show the system dialog. The user's answer comes back
/// later through [`PermissionGateway::on_permission_result`], keyed by the
/// same `request_code`.
pub trait PermissionBackend: Send + Sync {
    /// Current status of `permission`. Never shows UI.
    fn check(&self, permission: Permission) -> PermissionStatus;

    /// Show the system prompt for `permissions`.
    ///
    /// # Errors
    /// Returns a [`PermissionError::Platform`] if the prompt could not be shown.
    fn prompt(&self, permissions: &[Permission], request_code: i32)
    -> Result<(), PermissionError>;
}

impl<T: PermissionBackend + ?Sized> PermissionBackend for Arc<T> {
    fn check(&self, permission: Permission) -> PermissionStatus {
        (**self).check(permission)
    }

    fn prompt(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        (**self).prompt(permissions, request_code)
    }
}
