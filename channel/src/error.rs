use thiserror::Error;

use crate::MethodResponse;

/// Failures reported back to the caller of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// Neither fine nor coarse location is granted.
    #[error("Location permission not granted")]
    PermissionDenied,
    /// Permission is fine but no provider has a cached fix.
    #[error("Could not fetch location")]
    NoLocation,
    /// Another permission request is still waiting for the user.
    #[error("A permission request is already in progress")]
    RequestPending,
}

impl BridgeError {
    /// The error code sent over the channel.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::NoLocation => "NO_LOCATION",
            Self::RequestPending => "PERMISSION_REQUEST_PENDING",
        }
    }
}

impl From<BridgeError> for MethodResponse {
    fn from(err: BridgeError) -> Self {
        Self::error(err.code(), err.to_string())
    }
}

/// Errors that can occur when loading a [`BridgeConfig`](crate::BridgeConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The contents are not a valid configuration.
    #[error("invalid bridge config: {0}")]
    Parse(#[from] serde_json::Error),
}
