use std::path::Path;

use locbridge_permission::{DEFAULT_REQUEST_CODE, PendingPolicy};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Channel name the application layer talks to.
pub const DEFAULT_CHANNEL: &str = "foss_location";

/// Settings for a [`LocationBridge`](crate::LocationBridge).
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Method channel name, used for registration and log lines.
    pub channel: String,
    /// Request code tagging the permission prompt.
    pub request_code: i32,
    /// How to treat a permission request that overlaps a pending one.
    pub pending_policy: PendingPolicy,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            channel: DEFAULT_CHANNEL.to_owned(),
            request_code: DEFAULT_REQUEST_CODE,
            pending_policy: PendingPolicy::Overwrite,
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown fields.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON configuration file.
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        assert_eq!(BridgeConfig::from_json("{}").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config =
            BridgeConfig::from_json(r#"{"request_code": 7, "pending_policy": "reject"}"#).unwrap();

        assert_eq!(config.channel, DEFAULT_CHANNEL);
        assert_eq!(config.request_code, 7);
        assert_eq!(config.pending_policy, PendingPolicy::Reject);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = BridgeConfig::from_json(r#"{"timeout_ms": 500}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BridgeConfig::load("/nonexistent/locbridge.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
