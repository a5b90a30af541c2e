use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Methods the bridge understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Ask for fine location permission.
    RequestPermission,
    /// Read the most accurate cached fix.
    GetCurrentLocation,
}

impl Method {
    /// Looks up a method by its channel name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "requestPermission" => Some(Self::RequestPermission),
            "getCurrentLocation" => Some(Self::GetCurrentLocation),
            _ => None,
        }
    }

    /// The channel name of this method.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RequestPermission => "requestPermission",
            Self::GetCurrentLocation => "getCurrentLocation",
        }
    }
}

/// A named call from the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    /// Method name.
    pub method: String,
    /// Call arguments. The location methods take none.
    pub arguments: Value,
}

impl MethodCall {
    /// Creates a call without arguments.
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            arguments: Value::Null,
        }
    }

    /// Attach arguments to the call.
    #[must_use]
    pub fn with_arguments(mut self, arguments: Value) -> Self {
        self.arguments = arguments;
        self
    }
}

/// The answer to a [`MethodCall`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodResponse {
    /// The call succeeded.
    Success(Value),
    /// The call ran and failed.
    Error {
        /// Machine-readable error code.
        code: String,
        /// Human-readable description.
        message: String,
        /// Extra error payload.
        details: Option<Value>,
    },
    /// No such method. Distinct from a failed call.
    NotImplemented,
}

impl MethodResponse {
    /// A successful reply carrying `value`.
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success(value.into())
    }

    /// A failure reply without details.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// The error code, if this is an error reply.
    #[must_use]
    pub fn error_code(&self) -> Option<&str> {
        match self {
            Self::Error { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns `true` for [`MethodResponse::NotImplemented`].
    #[must_use]
    pub const fn is_not_implemented(&self) -> bool {
        matches!(self, Self::NotImplemented)
    }
}

/// Coordinates returned by `getCurrentLocation`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl From<Coordinates> for Value {
    fn from(coordinates: Coordinates) -> Self {
        serde_json::to_value(coordinates).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_names_are_case_sensitive() {
        assert_eq!(Method::from_name("getCurrentLocation"), Some(Method::GetCurrentLocation));
        assert_eq!(Method::from_name("GetCurrentLocation"), None);
        assert_eq!(Method::from_name("pingLocation"), None);
    }

    #[test]
    fn coordinates_become_a_two_field_map() {
        let value = Value::from(Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        });

        assert_eq!(value, json!({"latitude": 48.85, "longitude": 2.35}));
    }
}
