//! Calls travel as `{"method": <name>, "args": <value>}`. Replies are a
//! one-element array for success, a three-element `[code, message, details]`
//! array for errors, and an empty message for an unknown method.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::{MethodCall, MethodResponse};

/// Errors raised while decoding or encoding channel messages.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The bytes are not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A call without a string `method` field.
    #[error("method call is missing a method name")]
    MissingMethod,
    /// A reply that is neither a success nor an error envelope.
    #[error("malformed reply envelope")]
    MalformedReply,
}

/// Decode a method call.
///
/// # Errors
/// Returns [`CodecError::Json`] for invalid JSON and
/// [`CodecError::MissingMethod`] if there is no method name.
pub fn decode_call(message: &[u8]) -> Result<MethodCall, CodecError> {
    let Value::Object(mut object) = serde_json::from_slice::<Value>(message)? else {
        return Err(CodecError::MissingMethod);
    };
    let Some(Value::String(method)) = object.remove("method") else {
        return Err(CodecError::MissingMethod);
    };
    let arguments = object.remove("args").unwrap_or(Value::Null);
    Ok(MethodCall { method, arguments })
}

/// Encode a method call.
///
/// # Errors
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_call(call: &MethodCall) -> Result<Vec<u8>, CodecError> {
    let mut object = Map::new();
    object.insert("method".into(), Value::String(call.method.clone()));
    object.insert("args".into(), call.arguments.clone());
    Ok(serde_json::to_vec(&Value::Object(object))?)
}

/// Encode a reply.
///
/// # Errors
/// Returns [`CodecError::Json`] if serialization fails.
pub fn encode_response(response: &MethodResponse) -> Result<Vec<u8>, CodecError> {
    let envelope = match response {
        MethodResponse::Success(value) => Value::Array(vec![value.clone()]),
        MethodResponse::Error {
            code,
            message,
            details,
        } => Value::Array(vec![
            Value::String(code.clone()),
            Value::String(message.clone()),
            details.clone().unwrap_or(Value::Null),
        ]),
        MethodResponse::NotImplemented => return Ok(Vec::new()),
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode a reply.
///
/// # Errors
/// Returns [`CodecError::Json`] for invalid JSON and
/// [`CodecError::MalformedReply`] for an unrecognised envelope.
pub fn decode_response(message: &[u8]) -> Result<MethodResponse, CodecError> {
    if message.is_empty() {
        return Ok(MethodResponse::NotImplemented);
    }

    let Value::Array(mut items) = serde_json::from_slice::<Value>(message)? else {
        return Err(CodecError::MalformedReply);
    };
    match items.len() {
        1 => Ok(MethodResponse::Success(items.remove(0))),
        3 => {
            let details = items.pop().filter(|details| !details.is_null());
            let message = items.pop();
            let code = items.pop();
            match (code, message) {
                (Some(Value::String(code)), Some(Value::String(message))) => {
                    Ok(MethodResponse::Error {
                        code,
                        message,
                        details,
                    })
                }
                _ => Err(CodecError::MalformedReply),
            }
        }
        _ => Err(CodecError::MalformedReply),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn call_without_args_decodes_to_null_arguments() {
        let call = decode_call(br#"{"method": "requestPermission"}"#).unwrap();

        assert_eq!(call, MethodCall::new("requestPermission"));
    }

    #[test]
    fn call_keeps_arguments() {
        let call = decode_call(br#"{"method": "getCurrentLocation", "args": {"x": 1}}"#).unwrap();

        assert_eq!(call.arguments, json!({"x": 1}));
    }

    #[test]
    fn call_without_method_is_rejected() {
        assert!(matches!(decode_call(br#"{"args": null}"#), Err(CodecError::MissingMethod)));
        assert!(matches!(decode_call(br#"{"method": 3}"#), Err(CodecError::MissingMethod)));
        assert!(matches!(decode_call(b"[]"), Err(CodecError::MissingMethod)));
        assert!(matches!(decode_call(b"{"), Err(CodecError::Json(_))));
    }

    #[test]
    fn success_is_wrapped_in_a_single_element_array() {
        let bytes = encode_response(&MethodResponse::success(true)).unwrap();

        assert_eq!(bytes, b"[true]");
    }

    #[test]
    fn error_carries_code_message_and_null_details() {
        let bytes =
            encode_response(&MethodResponse::error("NO_LOCATION", "Could not fetch location"))
                .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value, json!(["NO_LOCATION", "Could not fetch location", null]));
    }

    #[test]
    fn not_implemented_is_an_empty_reply() {
        assert!(encode_response(&MethodResponse::NotImplemented).unwrap().is_empty());
        assert_eq!(decode_response(b"").unwrap(), MethodResponse::NotImplemented);
    }

    #[test]
    fn error_reply_decodes_back() {
        let reply = decode_response(
            br#"["PERMISSION_DENIED", "Location permission not granted", null]"#,
        )
        .unwrap();

        assert_eq!(
            reply,
            MethodResponse::error("PERMISSION_DENIED", "Location permission not granted")
        );
    }

    #[test]
    fn odd_sized_reply_is_malformed() {
        assert!(matches!(decode_response(b"[1, 2]"), Err(CodecError::MalformedReply)));
        assert!(matches!(decode_response(b"[1, 2, 3]"), Err(CodecError::MalformedReply)));
        assert!(matches!(decode_response(b"{}"), Err(CodecError::MalformedReply)));
    }
}
