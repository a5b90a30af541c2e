use jni::JNIEnv;
use jni::objects::{JIntArray, JObject};
use jni::sys::jint;
use locbridge_location::LocationError;
use locbridge_location::sys::android::AndroidProviders;
use locbridge_permission::PermissionError;
use locbridge_permission::sys::android::{AndroidPermissions, grant_results_from_array};
use log::warn;
use thiserror::Error;

use crate::{BridgeConfig, LocationBridge};

/// A bridge wired to the Android permission model and `LocationManager`.
pub type AndroidLocationBridge = LocationBridge<AndroidPermissions, AndroidProviders>;

/// Errors that can occur while binding a bridge to an `Activity`.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The permission backend could not be created.
    #[error(transparent)]
    Permission(#[from] PermissionError),
    /// The location service could not be reached.
    #[error(transparent)]
    Location(#[from] LocationError),
}

/// Build a bridge for `activity`.
///
/// # Errors
/// Returns a [`SetupError`] if either platform backend cannot be created.
pub fn bridge_for_activity(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    config: BridgeConfig,
) -> Result<AndroidLocationBridge, SetupError> {
    let permissions = AndroidPermissions::new(env, activity)?;
    let providers = AndroidProviders::new(env, activity)?;
    Ok(LocationBridge::with_config(config, permissions, providers))
}

/// Forward `Activity.onRequestPermissionsResult` to `bridge`.
///
/// Returns `true` if a suspended `requestPermission` call was resolved.
pub fn deliver_permission_result(
    bridge: &AndroidLocationBridge,
    env: &mut JNIEnv<'_>,
    request_code: jint,
    grant_results: &JIntArray<'_>,
) -> bool {
    match grant_results_from_array(env, grant_results) {
        Ok(results) => bridge.on_request_permissions_result(request_code, &results),
        Err(err) => {
            warn!("unreadable grant results for request code {request_code}: {err}");
            bridge.on_request_permissions_result(request_code, &[])
        }
    }
}
