//! Android permission backend using JNI.
//!
//! Talks to the hosting `Activity` directly: `checkSelfPermission` for the
//! current status and `requestPermissions` for the prompt. The activity must
//! forward `onRequestPermissionsResult` to
//! [`PermissionGateway::on_permission_result`](crate::PermissionGateway::on_permission_result),
//! using [`grant_results_from_array`] to convert the `int[]` it receives.

use std::fmt;

use jni::objects::{GlobalRef, JIntArray, JObject, JValue};
use jni::sys::jint;
use jni::{JNIEnv, JavaVM};
use log::warn;

use crate::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// `PackageManager.PERMISSION_GRANTED`.
const PERMISSION_GRANTED: jint = 0;

/// Maps a `PackageManager` grant result to a status.
#[must_use]
pub const fn status_from_grant_result(result: jint) -> PermissionStatus {
    if result == PERMISSION_GRANTED {
        PermissionStatus::Granted
    } else {
        PermissionStatus::Denied
    }
}

/// Reads the `grantResults` array handed to `onRequestPermissionsResult`.
///
/// # Errors
/// Returns a [`PermissionError::Platform`] if the array cannot be read.
pub fn grant_results_from_array(
    env: &mut JNIEnv<'_>,
    results: &JIntArray<'_>,
) -> Result<Vec<PermissionStatus>, PermissionError> {
    let len = env.get_array_length(results).map_err(map_jni_error)?;
    let mut raw = vec![0; usize::try_from(len).unwrap_or_default()];
    env.get_int_array_region(results, 0, &mut raw)
        .map_err(map_jni_error)?;
    Ok(raw.into_iter().map(status_from_grant_result).collect())
}

/// Permission backend bound to an Android `Activity`.
pub struct AndroidPermissions {
    vm: JavaVM,
    activity: GlobalRef,
}

impl fmt::Debug for AndroidPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidPermissions").finish_non_exhaustive()
    }
}

impl AndroidPermissions {
    /// Creates a backend holding a global reference to `activity`.
    ///
    /// # Errors
    /// Returns a [`PermissionError::Platform`] if the VM or the global
    /// reference cannot be obtained.
    pub fn new(env: &JNIEnv<'_>, activity: &JObject<'_>) -> Result<Self, PermissionError> {
        let vm = env.get_java_vm().map_err(map_jni_error)?;
        let activity = env.new_global_ref(activity).map_err(map_jni_error)?;
        Ok(Self { vm, activity })
    }

    fn with_activity<T, F>(&self, action: F) -> Result<T, PermissionError>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self.vm.attach_current_thread().map_err(map_jni_error)?;
        let result = action(&mut *env, self.activity.as_obj());
        if result.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        result.map_err(map_jni_error)
    }
}

impl PermissionBackend for AndroidPermissions {
    fn check(&self, permission: Permission) -> PermissionStatus {
        let result = self.with_activity(|env, activity| {
            let name = env.new_string(permission.android_name())?;
            env.call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[JValue::Object(&name)],
            )?
            .i()
        });

        match result {
            Ok(code) => status_from_grant_result(code),
            Err(err) => {
                warn!("checkSelfPermission({permission:?}) failed: {err}");
                PermissionStatus::NotDetermined
            }
        }
    }

    fn prompt(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        let len = jint::try_from(permissions.len())
            .map_err(|_| PermissionError::Platform("too many permissions".into()))?;

        self.with_activity(|env, activity| {
            let names = env.new_object_array(len, "java/lang/String", JObject::null())?;
            for (index, permission) in (0..).zip(permissions) {
                let name = env.new_string(permission.android_name())?;
                env.set_object_array_element(&names, index, name)?;
            }
            env.call_method(
                activity,
                "requestPermissions",
                "([Ljava/lang/String;I)V",
                &[JValue::Object(&names), JValue::Int(request_code)],
            )?;
            Ok(())
        })
    }
}

fn map_jni_error(err: jni::errors::Error) -> PermissionError {
    PermissionError::Platform(err.to_string())
}
