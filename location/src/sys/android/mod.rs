//! Android location providers using JNI.
//!
//! Reads straight from the system `LocationManager`: `getProviders(true)`
//! for the enabled set and `getLastKnownLocation` for each cache. The host
//! must already hold `ACCESS_FINE_LOCATION` or `ACCESS_COARSE_LOCATION`.

use std::fmt;

use jni::objects::{GlobalRef, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use log::warn;

use crate::{LocationError, LocationProviders, LocationReading};

/// `Context.LOCATION_SERVICE`.
const LOCATION_SERVICE: &str = "location";

/// Location providers backed by the system `LocationManager`.
pub struct AndroidProviders {
    vm: JavaVM,
    manager: GlobalRef,
}

impl fmt::Debug for AndroidProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AndroidProviders").finish_non_exhaustive()
    }
}

impl AndroidProviders {
    /// Looks up the `LocationManager` through `context`.
    ///
    /// # Errors
    /// Returns an error if the service is unavailable or a JNI call fails.
    pub fn new(env: &mut JNIEnv<'_>, context: &JObject<'_>) -> Result<Self, LocationError> {
        let vm = env.get_java_vm()?;
        let service_name = env.new_string(LOCATION_SERVICE)?;
        let manager = env
            .call_method(
                context,
                "getSystemService",
                "(Ljava/lang/String;)Ljava/lang/Object;",
                &[JValue::Object(&service_name)],
            )?
            .l()?;
        if manager.is_null() {
            return Err(LocationError::ServiceUnavailable);
        }
        let manager = env.new_global_ref(manager)?;
        Ok(Self { vm, manager })
    }

    fn with_manager<T, F>(&self, action: F) -> jni::errors::Result<T>
    where
        F: FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> jni::errors::Result<T>,
    {
        let mut env = self.vm.attach_current_thread()?;
        let result = action(&mut *env, self.manager.as_obj());
        if result.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_clear();
        }
        result
    }
}

impl LocationProviders for AndroidProviders {
    fn enabled_providers(&self) -> Vec<String> {
        let result = self.with_manager(|env, manager| {
            let list = env
                .call_method(
                    manager,
                    "getProviders",
                    "(Z)Ljava/util/List;",
                    &[JValue::Bool(1)],
                )?
                .l()?;
            let size = env.call_method(&list, "size", "()I", &[])?.i()?;

            let capacity = usize::try_from(size).unwrap_or_default();
            let mut names: Vec<String> = Vec::with_capacity(capacity);
            for index in 0..size {
                let item = env
                    .call_method(&list, "get", "(I)Ljava/lang/Object;", &[JValue::Int(index)])?
                    .l()?;
                let item = JString::from(item);
                names.push(env.get_string(&item)?.into());
                env.delete_local_ref(item)?;
            }
            Ok(names)
        });

        result.unwrap_or_else(|err| {
            warn!("getProviders failed: {err}");
            Vec::new()
        })
    }

    fn last_known(&self, provider: &str) -> Option<LocationReading> {
        let result = self.with_manager(|env, manager| {
            let name = env.new_string(provider)?;
            let location = env
                .call_method(
                    manager,
                    "getLastKnownLocation",
                    "(Ljava/lang/String;)Landroid/location/Location;",
                    &[JValue::Object(&name)],
                )?
                .l()?;
            if location.is_null() {
                return Ok(None);
            }

            let latitude = env.call_method(&location, "getLatitude", "()D", &[])?.d()?;
            let longitude = env.call_method(&location, "getLongitude", "()D", &[])?.d()?;
            let accuracy = env.call_method(&location, "getAccuracy", "()F", &[])?.f()?;
            let time = env.call_method(&location, "getTime", "()J", &[])?.j()?;

            Ok(Some(
                LocationReading::new(provider, latitude, longitude, accuracy)
                    .at(u64::try_from(time).unwrap_or_default()),
            ))
        });

        result.unwrap_or_else(|err| {
            warn!("getLastKnownLocation({provider}) failed: {err}");
            None
        })
    }
}

impl From<jni::errors::Error> for LocationError {
    fn from(err: jni::errors::Error) -> Self {
        Self::Platform(err.to_string())
    }
}
