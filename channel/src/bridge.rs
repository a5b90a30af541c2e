use std::fmt;
use std::sync::Arc;

use locbridge_location::{LocationProviders, best_known_location};
use locbridge_permission::{
    Permission, PermissionBackend, PermissionError, PermissionGateway, PermissionRequest,
    PermissionStatus,
};
use log::{debug, info, warn};

use crate::{
    BridgeConfig, BridgeError, CodecError, Coordinates, Method, MethodCall, MethodResponse, codec,
};

/// Routes channel calls to the permission gateway and the provider scan.
///
/// The gateway is shared behind an [`Arc`] so the code receiving the
/// operating system's permission callback can reach it while a
/// `requestPermission` call is suspended.
pub struct LocationBridge<P, L> {
    config: BridgeConfig,
    gateway: Arc<PermissionGateway<P>>,
    providers: L,
}

impl<P, L> fmt::Debug for LocationBridge<P, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationBridge")
            .field("config", &self.config)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

impl<P: PermissionBackend, L: LocationProviders> LocationBridge<P, L> {
    /// Creates a bridge with the default configuration.
    pub fn new(permissions: P, providers: L) -> Self {
        Self::with_config(BridgeConfig::default(), permissions, providers)
    }

    /// Creates a bridge using `config`.
    pub fn with_config(config: BridgeConfig, permissions: P, providers: L) -> Self {
        let gateway = PermissionGateway::new(permissions)
            .with_request_code(config.request_code)
            .with_policy(config.pending_policy);
        Self {
            config,
            gateway: Arc::new(gateway),
            providers,
        }
    }

    /// The configuration in use.
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The permission gateway.
    pub const fn gateway(&self) -> &Arc<PermissionGateway<P>> {
        &self.gateway
    }

    /// The location providers.
    pub const fn providers(&self) -> &L {
        &self.providers
    }

    /// Answer a single call.
    ///
    /// `requestPermission` may suspend until the user answers the prompt;
    /// everything else completes without waiting.
    pub async fn handle(&self, call: &MethodCall) -> MethodResponse {
        let Some(method) = Method::from_name(&call.method) else {
            debug!("{}: `{}` is not implemented", self.config.channel, call.method);
            return MethodResponse::NotImplemented;
        };
        debug!("{}: dispatching {}", self.config.channel, method.name());

        match method {
            Method::RequestPermission => match self.request_permission() {
                Ok(request) => MethodResponse::success(request.await),
                Err(err) => err.into(),
            },
            Method::GetCurrentLocation => match self.current_location() {
                Ok(coordinates) => MethodResponse::success(coordinates),
                Err(err) => err.into(),
            },
        }
    }

    /// Decode `message`, answer it, and encode the reply.
    ///
    /// # Errors
    /// Returns a [`CodecError`] if the call cannot be decoded or the reply
    /// cannot be encoded.
    pub async fn handle_message(&self, message: &[u8]) -> Result<Vec<u8>, CodecError> {
        let call = codec::decode_call(message)?;
        let response = self.handle(&call).await;
        codec::encode_response(&response)
    }

    /// Start a fine location permission request.
    ///
    /// # Errors
    /// Returns [`BridgeError::RequestPending`] if the configured policy
    /// rejects overlapping requests and one is already waiting.
    pub fn request_permission(&self) -> Result<PermissionRequest, BridgeError> {
        self.gateway
            .request_grant(Permission::FineLocation)
            .map_err(|err| {
                // Prompt failures resolve the request to `false`; only an
                // overlapping request is refused.
                debug_assert_eq!(err, PermissionError::RequestPending);
                BridgeError::RequestPending
            })
    }

    /// The coordinates of the most accurate cached fix.
    ///
    /// # Errors
    /// Returns [`BridgeError::PermissionDenied`] without touching any
    /// provider if neither fine nor coarse location is granted, and
    /// [`BridgeError::NoLocation`] if no enabled provider has a cached fix.
    pub fn current_location(&self) -> Result<Coordinates, BridgeError> {
        if !self.gateway.check_granted(Permission::FineLocation)
            && !self.gateway.check_granted(Permission::CoarseLocation)
        {
            warn!("location requested without permission");
            return Err(BridgeError::PermissionDenied);
        }

        let reading = best_known_location(&self.providers).ok_or(BridgeError::NoLocation)?;
        info!(
            "best cached fix from {} (accuracy {}m)",
            reading.provider, reading.accuracy
        );
        Ok(Coordinates {
            latitude: reading.latitude,
            longitude: reading.longitude,
        })
    }

    /// Forward the operating system's answer to a permission prompt.
    ///
    /// Returns `true` if a suspended `requestPermission` call was resolved.
    pub fn on_request_permissions_result(
        &self,
        request_code: i32,
        grant_results: &[PermissionStatus],
    ) -> bool {
        self.gateway.on_permission_result(request_code, grant_results)
    }
}
