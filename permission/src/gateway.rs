use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::channel::oneshot;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// Request code reserved for the location permission prompt.
pub const DEFAULT_REQUEST_CODE: i32 = 1001;

/// What to do with a permission request that arrives while another one is
/// still waiting for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PendingPolicy {
    /// Replace the waiting caller and prompt again. The replaced caller is
    /// never resolved.
    #[default]
    Overwrite,
    /// Fail the new request with [`PermissionError::RequestPending`].
    Reject,
}

/// Observable state of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    /// No prompt is outstanding.
    Idle,
    /// A prompt is on screen and a caller is waiting for its answer.
    AwaitingUserDecision,
}

struct PendingRequest {
    id: u64,
    sender: oneshot::Sender<bool>,
}

/// Correlates permission prompts with the callers waiting on them.
///
/// At most one caller waits at a time. The slot is filled by
/// [`request_grant`](Self::request_grant) and emptied by
/// [`on_permission_result`](Self::on_permission_result).
pub struct PermissionGateway<B> {
    backend: B,
    request_code: i32,
    policy: PendingPolicy,
    pending: Mutex<Option<PendingRequest>>,
    next_id: AtomicU64,
}

impl<B> std::fmt::Debug for PermissionGateway<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionGateway")
            .field("request_code", &self.request_code)
            .field("policy", &self.policy)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<B: PermissionBackend> PermissionGateway<B> {
    /// Creates a gateway using [`DEFAULT_REQUEST_CODE`] and
    /// [`PendingPolicy::Overwrite`].
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            request_code: DEFAULT_REQUEST_CODE,
            policy: PendingPolicy::default(),
            pending: Mutex::new(None),
            next_id: AtomicU64::new(1),
        }
    }

    /// Use `request_code` to tag prompts and match their callbacks.
    #[must_use]
    pub const fn with_request_code(mut self, request_code: i32) -> Self {
        self.request_code = request_code;
        self
    }

    /// Use `policy` for requests that overlap a pending one.
    #[must_use]
    pub const fn with_policy(mut self, policy: PendingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns `true` if `permission` is currently granted.
    pub fn check_granted(&self, permission: Permission) -> bool {
        self.backend.check(permission).is_granted()
    }

    /// Ask for `permission`.
    ///
    /// Resolves to `true` immediately if it is already granted. Otherwise the
    /// system prompt is shown and the returned future resolves once the
    /// answer is delivered to [`on_permission_result`](Self::on_permission_result).
    /// There is no timeout.
    ///
    /// # Errors
    /// Returns [`PermissionError::RequestPending`] under
    /// [`PendingPolicy::Reject`] when another request is still waiting.
    pub fn request_grant(
        &self,
        permission: Permission,
    ) -> Result<PermissionRequest, PermissionError> {
        if self.check_granted(permission) {
            debug!("{permission:?} already granted");
            return Ok(PermissionRequest::ready(true));
        }

        let (sender, receiver) = oneshot::channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut slot = self.slot();
            if let Some(previous) = slot.as_ref() {
                match self.policy {
                    PendingPolicy::Reject => {
                        warn!(
                            "rejecting permission request #{id}: #{} is still pending",
                            previous.id
                        );
                        return Err(PermissionError::RequestPending);
                    }
                    PendingPolicy::Overwrite => {
                        warn!(
                            "permission request #{id} supersedes #{}, which will never resolve",
                            previous.id
                        );
                    }
                }
            }
            *slot = Some(PendingRequest { id, sender });
        }

        info!(
            "prompting for {permission:?} (request #{id}, code {})",
            self.request_code
        );
        if let Err(err) = self.backend.prompt(&[permission], self.request_code) {
            warn!("permission prompt failed: {err}");
            let mut slot = self.slot();
            if slot.as_ref().is_some_and(|pending| pending.id == id) {
                *slot = None;
            }
            return Ok(PermissionRequest::ready(false));
        }

        Ok(PermissionRequest::waiting(receiver))
    }

    /// Deliver the operating system's answer to a prompt.
    ///
    /// The waiting caller receives `true` if the first grant result is
    /// [`PermissionStatus::Granted`]. Callbacks tagged with another request
    /// code are ignored and leave the pending request untouched.
    ///
    /// Returns `true` if a waiting caller was resolved.
    pub fn on_permission_result(
        &self,
        request_code: i32,
        grant_results: &[PermissionStatus],
    ) -> bool {
        if request_code != self.request_code {
            warn!("ignoring permission result for foreign request code {request_code}");
            return false;
        }

        let Some(pending) = self.slot().take() else {
            warn!("permission result arrived with no request pending");
            return false;
        };

        let granted = grant_results.first() == Some(&PermissionStatus::Granted);
        info!("permission request #{} resolved: granted={granted}", pending.id);
        if pending.sender.send(granted).is_err() {
            debug!("caller of permission request #{} went away", pending.id);
        }
        true
    }
}

impl<B> PermissionGateway<B> {
    /// The underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The request code prompts are tagged with.
    pub const fn request_code(&self) -> i32 {
        self.request_code
    }

    /// Whether a caller is currently waiting for the user.
    pub fn state(&self) -> GatewayState {
        if self.slot().is_some() {
            GatewayState::AwaitingUserDecision
        } else {
            GatewayState::Idle
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<PendingRequest>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The eventual answer to [`PermissionGateway::request_grant`].
///
/// Resolves to `true` if the permission was granted. A request that was
/// superseded under [`PendingPolicy::Overwrite`], or whose gateway was
/// dropped, stays pending forever.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct PermissionRequest {
    inner: Inner,
}

#[derive(Debug)]
enum Inner {
    Ready(bool),
    Waiting(oneshot::Receiver<bool>),
}

impl PermissionRequest {
    const fn ready(granted: bool) -> Self {
        Self {
            inner: Inner::Ready(granted),
        }
    }

    const fn waiting(receiver: oneshot::Receiver<bool>) -> Self {
        Self {
            inner: Inner::Waiting(receiver),
        }
    }
}

impl Future for PermissionRequest {
    type Output = bool;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<bool> {
        match &mut self.get_mut().inner {
            Inner::Ready(granted) => Poll::Ready(*granted),
            Inner::Waiting(receiver) => match Pin::new(receiver).poll(cx) {
                Poll::Ready(Ok(granted)) => Poll::Ready(granted),
                // The sender was dropped without an answer; nothing will wake us.
                Poll::Ready(Err(oneshot::Canceled)) | Poll::Pending => Poll::Pending,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryPermissions;
    use futures::FutureExt;

    fn gateway() -> PermissionGateway<MemoryPermissions> {
        PermissionGateway::new(MemoryPermissions::new())
    }

    #[test]
    fn already_granted_resolves_without_prompt() {
        let gateway = PermissionGateway::new(
            MemoryPermissions::new()
                .with_status(Permission::FineLocation, PermissionStatus::Granted),
        );

        let request = gateway.request_grant(Permission::FineLocation).unwrap();

        assert_eq!(request.now_or_never(), Some(true));
        assert!(gateway.backend().prompts().is_empty());
        assert_eq!(gateway.state(), GatewayState::Idle);
    }

    #[test]
    fn prompt_moves_gateway_to_awaiting() {
        let gateway = gateway();

        let request = gateway.request_grant(Permission::FineLocation).unwrap();

        assert_eq!(gateway.state(), GatewayState::AwaitingUserDecision);
        assert_eq!(gateway.backend().prompts().len(), 1);
        assert_eq!(request.now_or_never(), None);
    }

    #[test]
    fn foreign_request_code_is_ignored() {
        let gateway = gateway();
        let mut request = gateway.request_grant(Permission::FineLocation).unwrap();

        assert!(!gateway.on_permission_result(7, &[PermissionStatus::Granted]));
        assert_eq!(gateway.state(), GatewayState::AwaitingUserDecision);
        assert_eq!((&mut request).now_or_never(), None);

        assert!(gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]));
        assert_eq!(request.now_or_never(), Some(true));
    }

    #[test]
    fn empty_grant_results_mean_denied() {
        let gateway = gateway();
        let request = gateway.request_grant(Permission::FineLocation).unwrap();

        assert!(gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[]));

        assert_eq!(request.now_or_never(), Some(false));
        assert_eq!(gateway.state(), GatewayState::Idle);
    }

    #[test]
    fn only_first_grant_result_counts() {
        let gateway = gateway();
        let request = gateway.request_grant(Permission::FineLocation).unwrap();

        gateway.on_permission_result(
            DEFAULT_REQUEST_CODE,
            &[PermissionStatus::Denied, PermissionStatus::Granted],
        );

        assert_eq!(request.now_or_never(), Some(false));
    }

    #[test]
    fn result_without_pending_request_is_not_handled() {
        let gateway = gateway();
        assert!(!gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]));
    }

    #[test]
    fn failed_prompt_resolves_false_and_clears_slot() {
        let gateway = PermissionGateway::new(MemoryPermissions::new().with_failing_prompts());

        let request = gateway.request_grant(Permission::FineLocation).unwrap();

        assert_eq!(request.now_or_never(), Some(false));
        assert_eq!(gateway.state(), GatewayState::Idle);
    }

    #[test]
    fn custom_request_code_is_used_for_prompt_and_callback() {
        let gateway = gateway().with_request_code(42);
        let request = gateway.request_grant(Permission::CoarseLocation).unwrap();

        assert_eq!(gateway.backend().prompts()[0].request_code, 42);
        assert!(!gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]));
        assert!(gateway.on_permission_result(42, &[PermissionStatus::Granted]));
        assert_eq!(request.now_or_never(), Some(true));
    }

    #[test]
    fn reject_policy_keeps_first_caller() {
        let gateway = gateway().with_policy(PendingPolicy::Reject);
        let first = gateway.request_grant(Permission::FineLocation).unwrap();

        let second = gateway.request_grant(Permission::FineLocation);

        assert_eq!(second.unwrap_err(), PermissionError::RequestPending);
        assert_eq!(gateway.backend().prompts().len(), 1);
        gateway.on_permission_result(DEFAULT_REQUEST_CODE, &[PermissionStatus::Granted]);
        assert_eq!(first.now_or_never(), Some(true));
    }

    #[test]
    fn dropping_gateway_leaves_caller_pending() {
        let gateway = gateway();
        let request = gateway.request_grant(Permission::FineLocation).unwrap();

        drop(gateway);

        assert_eq!(request.now_or_never(), None);
    }
}
