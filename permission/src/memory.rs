use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::{Permission, PermissionBackend, PermissionError, PermissionStatus};

/// A prompt that a [`MemoryPermissions`] backend was asked to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    /// Permissions listed in the prompt.
    pub permissions: Vec<Permission>,
    /// Request code the answer must carry.
    pub request_code: i32,
}

/// Permission backend that keeps statuses in memory.
///
/// Nothing is shown on screen; prompts are only recorded. Whoever drives the
/// backend answers them by updating the status and calling
/// [`PermissionGateway::on_permission_result`](crate::PermissionGateway::on_permission_result).
#[derive(Debug, Default)]
pub struct MemoryPermissions {
    statuses: Mutex<HashMap<Permission, PermissionStatus>>,
    prompts: Mutex<Vec<PromptRecord>>,
    fail_prompts: bool,
}

impl MemoryPermissions {
    /// Creates a backend where every permission is
    /// [`PermissionStatus::NotDetermined`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `permission` in `status`.
    #[must_use]
    pub fn with_status(self, permission: Permission, status: PermissionStatus) -> Self {
        self.set_status(permission, status);
        self
    }

    /// Make every prompt fail with a platform error.
    #[must_use]
    pub const fn with_failing_prompts(mut self) -> Self {
        self.fail_prompts = true;
        self
    }

    /// Change the status of `permission`.
    pub fn set_status(&self, permission: Permission, status: PermissionStatus) {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(permission, status);
    }

    /// Every prompt shown so far, oldest first.
    pub fn prompts(&self) -> Vec<PromptRecord> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl PermissionBackend for MemoryPermissions {
    fn check(&self, permission: Permission) -> PermissionStatus {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&permission)
            .copied()
            .unwrap_or_default()
    }

    fn prompt(
        &self,
        permissions: &[Permission],
        request_code: i32,
    ) -> Result<(), PermissionError> {
        if self.fail_prompts {
            return Err(PermissionError::Platform("prompt unavailable".into()));
        }
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(PromptRecord {
                permissions: permissions.to_vec(),
                request_code,
            });
        Ok(())
    }
}
