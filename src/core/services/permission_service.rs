use crate::core::errors::{NsdiffError, Result};
use crate::core::models::user::UserRecord;
use crate::core::traits::portal::PortalDirectory;

/// Checks the current portal user's permissions before an operation.
pub struct PermissionService<'a, P: PortalDirectory> {
    pub portal: &'a P,
}

impl<'a, P: PortalDirectory> PermissionService<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    /// Fail with `RootRequired` unless the current user has root permission.
    pub async fn require_root(&self, operation: &str) -> Result<()> {
        if self.portal.has_root_permission().await? {
            return Ok(());
        }
        tracing::warn!(operation, "root permission missing");
        Err(NsdiffError::RootRequired {
            operation: operation.to_string(),
        })
    }

    /// Fail with `PermissionDenied` unless the current user masters `app_id`.
    ///
    /// Returns the current user on success.
    pub async fn require_app_master(&self, app_id: &str) -> Result<UserRecord> {
        let current = self.portal.load_user().await?;
        let roles = self.portal.get_app_role_users(app_id).await?;

        if roles.is_master(&current.user_id) {
            return Ok(current);
        }
        tracing::warn!(app_id, user = %current.user_id, "not an app master");
        Err(NsdiffError::PermissionDenied {
            app_id: app_id.to_string(),
            master_users: roles.master_ids().join(", "),
        })
    }
}
