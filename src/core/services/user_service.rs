use crate::core::errors::{NsdiffError, Result};
use crate::core::models::user::{UserForm, UserRecord};
use crate::core::services::permission_service::PermissionService;
use crate::core::services::search_filter::SearchFilter;
use crate::core::traits::portal::{PortalDirectory, UserDirectory};

/// Lists, creates, edits and (de)activates portal users.
pub struct UserService<'a, P> {
    pub portal: &'a P,
}

impl<'a, P: PortalDirectory + UserDirectory> UserService<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    /// Fetch every user, active or not, into a searchable list.
    pub async fn list(&self) -> Result<SearchFilter<UserRecord>> {
        let users = self.portal.find_users("", true).await?;
        Ok(SearchFilter::new(users))
    }

    /// Flip a user between enabled and disabled. Root only.
    ///
    /// Returns the user as it now stands.
    pub async fn toggle_enabled(&self, user_id: &str) -> Result<UserRecord> {
        PermissionService::new(self.portal)
            .require_root("changing user status")
            .await?;

        let mut user = self
            .portal
            .find_users(user_id, true)
            .await?
            .into_iter()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| NsdiffError::UserNotFound {
                user_id: user_id.to_string(),
            })?;

        user.enabled = if user.is_enabled() { 0 } else { 1 };
        self.portal
            .change_user_enabled(&UserForm::from(&user))
            .await?;

        tracing::info!(user = %user.user_id, enabled = user.enabled, "user status changed");
        Ok(user)
    }

    /// Create a new user or update an existing one. Root only.
    pub async fn save(&self, is_create: bool, form: &UserForm) -> Result<()> {
        validate(is_create, form)?;
        PermissionService::new(self.portal)
            .require_root(if is_create {
                "creating users"
            } else {
                "editing users"
            })
            .await?;

        self.portal.create_or_update_user(is_create, form).await
    }
}

fn validate(is_create: bool, form: &UserForm) -> Result<()> {
    let missing = |field: &str| NsdiffError::InvalidInput {
        detail: format!("{field} is required"),
    };
    if form.username.trim().is_empty() {
        return Err(missing("user id"));
    }
    if form.email.trim().is_empty() {
        return Err(missing("email"));
    }
    if is_create && form.password.as_deref().is_none_or(|p| p.is_empty()) {
        return Err(missing("password"));
    }
    Ok(())
}
