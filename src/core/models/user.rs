use serde::{Deserialize, Serialize};

use crate::core::models::config_item::null_as_empty;

/// A user as listed by the portal's user directory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub email: String,
    /// 1 = enabled, 0 = disabled.
    #[serde(default)]
    pub enabled: i32,
}

impl UserRecord {
    pub fn is_enabled(&self) -> bool {
        self.enabled == 1
    }
}

/// Payload for creating, updating or (de)activating a user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserForm {
    pub username: String,
    pub user_display_name: String,
    pub email: String,
    pub enabled: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl From<&UserRecord> for UserForm {
    fn from(user: &UserRecord) -> Self {
        Self {
            username: user.user_id.clone(),
            user_display_name: user.name.clone(),
            email: user.email.clone(),
            enabled: user.enabled,
            password: None,
        }
    }
}

/// Users holding a role on an app; only masters matter here.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppRoleUsers {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_id: String,
    #[serde(default)]
    pub master_users: Vec<UserRecord>,
}

impl AppRoleUsers {
    pub fn is_master(&self, user_id: &str) -> bool {
        self.master_users.iter().any(|u| u.user_id == user_id)
    }

    pub fn master_ids(&self) -> Vec<&str> {
        self.master_users.iter().map(|u| u.user_id.as_str()).collect()
    }
}
