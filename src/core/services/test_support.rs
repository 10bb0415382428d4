//! In-memory portal used by the service tests.

use std::sync::Mutex;

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::consumer::{ConsumerGrant, ConsumerRole};
use crate::core::models::namespace_usage::NamespaceUsage;
use crate::core::models::server_config::{ServerConfig, ServerConfigScope};
use crate::core::models::user::{AppRoleUsers, UserForm, UserRecord};
use crate::core::traits::portal::{
    ConsumerAdmin, NamespaceAdmin, PortalDirectory, ServerConfigStore, UserDirectory,
};

#[derive(Default)]
pub struct FakePortal {
    pub current_user: String,
    pub root: bool,
    pub masters: Vec<String>,
    pub users: Vec<UserRecord>,
    pub configs: Vec<ServerConfig>,
    pub usage: Vec<NamespaceUsage>,
    /// Every mutating or lookup call, in order.
    pub calls: Mutex<Vec<String>>,
}

impl FakePortal {
    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn user(id: &str, enabled: i32) -> UserRecord {
        UserRecord {
            user_id: id.into(),
            name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            enabled,
        }
    }
}

impl PortalDirectory for FakePortal {
    async fn find_all_envs(&self) -> Result<Vec<String>> {
        Ok(vec!["DEV".into(), "PRO".into()])
    }

    async fn has_root_permission(&self) -> Result<bool> {
        Ok(self.root)
    }

    async fn load_user(&self) -> Result<UserRecord> {
        Ok(FakePortal::user(&self.current_user, 1))
    }

    async fn get_app_role_users(&self, app_id: &str) -> Result<AppRoleUsers> {
        Ok(AppRoleUsers {
            app_id: app_id.into(),
            master_users: self.masters.iter().map(|m| FakePortal::user(m, 1)).collect(),
        })
    }
}

impl UserDirectory for FakePortal {
    async fn find_users(&self, keyword: &str, _include_inactive: bool) -> Result<Vec<UserRecord>> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.user_id.contains(keyword))
            .cloned()
            .collect())
    }

    async fn change_user_enabled(&self, user: &UserForm) -> Result<()> {
        self.record(format!("enable {} {}", user.username, user.enabled));
        Ok(())
    }

    async fn create_or_update_user(&self, is_create: bool, user: &UserForm) -> Result<()> {
        let verb = if is_create { "create" } else { "update" };
        self.record(format!("{verb} {}", user.username));
        Ok(())
    }
}

impl ServerConfigStore for FakePortal {
    async fn find_server_configs(&self, _scope: &ServerConfigScope) -> Result<Vec<ServerConfig>> {
        Ok(self.configs.clone())
    }

    async fn save_server_config(
        &self,
        scope: &ServerConfigScope,
        config: &ServerConfig,
    ) -> Result<ServerConfig> {
        if config.key == "duplicate" {
            return Err(NsdiffError::Http {
                status: 400,
                message: "key already exists".into(),
            });
        }
        self.record(format!("save {} {}", scope.describe(), config.key));
        Ok(config.clone())
    }
}

impl NamespaceAdmin for FakePortal {
    async fn linked_namespace_usage(
        &self,
        _app_id: &str,
        _env: &str,
        _cluster_name: &str,
        namespace_name: &str,
    ) -> Result<Vec<NamespaceUsage>> {
        self.record(format!("usage linked {namespace_name}"));
        Ok(self.usage.clone())
    }

    async fn app_namespace_usage(
        &self,
        _app_id: &str,
        namespace_name: &str,
    ) -> Result<Vec<NamespaceUsage>> {
        self.record(format!("usage app {namespace_name}"));
        Ok(self.usage.clone())
    }

    async fn delete_linked_namespace(
        &self,
        _app_id: &str,
        _env: &str,
        _cluster_name: &str,
        namespace_name: &str,
    ) -> Result<()> {
        self.record(format!("delete linked {namespace_name}"));
        Ok(())
    }

    async fn delete_app_namespace(&self, _app_id: &str, namespace_name: &str) -> Result<()> {
        self.record(format!("delete app {namespace_name}"));
        Ok(())
    }
}

impl ConsumerAdmin for FakePortal {
    async fn assign_role_to_consumer(
        &self,
        token: &str,
        grant: &ConsumerGrant,
        envs: &[String],
    ) -> Result<Vec<ConsumerRole>> {
        self.record(format!(
            "grant {token} {} {} [{}]",
            grant.role_type(),
            grant.describe(),
            envs.join(", ")
        ));
        Ok((0..envs.len().max(1))
            .map(|i| ConsumerRole {
                consumer_id: 1,
                role_id: i as i64 + 1,
            })
            .collect())
    }
}
