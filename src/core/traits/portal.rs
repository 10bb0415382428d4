use std::future::Future;

use crate::core::errors::Result;
use crate::core::models::consumer::{ConsumerGrant, ConsumerRole};
use crate::core::models::namespace_usage::NamespaceUsage;
use crate::core::models::server_config::{ServerConfig, ServerConfigScope};
use crate::core::models::user::{AppRoleUsers, UserForm, UserRecord};

/// Environments, identity and permissions.
pub trait PortalDirectory: Send + Sync {
    fn find_all_envs(&self) -> impl Future<Output = Result<Vec<String>>> + Send;

    fn has_root_permission(&self) -> impl Future<Output = Result<bool>> + Send;

    /// The user the portal session belongs to.
    fn load_user(&self) -> impl Future<Output = Result<UserRecord>> + Send;

    fn get_app_role_users(&self, app_id: &str)
    -> impl Future<Output = Result<AppRoleUsers>> + Send;
}

/// The portal's user directory.
pub trait UserDirectory: Send + Sync {
    fn find_users(
        &self,
        keyword: &str,
        include_inactive: bool,
    ) -> impl Future<Output = Result<Vec<UserRecord>>> + Send;

    fn change_user_enabled(&self, user: &UserForm) -> impl Future<Output = Result<()>> + Send;

    fn create_or_update_user(
        &self,
        is_create: bool,
        user: &UserForm,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Server settings in the portal DB or an environment's config DB.
pub trait ServerConfigStore: Send + Sync {
    fn find_server_configs(
        &self,
        scope: &ServerConfigScope,
    ) -> impl Future<Output = Result<Vec<ServerConfig>>> + Send;

    /// Create or update one setting; returns what the portal stored.
    fn save_server_config(
        &self,
        scope: &ServerConfigScope,
        config: &ServerConfig,
    ) -> impl Future<Output = Result<ServerConfig>> + Send;
}

/// Usage lookup and deletion of namespaces.
pub trait NamespaceAdmin: Send + Sync {
    fn linked_namespace_usage(
        &self,
        app_id: &str,
        env: &str,
        cluster_name: &str,
        namespace_name: &str,
    ) -> impl Future<Output = Result<Vec<NamespaceUsage>>> + Send;

    fn app_namespace_usage(
        &self,
        app_id: &str,
        namespace_name: &str,
    ) -> impl Future<Output = Result<Vec<NamespaceUsage>>> + Send;

    fn delete_linked_namespace(
        &self,
        app_id: &str,
        env: &str,
        cluster_name: &str,
        namespace_name: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_app_namespace(
        &self,
        app_id: &str,
        namespace_name: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Role grants for open-API consumer tokens.
pub trait ConsumerAdmin: Send + Sync {
    /// Grant `grant` to the consumer owning `token`. Namespace roles may be
    /// limited to `envs`; an empty slice grants them in every env.
    fn assign_role_to_consumer(
        &self,
        token: &str,
        grant: &ConsumerGrant,
        envs: &[String],
    ) -> impl Future<Output = Result<Vec<ConsumerRole>>> + Send;
}
