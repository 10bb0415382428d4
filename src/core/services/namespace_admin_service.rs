use std::fmt;

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::namespace_usage::NamespaceUsage;
use crate::core::services::permission_service::PermissionService;
use crate::core::traits::portal::{NamespaceAdmin, PortalDirectory};

/// A namespace to inspect or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespaceTarget {
    /// A namespace instance in one cluster that links a public namespace.
    Linked {
        app_id: String,
        env: String,
        cluster_name: String,
        namespace_name: String,
    },
    /// An app namespace definition, across every env and cluster.
    App {
        app_id: String,
        namespace_name: String,
    },
}

impl NamespaceTarget {
    pub fn app_id(&self) -> &str {
        match self {
            NamespaceTarget::Linked { app_id, .. } | NamespaceTarget::App { app_id, .. } => app_id,
        }
    }

    pub fn namespace_name(&self) -> &str {
        match self {
            NamespaceTarget::Linked { namespace_name, .. }
            | NamespaceTarget::App { namespace_name, .. } => namespace_name,
        }
    }
}

impl fmt::Display for NamespaceTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamespaceTarget::Linked {
                app_id,
                env,
                cluster_name,
                namespace_name,
            } => write!(f, "{app_id}/{env}:{cluster_name}:{namespace_name}"),
            NamespaceTarget::App {
                app_id,
                namespace_name,
            } => write!(f, "{app_id}/{namespace_name}"),
        }
    }
}

/// Usage lookup and permission-gated deletion of namespaces.
pub struct NamespaceAdminService<'a, P> {
    pub portal: &'a P,
}

impl<'a, P: PortalDirectory + NamespaceAdmin> NamespaceAdminService<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    pub async fn usage(&self, target: &NamespaceTarget) -> Result<Vec<NamespaceUsage>> {
        match target {
            NamespaceTarget::Linked {
                app_id,
                env,
                cluster_name,
                namespace_name,
            } => {
                self.portal
                    .linked_namespace_usage(app_id, env, cluster_name, namespace_name)
                    .await
            }
            NamespaceTarget::App {
                app_id,
                namespace_name,
            } => {
                self.portal
                    .app_namespace_usage(app_id, namespace_name)
                    .await
            }
        }
    }

    /// Delete a namespace.
    ///
    /// 1. The current user must be a master of the app; otherwise nothing
    ///    else is requested.
    /// 2. Usage is looked up; a namespace still in use is only deleted
    ///    with `force`.
    ///
    /// Returns the usage that was found.
    pub async fn delete(&self, target: &NamespaceTarget, force: bool) -> Result<Vec<NamespaceUsage>> {
        PermissionService::new(self.portal)
            .require_app_master(target.app_id())
            .await?;

        let usage = self.usage(target).await?;
        if let Some(detail) = in_use(target, &usage)
            && !force
        {
            return Err(NsdiffError::NamespaceInUse {
                namespace: target.to_string(),
                detail,
            });
        }

        match target {
            NamespaceTarget::Linked {
                app_id,
                env,
                cluster_name,
                namespace_name,
            } => {
                self.portal
                    .delete_linked_namespace(app_id, env, cluster_name, namespace_name)
                    .await?
            }
            NamespaceTarget::App {
                app_id,
                namespace_name,
            } => {
                self.portal
                    .delete_app_namespace(app_id, namespace_name)
                    .await?
            }
        }

        tracing::info!(namespace = %target, force, "namespace deleted");
        Ok(usage)
    }
}

/// Why a namespace counts as in use, if it does.
///
/// A linked namespace is in use while clients (or gray-release clients)
/// are connected to it; an app namespace while any usage is reported.
pub fn in_use(target: &NamespaceTarget, usage: &[NamespaceUsage]) -> Option<String> {
    match target {
        NamespaceTarget::Linked { .. } => {
            let instances: u32 = usage.iter().map(|u| u.instance_count).sum();
            let branch: u32 = usage.iter().map(|u| u.branch_instance_count).sum();
            usage
                .iter()
                .any(NamespaceUsage::has_instances)
                .then(|| format!("{instances} instance(s), {branch} gray instance(s) connected"))
        }
        NamespaceTarget::App { .. } => (!usage.is_empty())
            .then(|| format!("used in {} env/cluster location(s)", usage.len())),
    }
}
