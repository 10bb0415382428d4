use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::config_item::ConfigItem;
use crate::core::models::consumer::{ConsumerGrant, ConsumerRole};
use crate::core::models::namespace_ref::NamespaceRef;
use crate::core::models::namespace_usage::{
    AppNamespace, NamespaceCreation, NamespaceInstance, NamespaceUsage,
};
use crate::core::models::server_config::{ServerConfig, ServerConfigScope};
use crate::core::models::user::{AppRoleUsers, UserForm, UserRecord};
use crate::core::traits::item_source::ItemSource;
use crate::core::traits::portal::{
    ConsumerAdmin, NamespaceAdmin, PortalDirectory, ServerConfigStore, UserDirectory,
};

/// JSON-over-HTTP client for the configuration portal.
///
/// Path parameters are percent-encoded segment by segment. Any non-2xx
/// response becomes `NsdiffError::Http` carrying the portal's message.
#[derive(Debug, Clone)]
pub struct HttpPortal {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct RootPermission {
    #[serde(default)]
    has_permission: bool,
}

/// Error body the portal sends with 4xx/5xx responses.
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpPortal {
    /// Build a client for the portal at `base_url`.
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url).map_err(|e| NsdiffError::InvalidConfig {
            detail: format!("invalid portal URL '{base_url}': {e}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(NsdiffError::InvalidConfig {
                detail: format!("portal URL '{base_url}' cannot take a path"),
            });
        }
        // "http://host/" and "http://host" must resolve the same paths.
        if let Ok(mut segments) = base_url.path_segments_mut() {
            segments.pop_if_empty();
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(format!("nsdiff/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| NsdiffError::Network {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Absolute URL for the given path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NsdiffError::InvalidConfig {
                detail: format!("portal URL '{}' cannot take a path", self.base_url),
            })?
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%method, %url, "portal request");
        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(|e| NsdiffError::Network {
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                } else {
                    body
                }
            });
        tracing::debug!(status = status.as_u16(), %message, "portal error");
        Err(NsdiffError::Http {
            status: status.as_u16(),
            message,
        })
    }

    async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        self.send(builder)
            .await?
            .json()
            .await
            .map_err(|e| NsdiffError::Network {
                reason: format!("unexpected response body: {e}"),
            })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.json(self.request(Method::GET, segments)?).await
    }

    async fn post<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<Response> {
        self.send(self.request(Method::POST, segments)?.json(body))
            .await
    }

    async fn delete(&self, segments: &[&str]) -> Result<()> {
        self.send(self.request(Method::DELETE, segments)?)
            .await
            .map(|_| ())
    }

    /// Public namespaces any app can link.
    pub async fn find_public_namespaces(&self) -> Result<Vec<AppNamespace>> {
        self.get(&["appnamespaces", "public"]).await
    }

    /// Create namespace instances (typically links to a public namespace).
    pub async fn create_namespace(
        &self,
        app_id: &str,
        creations: &[NamespaceCreation],
    ) -> Result<()> {
        self.post(&["apps", app_id, "namespaces"], creations)
            .await
            .map(|_| ())
    }

    /// Create an app namespace definition.
    pub async fn create_app_namespace(
        &self,
        app_id: &str,
        namespace: &AppNamespace,
        append_namespace_prefix: bool,
    ) -> Result<AppNamespace> {
        let builder = self
            .request(Method::POST, &["apps", app_id, "appnamespaces"])?
            .query(&[("appendNamespacePrefix", append_namespace_prefix)])
            .json(namespace);
        self.json(builder).await
    }

    pub async fn load_app_namespace(&self, app_id: &str, namespace_name: &str) -> Result<AppNamespace> {
        self.get(&["apps", app_id, "appnamespaces", namespace_name])
            .await
    }

    /// Every instance of a public namespace in one env, paged.
    pub async fn public_namespace_instances(
        &self,
        env: &str,
        public_namespace_name: &str,
        page: u32,
        size: u32,
    ) -> Result<Vec<NamespaceInstance>> {
        let builder = self
            .request(
                Method::GET,
                &["envs", env, "appnamespaces", public_namespace_name, "namespaces"],
            )?
            .query(&[("page", page), ("size", size)]);
        self.json(builder).await
    }

    /// env -> cluster -> whether unpublished changes exist.
    pub async fn namespace_publish_info(
        &self,
        app_id: &str,
    ) -> Result<BTreeMap<String, BTreeMap<String, bool>>> {
        self.get(&["apps", app_id, "namespaces", "publish_info"])
            .await
    }
}

impl ItemSource for HttpPortal {
    async fn find_items(&self, namespace: &NamespaceRef) -> Result<Vec<ConfigItem>> {
        self.get(&[
            "apps",
            &namespace.app_id,
            "envs",
            &namespace.env,
            "clusters",
            &namespace.cluster_name,
            "namespaces",
            &namespace.namespace_name,
            "items",
        ])
        .await
    }
}

impl PortalDirectory for HttpPortal {
    async fn find_all_envs(&self) -> Result<Vec<String>> {
        self.get(&["envs"]).await
    }

    async fn has_root_permission(&self) -> Result<bool> {
        let permission: RootPermission = self.get(&["permissions", "root"]).await?;
        Ok(permission.has_permission)
    }

    async fn load_user(&self) -> Result<UserRecord> {
        self.get(&["user"]).await
    }

    async fn get_app_role_users(&self, app_id: &str) -> Result<AppRoleUsers> {
        self.get(&["apps", app_id, "role_users"]).await
    }
}

impl UserDirectory for HttpPortal {
    async fn find_users(&self, keyword: &str, include_inactive: bool) -> Result<Vec<UserRecord>> {
        let builder = self.request(Method::GET, &["users"])?.query(&[
            ("keyword", keyword.to_string()),
            ("includeInactiveUsers", include_inactive.to_string()),
        ]);
        self.json(builder).await
    }

    async fn change_user_enabled(&self, user: &UserForm) -> Result<()> {
        self.send(self.request(Method::PUT, &["users", "enabled"])?.json(user))
            .await
            .map(|_| ())
    }

    async fn create_or_update_user(&self, is_create: bool, user: &UserForm) -> Result<()> {
        let builder = self
            .request(Method::POST, &["users"])?
            .query(&[("isCreate", is_create)])
            .json(user);
        self.send(builder).await.map(|_| ())
    }
}

impl ServerConfigStore for HttpPortal {
    async fn find_server_configs(&self, scope: &ServerConfigScope) -> Result<Vec<ServerConfig>> {
        match scope {
            ServerConfigScope::Portal => {
                self.get(&["server", "portal-db", "config", "find-all-config"])
                    .await
            }
            ServerConfigScope::ConfigDb { env } => {
                self.get(&[
                    "server",
                    "envs",
                    env,
                    "config-db",
                    "config",
                    "find-all-config",
                ])
                .await
            }
        }
    }

    async fn save_server_config(
        &self,
        scope: &ServerConfigScope,
        config: &ServerConfig,
    ) -> Result<ServerConfig> {
        let builder = match scope {
            ServerConfigScope::Portal => {
                self.request(Method::POST, &["server", "portal-db", "config"])?
            }
            ServerConfigScope::ConfigDb { env } => {
                self.request(Method::POST, &["server", "envs", env, "config-db", "config"])?
            }
        };
        self.json(builder.json(config)).await
    }
}

impl NamespaceAdmin for HttpPortal {
    async fn linked_namespace_usage(
        &self,
        app_id: &str,
        env: &str,
        cluster_name: &str,
        namespace_name: &str,
    ) -> Result<Vec<NamespaceUsage>> {
        self.get(&[
            "apps",
            app_id,
            "envs",
            env,
            "clusters",
            cluster_name,
            "linked-namespaces",
            namespace_name,
            "usage",
        ])
        .await
    }

    async fn app_namespace_usage(
        &self,
        app_id: &str,
        namespace_name: &str,
    ) -> Result<Vec<NamespaceUsage>> {
        self.get(&["apps", app_id, "namespaces", namespace_name, "usage"])
            .await
    }

    async fn delete_linked_namespace(
        &self,
        app_id: &str,
        env: &str,
        cluster_name: &str,
        namespace_name: &str,
    ) -> Result<()> {
        self.delete(&[
            "apps",
            app_id,
            "envs",
            env,
            "clusters",
            cluster_name,
            "linked-namespaces",
            namespace_name,
        ])
        .await
    }

    async fn delete_app_namespace(&self, app_id: &str, namespace_name: &str) -> Result<()> {
        self.delete(&["apps", app_id, "appnamespaces", namespace_name])
            .await
    }
}

impl ConsumerAdmin for HttpPortal {
    async fn assign_role_to_consumer(
        &self,
        token: &str,
        grant: &ConsumerGrant,
        envs: &[String],
    ) -> Result<Vec<ConsumerRole>> {
        let mut builder = self
            .request(Method::POST, &["consumers", token, "assign-role"])?
            .query(&[("type", grant.role_type().as_str())]);
        if !envs.is_empty() {
            builder = builder.query(&[("envs", envs.join(","))]);
        }
        self.json(builder.json(grant)).await
    }
}
