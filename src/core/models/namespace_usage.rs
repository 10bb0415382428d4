use serde::{Deserialize, Serialize};

use crate::core::models::config_item::null_as_empty;

/// Where and how much a namespace is used.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceUsage {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub namespace_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cluster_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub env_name: String,
    #[serde(default)]
    pub instance_count: u32,
    #[serde(default)]
    pub branch_instance_count: u32,
    #[serde(default)]
    pub linked_namespace_count: u32,
}

impl NamespaceUsage {
    pub fn has_instances(&self) -> bool {
        self.instance_count > 0 || self.branch_instance_count > 0
    }
}

/// An app namespace definition (the template linked namespaces inherit from).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppNamespace {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub format: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
}

/// Namespace coordinates as the portal sends them inside `baseInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceBaseInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub app_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cluster_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub namespace_name: String,
}

/// One namespace instance in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceInstance {
    pub base_info: NamespaceBaseInfo,
    #[serde(default)]
    pub is_linked_namespace: bool,
}

/// Request to create a namespace instance in one env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceCreation {
    pub env: String,
    pub namespace: NamespaceBaseInfo,
}
