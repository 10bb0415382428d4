use std::fmt;

use serde::{Deserialize, Serialize};

/// Role a consumer token can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerRoleType {
    /// Master of a whole app.
    AppRole,
    /// Modify and release one namespace, optionally in chosen envs only.
    NamespaceRole,
}

impl ConsumerRoleType {
    /// Name the portal expects in the `type` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumerRoleType::AppRole => "AppRole",
            ConsumerRoleType::NamespaceRole => "NamespaceRole",
        }
    }
}

impl fmt::Display for ConsumerRoleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a consumer is granted access to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerGrant {
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_name: Option<String>,
}

impl ConsumerGrant {
    pub fn role_type(&self) -> ConsumerRoleType {
        match self.namespace_name {
            Some(_) => ConsumerRoleType::NamespaceRole,
            None => ConsumerRoleType::AppRole,
        }
    }

    /// `app` or `app/namespace`.
    pub fn describe(&self) -> String {
        match &self.namespace_name {
            Some(ns) => format!("{}/{ns}", self.app_id),
            None => self.app_id.clone(),
        }
    }
}

/// A role binding the portal created for a consumer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumerRole {
    #[serde(default)]
    pub consumer_id: i64,
    #[serde(default)]
    pub role_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_decides_role_type() {
        let app = ConsumerGrant {
            app_id: "shop".into(),
            namespace_name: None,
        };
        let ns = ConsumerGrant {
            app_id: "shop".into(),
            namespace_name: Some("application".into()),
        };

        assert_eq!(app.role_type(), ConsumerRoleType::AppRole);
        assert_eq!(ns.role_type().to_string(), "NamespaceRole");
        assert_eq!(ns.describe(), "shop/application");
    }

    #[test]
    fn app_grant_omits_namespace() {
        let grant = ConsumerGrant {
            app_id: "shop".into(),
            namespace_name: None,
        };
        assert_eq!(
            serde_json::to_value(&grant).unwrap(),
            serde_json::json!({"appId": "shop"})
        );
    }
}
