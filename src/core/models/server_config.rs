use serde::{Deserialize, Serialize};

use crate::core::models::config_item::null_as_empty;

/// A portal or config-service server setting.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub key: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
}

/// Which database a server setting lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerConfigScope {
    /// The portal's own database.
    Portal,
    /// The config-service database of one environment.
    ConfigDb { env: String },
}

impl ServerConfigScope {
    pub fn from_env(env: Option<&str>) -> Self {
        match env {
            Some(env) => ServerConfigScope::ConfigDb {
                env: env.to_string(),
            },
            None => ServerConfigScope::Portal,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ServerConfigScope::Portal => "portal DB".to_string(),
            ServerConfigScope::ConfigDb { env } => format!("config DB ({env})"),
        }
    }
}
