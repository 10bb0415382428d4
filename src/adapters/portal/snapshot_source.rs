use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::errors::{NsdiffError, Result};
use crate::core::models::config_item::ConfigItem;
use crate::core::models::namespace_ref::NamespaceRef;
use crate::core::traits::item_source::ItemSource;

static COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("valid regex"));

/// Item source backed by exported namespace files.
///
/// Layout: `{root}/{app}/{env}/{cluster}/{namespace}.json`, each file a
/// JSON array of items as the portal returns them.
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    root: PathBuf,
}

impl SnapshotSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// File holding the items of `namespace`.
    pub fn path_for(&self, namespace: &NamespaceRef) -> Result<PathBuf> {
        let components = [
            ("app id", namespace.app_id.as_str()),
            ("env", namespace.env.as_str()),
            ("cluster", namespace.cluster_name.as_str()),
            ("namespace", namespace.namespace_name.as_str()),
        ];
        for (label, value) in components {
            validate_component(label, value)?;
        }

        Ok(self
            .root
            .join(&namespace.app_id)
            .join(&namespace.env)
            .join(&namespace.cluster_name)
            .join(format!("{}.json", namespace.namespace_name)))
    }

    /// Write `items` as the snapshot of `namespace`, creating directories.
    pub async fn save(&self, namespace: &NamespaceRef, items: &[ConfigItem]) -> Result<PathBuf> {
        let path = self.path_for(namespace)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(items).map_err(|e| NsdiffError::InvalidInput {
            detail: format!("cannot serialize items of {namespace}: {e}"),
        })?;
        tokio::fs::write(&path, json + "\n").await?;

        tracing::debug!(path = %path.display(), items = items.len(), "snapshot written");
        Ok(path)
    }
}

fn validate_component(label: &str, value: &str) -> Result<()> {
    if COMPONENT.is_match(value) && !value.contains("..") {
        return Ok(());
    }
    Err(NsdiffError::InvalidInput {
        detail: format!("{label} '{value}' cannot be used as a snapshot path component"),
    })
}

impl ItemSource for SnapshotSource {
    async fn find_items(&self, namespace: &NamespaceRef) -> Result<Vec<ConfigItem>> {
        let path = self.path_for(namespace)?;
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NsdiffError::FileNotFound { path });
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content)
            .map_err(|e| NsdiffError::parse(&namespace.to_string(), "snapshot JSON", e))
    }
}
