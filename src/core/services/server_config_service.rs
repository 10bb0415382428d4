use crate::core::errors::{NsdiffError, Result};
use crate::core::models::server_config::{ServerConfig, ServerConfigScope};
use crate::core::services::permission_service::PermissionService;
use crate::core::services::search_filter::SearchFilter;
use crate::core::traits::portal::{PortalDirectory, ServerConfigStore};

/// Lists and edits server settings in the portal or config DB.
pub struct ServerConfigService<'a, P> {
    pub portal: &'a P,
}

impl<'a, P: PortalDirectory + ServerConfigStore> ServerConfigService<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    /// Fetch all settings of `scope` into a searchable list.
    pub async fn list(&self, scope: &ServerConfigScope) -> Result<SearchFilter<ServerConfig>> {
        let configs = self.portal.find_server_configs(scope).await?;
        Ok(SearchFilter::new(configs))
    }

    /// Create or update one setting. Root only.
    pub async fn save(
        &self,
        scope: &ServerConfigScope,
        config: &ServerConfig,
    ) -> Result<ServerConfig> {
        validate(config)?;
        PermissionService::new(self.portal)
            .require_root("editing server config")
            .await?;

        let saved = self.portal.save_server_config(scope, config).await?;
        tracing::info!(scope = %scope.describe(), key = %saved.key, "server config saved");
        Ok(saved)
    }
}

/// Key and value are both mandatory.
fn validate(config: &ServerConfig) -> Result<()> {
    if config.key.trim().is_empty() {
        return Err(NsdiffError::InvalidInput {
            detail: "server config key must not be blank".into(),
        });
    }
    if config.value.trim().is_empty() {
        return Err(NsdiffError::InvalidInput {
            detail: format!("value for '{}' must not be blank", config.key),
        });
    }
    Ok(())
}
