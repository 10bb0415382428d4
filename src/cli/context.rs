use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::adapters::portal::http_portal::HttpPortal;
use crate::config::app_config::AppConfig;
use crate::core::errors::{NsdiffError, Result};
use crate::core::models::namespace_ref::NamespaceRef;
use crate::core::services::namespace_admin_service::NamespaceTarget;

/// Cluster used when a location names only the environment.
pub const DEFAULT_CLUSTER: &str = "default";

static CONFIG_DIR: OnceLock<PathBuf> = OnceLock::new();
static OVERRIDES: OnceLock<PortalOverrides> = OnceLock::new();

/// Portal settings given on the command line or through the environment.
#[derive(Debug, Default)]
pub struct PortalOverrides {
    pub url: Option<String>,
    pub token: Option<String>,
}

/// Initialize the global config directory and portal overrides.
/// If `custom` is provided, uses that path; otherwise defaults to `.nsdiff`.
pub fn init(custom: Option<&str>, overrides: PortalOverrides) {
    let dir = custom
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".nsdiff"));
    let _ = CONFIG_DIR.set(dir);
    let _ = OVERRIDES.set(overrides);
}

/// Get the current config directory path.
pub fn config_dir() -> &'static Path {
    CONFIG_DIR
        .get()
        .map(|p| p.as_path())
        .unwrap_or(Path::new(".nsdiff"))
}

pub fn app_config() -> Result<AppConfig> {
    AppConfig::load(config_dir())
}

/// Build the portal client from the config file plus overrides.
pub fn portal() -> Result<HttpPortal> {
    let config = app_config()?;
    let overrides = OVERRIDES.get();

    let url = overrides
        .and_then(|o| o.url.clone())
        .or(config.portal.url.clone())
        .ok_or_else(|| NsdiffError::InvalidConfig {
            detail: format!(
                "no portal URL configured.\n\n  \
                 Set [portal] url in {}/config.toml, pass --portal <url>\n  \
                 or export NSDIFF_PORTAL_URL.",
                config_dir().display()
            ),
        })?;
    let token = overrides
        .and_then(|o| o.token.clone())
        .or(config.portal.token.clone());

    tracing::debug!(%url, authenticated = token.is_some(), "portal configured");
    HttpPortal::new(&url, config.timeout(), token)
}

/// Run `future` to completion on a single-threaded runtime.
pub fn block_on<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| NsdiffError::TaskFailed {
            detail: format!("Failed to create async runtime: {e}"),
        })?;
    rt.block_on(future)
}

/// Split `ENV` or `ENV:CLUSTER` into its parts.
pub fn parse_location(location: &str) -> Result<(String, String)> {
    let (env, cluster) = location
        .split_once(':')
        .unwrap_or((location, DEFAULT_CLUSTER));
    let (env, cluster) = (env.trim(), cluster.trim());

    if env.is_empty() || cluster.is_empty() || cluster.contains(':') {
        return Err(NsdiffError::InvalidSelection {
            detail: format!("'{location}' is not a location. Use ENV or ENV:CLUSTER"),
        });
    }
    Ok((env.to_string(), cluster.to_string()))
}

/// One reference per location, in the order given.
pub fn namespace_refs(app: &str, namespace: &str, locations: &[String]) -> Result<Vec<NamespaceRef>> {
    validate_name(app, "app id")?;
    validate_name(namespace, "namespace")?;

    locations
        .iter()
        .map(|location| {
            let (env, cluster) = parse_location(location)?;
            Ok(NamespaceRef::new(app, env, cluster, namespace))
        })
        .collect()
}

/// Linked namespace in one cluster when `linked` is given, app namespace otherwise.
pub fn namespace_target(app: &str, namespace: &str, linked: Option<&str>) -> Result<NamespaceTarget> {
    validate_name(app, "app id")?;
    validate_name(namespace, "namespace")?;

    Ok(match linked {
        Some(location) => {
            let (env, cluster_name) = parse_location(location)?;
            NamespaceTarget::Linked {
                app_id: app.to_string(),
                env,
                cluster_name,
                namespace_name: namespace.to_string(),
            }
        }
        None => NamespaceTarget::App {
            app_id: app.to_string(),
            namespace_name: namespace.to_string(),
        },
    })
}

fn validate_name(value: &str, label: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NsdiffError::InvalidSelection {
            detail: format!("{label} must not be empty"),
        });
    }
    Ok(())
}
