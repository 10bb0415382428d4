use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::errors::{NsdiffError, Result};

/// Name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration read from `.nsdiff/config.toml`.
///
/// Every section is optional; a missing file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub portal: PortalSection,
    pub diff: DiffSection,
}

/// The `[portal]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalSection {
    pub url: Option<String>,
    pub timeout_secs: u64,
    /// Bearer token forwarded with every request.
    pub token: Option<String>,
}

impl Default for PortalSection {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 10,
            token: None,
        }
    }
}

/// The `[diff]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiffSection {
    pub only_show_diff_keys: bool,
}

impl Default for DiffSection {
    fn default() -> Self {
        Self {
            only_show_diff_keys: true,
        }
    }
}

impl AppConfig {
    /// Load the configuration for `config_dir`.
    ///
    /// Falls back to the user-level file (`~/.config/nsdiff/config.toml`
    /// on Linux) when the directory has none, and to defaults when
    /// neither exists.
    pub fn load(config_dir: &Path) -> Result<Self> {
        match Self::locate(config_dir) {
            Some(path) => Self::load_file(&path),
            None => {
                tracing::debug!(dir = %config_dir.display(), "no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parse one config file and validate it.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| NsdiffError::InvalidConfig {
            detail: format!("Failed to parse {}: {e}", path.display()),
        })?;

        if config.portal.timeout_secs == 0 {
            return Err(NsdiffError::InvalidConfig {
                detail: "portal.timeout_secs must be greater than zero".into(),
            });
        }
        if config.portal.url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err(NsdiffError::InvalidConfig {
                detail: "portal.url is set but empty".into(),
            });
        }

        tracing::debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    fn locate(config_dir: &Path) -> Option<PathBuf> {
        let local = config_dir.join(CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|d| d.join("nsdiff").join(CONFIG_FILE))
            .filter(|p| p.is_file())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.portal.timeout_secs)
    }
}
