//! Vault configuration.
//!
//! A vault may carry a config file at its root naming the directories typed objects and
//! untyped pages live in:
//!
//! ```yaml
//! directories:
//!   object: objects/
//!   page: pages/
//! ```
//!
//! The plural keys `objects` and `pages` are read as deprecated spellings. Only the directory
//! roots matter to parsing; [VaultConfig::parse_options] turns them into [ParseOptions].

use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::{document::ParseOptions, error::RavenError, paths::normalize_dir_root};

/// Config file names in priority order.
pub const CONFIG_FILENAMES: [&str; 4] = ["raven.yaml", "raven.yml", "raven.json", "raven.toml"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoriesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    /// Deprecated spelling of `object`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<String>,
    /// Deprecated spelling of `page`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
}

impl DirectoriesConfig {
    fn pick(current: &Option<String>, deprecated: &Option<String>) -> Option<String> {
        current
            .as_deref()
            .filter(|root| !root.trim().is_empty())
            .or(deprecated.as_deref())
            .map(normalize_dir_root)
            .filter(|root| !root.is_empty())
    }

    pub fn object_root(&self) -> Option<String> {
        DirectoriesConfig::pick(&self.object, &self.objects)
    }

    /// Falls back to the object root when no page root is configured.
    pub fn page_root(&self) -> Option<String> {
        DirectoriesConfig::pick(&self.page, &self.pages).or_else(|| self.object_root())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<DirectoriesConfig>,
}

/// First config file present in `vault`, by [CONFIG_FILENAMES] priority.
pub fn detect_config_file<P: AsRef<Path>>(vault: P) -> Option<PathBuf> {
    CONFIG_FILENAMES
        .iter()
        .map(|name| vault.as_ref().join(name))
        .find(|candidate| candidate.is_file())
}

impl VaultConfig {
    /// Load the config of the vault rooted at `vault`. A vault without a config file gets the
    /// default config.
    pub fn load<P: AsRef<Path>>(vault: P) -> Result<VaultConfig, RavenError> {
        match detect_config_file(vault.as_ref()) {
            Some(path) => VaultConfig::from_path(&path),
            None => {
                tracing::debug!("No config file in {:?}, using defaults", vault.as_ref());
                Ok(VaultConfig::default())
            }
        }
    }

    /// Read a config file, choosing the format from its extension.
    pub fn from_path(path: &Path) -> Result<VaultConfig, RavenError> {
        tracing::debug!("Reading vault config from: {:?}", path);
        let content = read_to_string(path)?;
        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
        let config = match extension {
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ if content.trim().is_empty() => VaultConfig::default(),
            _ => serde_yaml::from_str(&content)?,
        };
        Ok(config)
    }

    pub fn parse_options(&self) -> ParseOptions {
        match &self.directories {
            Some(dirs) => ParseOptions {
                objects_root: dirs.object_root(),
                pages_root: dirs.page_root(),
            },
            None => ParseOptions::default(),
        }
    }
}
