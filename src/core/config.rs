//! Configuration file management.
//!
//! Defaults for command-line options can live in `.secretsync.toml` in the
//! working directory, or in `<config dir>/secretsync/config.toml` for the
//! whole user account. Only the first file found is read.
//!
//! ```toml
//! [github]
//! user = "octocat"
//! repo = "hello-world"
//!
//! [azure]
//! resource_group = "rg-app"
//! acr_name = "appregistry"
//! container_app_name = "app"
//! container_app_env = "app-env"
//! sp_prefix = "sp-github-app"
//!
//! [document]
//! path = "github-secrets.txt"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::core::constants;
use crate::error::{ConfigError, Result};

/// Optional defaults for every command.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub azure: AzureConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

/// Target repository.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    pub user: Option<String>,
    pub repo: Option<String>,
}

/// Azure resources the secrets describe.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AzureConfig {
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub acr_name: Option<String>,
    pub container_app_name: Option<String>,
    pub container_app_env: Option<String>,
    /// Prefix for generated service principal names.
    pub sp_prefix: Option<String>,
}

/// Secrets document location.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentConfig {
    pub path: Option<PathBuf>,
}

impl Config {
    /// Path of the project-local config file.
    pub fn local_path() -> PathBuf {
        PathBuf::from(constants::CONFIG_FILE)
    }

    /// Path of the user-wide config file, if a config dir exists.
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Load the first config file found, or defaults when there is none.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadFile` or `ConfigError::Parse` when a file
    /// exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        let candidates = std::iter::once(Self::local_path()).chain(Self::global_path());
        for path in candidates {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    /// Load a specific config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        Ok(config)
    }

    /// Secrets document path, falling back to the built-in default.
    pub fn document_path(&self, flag: Option<PathBuf>) -> PathBuf {
        flag.or_else(|| self.document.path.clone())
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_SECRETS_FILE))
    }

    /// Service principal name prefix, falling back to the built-in default.
    pub fn sp_prefix(&self, flag: Option<String>) -> String {
        flag.or_else(|| self.azure.sp_prefix.clone())
            .unwrap_or_else(|| constants::DEFAULT_SP_PREFIX.to_string())
    }
}

/// A flag value, or the config value when the flag was not given.
pub fn pick(flag: Option<String>, config: &Option<String>) -> Option<String> {
    flag.or_else(|| config.clone())
}
