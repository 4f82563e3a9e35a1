//! Cloud identity provider abstraction.
//!
//! The identity provider creates service-principal credentials and hands
//! out container-registry access. The production implementation shells out
//! to the Azure CLI.
//!
//! ## Adding a New Provider
//!
//! 1. Implement the `IdentityProvider` trait
//! 2. Add the implementation in a new file next to `azure.rs`
//! 3. Re-export from this module

use serde::Deserialize;
use std::fmt;
use zeroize::Zeroizing;

use crate::core::credentials::Credentials;
use crate::error::Result;

mod azure;

pub use azure::AzureCli;

/// The account the provider is currently logged into.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub subscription_id: String,
    pub tenant_id: String,
    #[serde(default)]
    pub name: String,
}

/// A container registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registry {
    pub name: String,
    pub login_server: String,
}

/// Admin credentials for a container registry.
#[derive(Clone)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: Zeroizing<String>,
}

impl fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// How to find the registry to publish credentials for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLookup {
    /// A registry with this exact name.
    Named(String),
    /// The first registry in a resource group.
    InResourceGroup(String),
}

impl fmt::Display for RegistryLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryLookup::Named(name) => write!(f, "registry {}", name),
            RegistryLookup::InResourceGroup(rg) => write!(f, "resource group {}", rg),
        }
    }
}

/// A registry together with its admin credentials.
#[derive(Debug, Clone)]
pub struct RegistryAccess {
    pub registry: Registry,
    pub credentials: RegistryCredentials,
}

/// Cloud identity provider.
///
/// Non-zero exit of the underlying tool surfaces as `ToolError::Failed`;
/// successful calls return parsed JSON.
pub trait IdentityProvider {
    /// Fail unless the provider is installed and logged in.
    fn ensure_ready(&self) -> Result<()>;

    /// Current account and subscription.
    fn account(&self) -> Result<Account>;

    /// Create a contributor service principal scoped to a subscription.
    fn create_service_principal(&self, name: &str, subscription_id: &str) -> Result<Credentials>;

    /// Find a registry. `None` when nothing matches.
    fn find_registry(&self, lookup: &RegistryLookup) -> Result<Option<Registry>>;

    /// Turn on admin credentials for a registry.
    fn enable_registry_admin(&self, registry: &str) -> Result<()>;

    /// Fetch the admin username and first password of a registry.
    fn registry_credentials(&self, registry: &str) -> Result<RegistryCredentials>;

    /// Find a registry, enable its admin user, and fetch the credentials.
    fn registry_access(&self, lookup: &RegistryLookup) -> Result<Option<RegistryAccess>> {
        let Some(registry) = self.find_registry(lookup)? else {
            return Ok(None);
        };
        self.enable_registry_admin(&registry.name)?;
        let credentials = self.registry_credentials(&registry.name)?;
        Ok(Some(RegistryAccess {
            registry,
            credentials,
        }))
    }
}

/// Service principal name made of a prefix and a UTC timestamp.
///
/// Example: `sp-github-20240131-235959`
pub fn service_principal_name(prefix: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    format!("{}-{}", prefix, now.format("%Y%m%d-%H%M%S"))
}
