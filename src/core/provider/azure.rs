//! Azure CLI identity provider.
//!
//! ## Requirements
//!
//! - `az` CLI must be installed and logged in (`az login`)
//! - The account must be allowed to create role assignments on the
//!   subscription for `create-for-rbac`

use serde::Deserialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::{Account, IdentityProvider, Registry, RegistryCredentials, RegistryLookup};
use crate::core::credentials::Credentials;
use crate::core::exec::Tool;
use crate::error::{Error, Result, ToolError};

const INSTALL_HINT: &str =
    "install the Azure CLI: https://learn.microsoft.com/cli/azure/install-azure-cli";
const LOGIN_HINT: &str = "run: az login";
const ACCOUNT_QUERY: &str = "{subscriptionId:id, tenantId:tenantId, name:name}";

/// Identity provider backed by the `az` CLI.
#[derive(Debug, Clone)]
pub struct AzureCli {
    tool: Tool,
}

impl Default for AzureCli {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureCli {
    pub fn new() -> Self {
        Self {
            tool: Tool::new("az", INSTALL_HINT),
        }
    }
}

#[derive(Deserialize)]
struct AcrCredentialOutput {
    username: String,
    #[serde(default)]
    passwords: Vec<AcrPassword>,
}

#[derive(Deserialize)]
struct AcrPassword {
    value: String,
}

impl IdentityProvider for AzureCli {
    fn ensure_ready(&self) -> Result<()> {
        self.tool.ensure_installed()?;
        if !self.tool.status_ok(&["account", "show"])? {
            return Err(ToolError::NotAuthenticated {
                program: self.tool.program().to_string(),
                hint: LOGIN_HINT.to_string(),
            }
            .into());
        }
        debug!("azure cli ready");
        Ok(())
    }

    fn account(&self) -> Result<Account> {
        self.tool
            .run_json(&["account", "show", "--query", ACCOUNT_QUERY, "--output", "json"])
    }

    fn create_service_principal(&self, name: &str, subscription_id: &str) -> Result<Credentials> {
        let scope = format!("/subscriptions/{}", subscription_id);
        let value: serde_json::Value = self.tool.run_json(&[
            "ad",
            "sp",
            "create-for-rbac",
            "--name",
            name,
            "--role",
            "contributor",
            "--scopes",
            scope.as_str(),
            "--json-auth",
        ])?;
        Credentials::from_value(value)
    }

    fn find_registry(&self, lookup: &RegistryLookup) -> Result<Option<Registry>> {
        let args: Vec<&str> = match lookup {
            RegistryLookup::Named(name) => vec!["acr", "show", "--name", name.as_str(), "--output", "json"],
            RegistryLookup::InResourceGroup(rg) => {
                vec!["acr", "list", "--resource-group", rg.as_str(), "--output", "json"]
            }
        };

        let output = self.tool.output(&args, None)?;
        if !output.status.success() {
            warn!(
                %lookup,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "registry lookup failed"
            );
            return Ok(None);
        }

        let parse_err = |source: serde_json::Error| -> Error {
            ToolError::InvalidOutput {
                command: format!("az {}", args.join(" ")),
                source,
            }
            .into()
        };
        let registry = match lookup {
            RegistryLookup::Named(_) => {
                Some(serde_json::from_slice::<Registry>(&output.stdout).map_err(parse_err)?)
            }
            RegistryLookup::InResourceGroup(_) => {
                serde_json::from_slice::<Vec<Registry>>(&output.stdout)
                    .map_err(parse_err)?
                    .into_iter()
                    .next()
            }
        };
        debug!(?registry, "registry lookup finished");
        Ok(registry)
    }

    fn enable_registry_admin(&self, registry: &str) -> Result<()> {
        self.tool.run(&[
            "acr",
            "update",
            "--name",
            registry,
            "--admin-enabled",
            "true",
        ])?;
        Ok(())
    }

    fn registry_credentials(&self, registry: &str) -> Result<RegistryCredentials> {
        let output: AcrCredentialOutput = self.tool.run_json(&[
            "acr",
            "credential",
            "show",
            "--name",
            registry,
            "--output",
            "json",
        ])?;
        let password = output.passwords.into_iter().next().ok_or_else(|| {
            Error::Other(format!("registry {} returned no admin passwords", registry))
        })?;
        Ok(RegistryCredentials {
            username: output.username,
            password: Zeroizing::new(password.value),
        })
    }
}
