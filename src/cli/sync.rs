//! Sync command - create or reuse Azure credentials and upload them as
//! repository secrets without going through a document.

use clap::Args;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::cli::upload::publish;
use crate::cli::{output, TargetArgs};
use crate::core::config::{pick, Config};
use crate::core::constants::names;
use crate::core::credentials::{CredentialSchema, Credentials};
use crate::core::database::DatabaseComponents;
use crate::core::provider::{
    service_principal_name, AzureCli, IdentityProvider, RegistryAccess, RegistryLookup,
};
use crate::core::secrets::{display_value, SecretSet};
use crate::core::store::{GitHubCli, SecretStore};
use crate::core::types::Repository;
use crate::error::Result;

/// Arguments for `secretsync sync`.
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Resource group holding the container registry
    #[arg(long)]
    pub resource_group: Option<String>,

    /// Container registry name (skips the resource group lookup)
    #[arg(long)]
    pub acr_name: Option<String>,

    /// Container App name
    #[arg(long)]
    pub container_app_name: Option<String>,

    /// Container Apps environment name
    #[arg(long)]
    pub container_app_env: Option<String>,

    /// Database connection URI
    #[arg(long)]
    pub db_uri: Option<String>,

    /// Database name (overrides the name taken from --db-uri)
    #[arg(long)]
    pub db_name: Option<String>,

    /// Also upload DB_HOST, DB_PORT, DB_USER, DB_PASSWORD and DB_NAME parsed from --db-uri
    #[arg(long)]
    pub upload_db_components: bool,

    /// Existing AZURE_CREDENTIALS JSON file
    #[arg(long, conflicts_with = "creds_json")]
    pub creds_file: Option<PathBuf>,

    /// Inline AZURE_CREDENTIALS JSON
    #[arg(long)]
    pub creds_json: Option<String>,

    /// Prefix for the generated service principal name
    #[arg(long)]
    pub sp_prefix: Option<String>,

    /// Show what would be uploaded without calling az or gh
    #[arg(long)]
    pub dry_run: bool,
}

/// Where `AZURE_CREDENTIALS` comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CredentialSource {
    Inline(String),
    File(PathBuf),
    /// Create a new service principal with this name prefix.
    Create { prefix: String },
}

/// Everything `sync` will do, resolved from flags and config.
#[derive(Debug, Clone)]
pub(crate) struct SyncPlan {
    pub repo: Repository,
    pub credentials: CredentialSource,
    pub registry: Option<RegistryLookup>,
    /// Secrets known before any tool runs, in upload order.
    pub fixed: SecretSet,
}

impl SyncPlan {
    pub fn from_args(args: SyncArgs, config: &Config) -> Result<Self> {
        let repo = args.target.resolve(config)?;
        let resource_group = pick(args.resource_group, &config.azure.resource_group);
        let acr_name = pick(args.acr_name, &config.azure.acr_name);

        let credentials = match (args.creds_json, args.creds_file) {
            (Some(json), _) => CredentialSource::Inline(json),
            (None, Some(path)) => CredentialSource::File(path),
            (None, None) => CredentialSource::Create {
                prefix: config.sp_prefix(args.sp_prefix),
            },
        };

        let registry = match (&acr_name, &resource_group) {
            (Some(name), _) => Some(RegistryLookup::Named(name.clone())),
            (None, Some(rg)) => Some(RegistryLookup::InResourceGroup(rg.clone())),
            (None, None) => None,
        };

        let mut fixed = SecretSet::new();
        fixed.insert_opt(names::RESOURCE_GROUP, resource_group.as_deref());
        fixed.insert_opt(
            names::CONTAINER_APP_NAME,
            pick(args.container_app_name, &config.azure.container_app_name).as_deref(),
        );
        fixed.insert_opt(
            names::CONTAINER_APP_ENVIRONMENT,
            pick(args.container_app_env, &config.azure.container_app_env).as_deref(),
        );
        if let Some(uri) = &args.db_uri {
            fixed.insert(names::DB_URI, uri.as_str());
            if args.upload_db_components {
                match DatabaseComponents::parse(uri) {
                    Some(parts) => {
                        for (name, value) in parts.secrets() {
                            fixed.insert(name, value);
                        }
                    }
                    None => output::warn("--db-uri is not a postgres URI, skipping DB_* components"),
                }
            }
        }
        fixed.insert_opt(names::DB_NAME, args.db_name.as_deref());

        Ok(Self {
            repo,
            credentials,
            registry,
            fixed,
        })
    }

    /// The Azure CLI is only needed to create credentials or look up a registry.
    pub fn requires_identity(&self) -> bool {
        matches!(self.credentials, CredentialSource::Create { .. }) || self.registry.is_some()
    }

    /// Human-readable plan for `--dry-run`.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        match &self.credentials {
            CredentialSource::Inline(_) => {
                lines.push("would upload AZURE_CREDENTIALS from --creds-json".to_string())
            }
            CredentialSource::File(path) => lines.push(format!(
                "would upload AZURE_CREDENTIALS from {}",
                path.display()
            )),
            CredentialSource::Create { prefix } => lines.push(format!(
                "would create service principal {}-<timestamp> and upload AZURE_CREDENTIALS",
                prefix
            )),
        }
        if let Some(lookup) = &self.registry {
            lines.push(format!(
                "would look up {} and upload REGISTRY_LOGIN_SERVER, REGISTRY_USERNAME, REGISTRY_PASSWORD",
                lookup
            ));
        }
        for line in self.fixed.describe() {
            lines.push(format!("would set {}", line));
        }
        lines.push(format!("target repository {}", self.repo));
        lines
    }
}

/// Sync Azure credentials to GitHub.
pub fn execute(args: SyncArgs, config: &Config) -> Result<()> {
    let dry_run = args.dry_run;
    let plan = SyncPlan::from_args(args, config)?;
    info!(repo = %plan.repo, dry_run, "running sync");

    if dry_run {
        for line in plan.describe() {
            output::dry_run(&line);
        }
        return Ok(());
    }

    run(&plan, &AzureCli::new(), &GitHubCli::new())
}

/// Execute a resolved plan.
pub(crate) fn run(
    plan: &SyncPlan,
    identity: &dyn IdentityProvider,
    store: &dyn SecretStore,
) -> Result<()> {
    if plan.requires_identity() {
        output::step("Checking Azure CLI", || identity.ensure_ready())?;
    } else {
        debug!("credentials supplied and no registry requested, skipping az");
    }
    output::step("Checking GitHub CLI", || store.ensure_ready())?;
    output::step(&format!("Checking access to {}", plan.repo), || {
        store.check_repository(&plan.repo)
    })?;

    let credentials = resolve_credentials(&plan.credentials, identity)?;
    credentials.validate(&CredentialSchema::azure()).into_result()?;

    let registry = match &plan.registry {
        Some(lookup) => {
            let access = identity.registry_access(lookup)?;
            if access.is_none() {
                warn!(%lookup, "no container registry found");
                output::warn(&format!(
                    "no container registry found for {}, skipping registry secrets",
                    lookup
                ));
            }
            access
        }
        None => None,
    };

    let set = secret_set(&credentials, registry.as_ref(), &plan.fixed);
    publish(store, &plan.repo, &set)
}

fn resolve_credentials(
    source: &CredentialSource,
    identity: &dyn IdentityProvider,
) -> Result<Credentials> {
    match source {
        CredentialSource::Inline(json) => Credentials::from_json(json),
        CredentialSource::File(path) => {
            debug!(path = %path.display(), "reading credentials file");
            Credentials::from_json(&std::fs::read_to_string(path)?)
        }
        CredentialSource::Create { prefix } => {
            let account = identity.account()?;
            let name = service_principal_name(prefix, chrono::Utc::now());
            output::step(&format!("Creating service principal {}", name), || {
                identity.create_service_principal(&name, &account.subscription_id)
            })
        }
    }
}

/// Secrets in upload order: credentials, registry, then the fixed values.
fn secret_set(
    credentials: &Credentials,
    registry: Option<&RegistryAccess>,
    fixed: &SecretSet,
) -> SecretSet {
    let mut set = SecretSet::new();
    set.insert(names::AZURE_CREDENTIALS, credentials.to_compact());
    if let Some(access) = registry {
        set.insert(names::REGISTRY_LOGIN_SERVER, access.registry.login_server.as_str());
        set.insert(names::REGISTRY_USERNAME, access.credentials.username.as_str());
        set.insert(names::REGISTRY_PASSWORD, access.credentials.password.as_str());
    }
    for (name, value) in fixed.iter() {
        debug!(name, value = %display_value(name, value), "queued");
        set.insert(name, value);
    }
    set
}
