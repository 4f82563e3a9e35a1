//! Setup command - create a service principal, write a fresh secrets
//! document, and upload it.

use clap::Args;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::upload::upload_document;
use crate::cli::{output, TargetArgs};
use crate::core::config::{pick, Config};
use crate::core::constants::names;
use crate::core::credentials::Credentials;
use crate::core::document::{Section, SecretsDocument};
use crate::core::provider::{
    service_principal_name, AzureCli, IdentityProvider, RegistryAccess, RegistryLookup,
};
use crate::core::store::{GitHubCli, SecretStore};
use crate::core::types::Repository;
use crate::error::{ConfigError, Result, ToolError};

/// Arguments for `secretsync setup`.
#[derive(Args, Debug, Clone, Default)]
pub struct SetupArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Subscription to scope the service principal to [default: current account]
    #[arg(long)]
    pub subscription_id: Option<String>,

    /// Service principal name [default: <sp prefix>-<timestamp>]
    #[arg(long)]
    pub sp_name: Option<String>,

    /// Resource group holding the container registry
    #[arg(long)]
    pub resource_group: Option<String>,

    /// Container App name
    #[arg(long)]
    pub container_app_name: Option<String>,

    /// Container Apps environment name
    #[arg(long)]
    pub container_app_env: Option<String>,

    /// Database connection URI
    #[arg(long)]
    pub db_uri: Option<String>,

    /// Database name
    #[arg(long)]
    pub db_name: Option<String>,

    /// Secrets document to write [default: github-secrets.txt]
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Overwrite an existing secrets document without asking
    #[arg(long)]
    pub force: bool,

    /// Show what would happen without calling az or gh
    #[arg(long)]
    pub dry_run: bool,
}

/// Resolved setup inputs.
#[derive(Debug, Clone, Default)]
pub(crate) struct SetupOptions {
    pub subscription_id: Option<String>,
    pub sp_name: Option<String>,
    pub sp_prefix: String,
    pub resource_group: String,
    pub container_app_name: Option<String>,
    pub container_app_env: Option<String>,
    pub db_uri: Option<String>,
    pub db_name: Option<String>,
}

impl SetupOptions {
    fn from_args(args: &SetupArgs, config: &Config) -> Result<Self> {
        let resource_group = pick(args.resource_group.clone(), &config.azure.resource_group)
            .ok_or_else(|| ConfigError::Missing {
                name: "resource_group",
                hint: "pass --resource-group or set [azure] resource_group in .secretsync.toml"
                    .to_string(),
            })?;

        Ok(Self {
            subscription_id: pick(args.subscription_id.clone(), &config.azure.subscription_id),
            sp_name: args.sp_name.clone(),
            sp_prefix: config.sp_prefix(None),
            resource_group,
            container_app_name: pick(
                args.container_app_name.clone(),
                &config.azure.container_app_name,
            ),
            container_app_env: pick(
                args.container_app_env.clone(),
                &config.azure.container_app_env,
            ),
            db_uri: args.db_uri.clone(),
            db_name: args.db_name.clone(),
        })
    }
}

/// Run first-time setup.
pub fn execute(args: SetupArgs, config: &Config) -> Result<()> {
    let repo = args.target.resolve(config)?;
    let path = config.document_path(args.file.clone());
    let options = SetupOptions::from_args(&args, config)?;
    info!(%repo, path = %path.display(), dry_run = args.dry_run, "running setup");

    if args.dry_run {
        let sp = options
            .sp_name
            .clone()
            .unwrap_or_else(|| format!("{}-<timestamp>", options.sp_prefix));
        output::dry_run(&format!("would create service principal {}", sp));
        output::dry_run(&format!(
            "would read registry credentials from resource group {}",
            options.resource_group
        ));
        let verb = if path.exists() { "overwrite" } else { "write" };
        output::dry_run(&format!("would {} {}", verb, path.display()));
        output::dry_run(&format!("would upload the document to {}", repo));
        return Ok(());
    }

    confirm_overwrite(&path, args.force)?;
    run(&AzureCli::new(), &GitHubCli::new(), &repo, &path, &options)
}

/// Refuse to clobber an existing document unless forced or confirmed.
fn confirm_overwrite(path: &Path, force: bool) -> Result<()> {
    if force || !path.exists() {
        return Ok(());
    }
    let shown = path.display().to_string();
    if !std::io::stdin().is_terminal() {
        return Err(ConfigError::Conflict(format!(
            "{} already exists, pass --force to overwrite it",
            shown
        ))
        .into());
    }

    output::warn(&format!("{} already exists", output::path(&shown)));
    let overwrite = dialoguer::Confirm::new()
        .with_prompt("Overwrite it?")
        .default(false)
        .interact()?;
    if overwrite {
        Ok(())
    } else {
        Err(ConfigError::Conflict(format!("{} left untouched", shown)).into())
    }
}

/// Create credentials, write the document, and upload it.
pub(crate) fn run(
    identity: &dyn IdentityProvider,
    store: &dyn SecretStore,
    repo: &Repository,
    path: &Path,
    options: &SetupOptions,
) -> Result<()> {
    output::step("Checking Azure CLI", || identity.ensure_ready())?;
    output::step("Checking GitHub CLI", || store.ensure_ready())?;
    output::step(&format!("Checking access to {}", repo), || {
        store.check_repository(repo)
    })?;

    let account = identity.account()?;
    let subscription = options
        .subscription_id
        .clone()
        .unwrap_or_else(|| account.subscription_id.clone());
    output::kv("subscription", format!("{} ({})", account.name, subscription));
    output::kv("tenant id", &account.tenant_id);

    let lookup = RegistryLookup::InResourceGroup(options.resource_group.clone());
    let registry = output::step(&format!("Looking up {}", lookup), || {
        identity.registry_access(&lookup)
    })?
    .ok_or_else(|| ToolError::RegistryNotFound(lookup.to_string()))?;

    let name = options
        .sp_name
        .clone()
        .unwrap_or_else(|| service_principal_name(&options.sp_prefix, chrono::Utc::now()));
    let credentials = output::step(&format!("Creating service principal {}", name), || {
        identity.create_service_principal(&name, &subscription)
    })?;

    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let doc = render(&credentials, &registry, options, &generated)?;
    doc.save(path)?;
    output::success(&format!("wrote {}", output::path(&path.display().to_string())));

    upload_document(store, repo, &doc)?;

    output::section("Next steps");
    output::dimmed("1. Push your code to trigger the GitHub Actions workflow");
    output::dimmed(&format!(
        "2. Monitor the deployment at: https://github.com/{}/actions",
        repo
    ));
    output::section("Summary");
    output::kv("service principal", credentials.client_id().unwrap_or(name.as_str()));
    output::kv("container registry", &registry.registry.name);
    output::kv("login server", &registry.registry.login_server);
    Ok(())
}

/// Build the secrets document written by setup.
fn render(
    credentials: &Credentials,
    registry: &RegistryAccess,
    options: &SetupOptions,
    generated: &str,
) -> Result<SecretsDocument> {
    let header = vec![
        "GitHub Secrets Configuration Template".to_string(),
        format!("Generated on {}", generated),
    ];
    let compact = credentials.to_compact();
    let sections = [
        Section::new("AZURE AUTHENTICATION").with(names::AZURE_CREDENTIALS, Some(compact.as_str())),
        Section::new("CONTAINER REGISTRY")
            .with(
                names::REGISTRY_LOGIN_SERVER,
                Some(registry.registry.login_server.as_str()),
            )
            .with(
                names::REGISTRY_USERNAME,
                Some(registry.credentials.username.as_str()),
            )
            .with(
                names::REGISTRY_PASSWORD,
                Some(registry.credentials.password.as_str()),
            ),
        Section::new("AZURE RESOURCES")
            .with(names::RESOURCE_GROUP, Some(options.resource_group.as_str()))
            .with(
                names::CONTAINER_APP_NAME,
                options.container_app_name.as_deref(),
            )
            .with(
                names::CONTAINER_APP_ENVIRONMENT,
                options.container_app_env.as_deref(),
            ),
        Section::new("DATABASE")
            .with(names::DB_URI, options.db_uri.as_deref())
            .with(names::DB_NAME, options.db_name.as_deref()),
    ];
    SecretsDocument::from_sections(&header, &sections)
}
