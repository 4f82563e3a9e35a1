//! Rotate command - replace AZURE_CREDENTIALS with a new service principal.

use clap::Args;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::upload::upload_document;
use crate::cli::{output, TargetArgs};
use crate::core::config::Config;
use crate::core::constants::names;
use crate::core::document::SecretsDocument;
use crate::core::provider::{service_principal_name, AzureCli, IdentityProvider};
use crate::core::store::{GitHubCli, SecretStore};
use crate::core::types::Repository;
use crate::error::Result;

/// Arguments for `secretsync rotate`.
#[derive(Args, Debug, Clone, Default)]
pub struct RotateArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Secrets document to update [default: github-secrets.txt]
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Prefix for the new service principal name
    #[arg(long)]
    pub sp_prefix: Option<String>,

    /// Show what would change without calling az or gh
    #[arg(long)]
    pub dry_run: bool,
}

/// Rotate service-principal credentials.
pub fn execute(args: RotateArgs, config: &Config) -> Result<()> {
    let repo = args.target.resolve(config)?;
    let path = config.document_path(args.file);
    let prefix = config.sp_prefix(args.sp_prefix);
    info!(%repo, path = %path.display(), dry_run = args.dry_run, "running rotate");

    if args.dry_run {
        let doc = SecretsDocument::load(&path, true)?;
        let action = if doc.contains(names::AZURE_CREDENTIALS) {
            "replace"
        } else {
            "add"
        };
        output::dry_run(&format!(
            "would create service principal {}-<timestamp>",
            prefix
        ));
        output::dry_run(&format!(
            "would {} {} in {}",
            action,
            names::AZURE_CREDENTIALS,
            path.display()
        ));
        output::dry_run(&format!("would upload {} secrets to {}", doc.len(), repo));
        return Ok(());
    }

    run(&AzureCli::new(), &GitHubCli::new(), &repo, &path, &prefix)
}

/// Create a service principal, rewrite the document, and upload it.
pub(crate) fn run(
    identity: &dyn IdentityProvider,
    store: &dyn SecretStore,
    repo: &Repository,
    path: &Path,
    prefix: &str,
) -> Result<()> {
    output::step("Checking Azure CLI", || identity.ensure_ready())?;
    output::step("Checking GitHub CLI", || store.ensure_ready())?;

    let mut doc = SecretsDocument::load(path, true)?;
    output::step(&format!("Checking access to {}", repo), || {
        store.check_repository(repo)
    })?;

    let account = identity.account()?;
    output::kv("subscription", &account.name);
    output::kv("subscription id", &account.subscription_id);
    output::kv("tenant id", &account.tenant_id);

    let name = service_principal_name(prefix, chrono::Utc::now());
    let credentials = output::step(&format!("Creating service principal {}", name), || {
        identity.create_service_principal(&name, &account.subscription_id)
    })?;

    doc.set(names::AZURE_CREDENTIALS, &credentials.to_compact())?;
    doc.save(path)?;
    output::success(&format!("updated {}", output::path(&path.display().to_string())));

    upload_document(store, repo, &doc)?;

    output::section("New service principal");
    output::kv("name", &name);
    output::kv("client id", credentials.client_id().unwrap_or_default());
    output::kv("tenant id", credentials.tenant_id().unwrap_or_default());
    output::kv(
        "subscription id",
        credentials.subscription_id().unwrap_or_default(),
    );
    Ok(())
}
