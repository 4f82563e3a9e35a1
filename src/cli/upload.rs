//! Upload command - publish every secret in a secrets document.

use clap::Args;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cli::{output, TargetArgs};
use crate::core::config::Config;
use crate::core::credentials::{self, CredentialSchema};
use crate::core::document::SecretsDocument;
use crate::core::secrets::{self, SecretSet};
use crate::core::store::{GitHubCli, SecretStore};
use crate::core::types::Repository;
use crate::error::{DocumentError, Result};

/// Arguments for `secretsync upload`.
#[derive(Args, Debug, Clone, Default)]
pub struct UploadArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Secrets document to upload [default: github-secrets.txt]
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Show what would be uploaded without calling gh
    #[arg(long)]
    pub dry_run: bool,
}

/// Upload a secrets document.
pub fn execute(args: UploadArgs, config: &Config) -> Result<()> {
    let repo = args.target.resolve(config)?;
    let path = config.document_path(args.file);
    info!(%repo, path = %path.display(), dry_run = args.dry_run, "running upload");

    if args.dry_run {
        let doc = SecretsDocument::load(&path, true)?;
        return plan(&repo, &doc);
    }

    run(&GitHubCli::new(), &repo, &path)
}

/// Check the store, load the document strictly, and upload it.
pub(crate) fn run(store: &dyn SecretStore, repo: &Repository, path: &Path) -> Result<()> {
    output::step("Checking GitHub CLI", || store.ensure_ready())?;
    output::step(&format!("Checking access to {}", repo), || {
        store.check_repository(repo)
    })?;

    let doc = SecretsDocument::load(path, true)?;
    if doc.is_empty() {
        return Err(DocumentError::Empty(path.display().to_string()).into());
    }
    upload_document(store, repo, &doc)
}

/// Print, validate, and upload a parsed document.
///
/// Nothing is uploaded when `AZURE_CREDENTIALS` fails validation.
pub(crate) fn upload_document(
    store: &dyn SecretStore,
    repo: &Repository,
    doc: &SecretsDocument,
) -> Result<()> {
    output::section(&format!("Found {} secrets", doc.len()));
    for (name, value) in doc.secrets() {
        output::kv(&output::key(name), secrets::display_value(name, value));
    }

    check_credentials(doc)?;
    publish(store, repo, &SecretSet::from(doc.secrets()))
}

/// Upload a secret set, print a summary, and list the repository's
/// secrets when everything went through.
pub(crate) fn publish(store: &dyn SecretStore, repo: &Repository, set: &SecretSet) -> Result<()> {
    output::section(&format!("Uploading to {}", repo));
    let summary = secrets::upload_all(store, repo, set, |name, err| match err {
        None => output::success(name),
        Some(e) => output::error(&format!("{}: {}", name, e)),
    })?;

    output::blank();
    let line = format!(
        "{}/{} secrets uploaded",
        summary.succeeded(),
        summary.attempted
    );
    if summary.is_success() {
        output::success(&line);
        list_uploaded(store, repo);
    } else {
        output::warn(&line);
    }
    summary.into_result()
}

fn check_credentials(doc: &SecretsDocument) -> Result<()> {
    let report = credentials::validate(doc, &CredentialSchema::azure());
    if report.is_valid() {
        output::success(&format!("{} is valid", report.record));
    } else {
        for issue in &report.issues {
            output::error(&format!("{}: {}", report.record, issue));
        }
    }
    report.into_result()
}

fn list_uploaded(store: &dyn SecretStore, repo: &Repository) {
    match store.list_secrets(repo) {
        Ok(names) => {
            output::section(&format!("Secrets in {}", repo));
            for name in names {
                output::list_item(&name);
            }
        }
        Err(e) => {
            warn!(error = %e, "could not list repository secrets");
            output::warn(&format!("could not list repository secrets: {}", e));
        }
    }
}

fn plan(repo: &Repository, doc: &SecretsDocument) -> Result<()> {
    check_credentials(doc)?;
    let set = SecretSet::from(doc.secrets());
    output::dry_run(&format!("would upload {} secrets to {}", set.len(), repo));
    for line in set.describe() {
        output::list_item(&line);
    }
    Ok(())
}
