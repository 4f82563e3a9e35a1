//! Validate command - check a document without uploading it.

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::credentials::{self, CredentialSchema};
use crate::core::document::SecretsDocument;
use crate::error::Result;

/// Arguments for `secretsync validate`.
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {
    /// Secrets document to check [default: github-secrets.txt]
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Parse strictly and validate AZURE_CREDENTIALS.
pub fn execute(args: ValidateArgs, config: &Config) -> Result<()> {
    let path = config.document_path(args.file);
    info!(path = %path.display(), "running validate");

    let doc = SecretsDocument::load(&path, true)?;
    check(&doc)?;
    output::success(&format!(
        "{} is ready to upload ({} secrets)",
        output::path(&path.display().to_string()),
        doc.len()
    ));
    Ok(())
}

fn check(doc: &SecretsDocument) -> Result<()> {
    let report = credentials::validate(doc, &CredentialSchema::azure());
    for issue in &report.issues {
        output::error(&format!("{}: {}", report.record, issue));
    }
    report.into_result()
}
