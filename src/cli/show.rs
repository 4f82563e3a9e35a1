//! Show command - list the secrets a document defines.

use clap::Args;
use std::path::PathBuf;
use tracing::info;

use crate::cli::output;
use crate::core::config::Config;
use crate::core::document::{Diagnostic, SecretsDocument};
use crate::core::secrets::{display_value, is_sensitive};
use crate::error::{DocumentError, Result};

/// Arguments for `secretsync show`.
#[derive(Args, Debug, Clone, Default)]
pub struct ShowArgs {
    /// Secrets document to read [default: github-secrets.txt]
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Print names and skipped entries as JSON
    #[arg(long)]
    pub json: bool,
}

/// Show a secrets document.
pub fn execute(args: ShowArgs, config: &Config) -> Result<()> {
    let path = config.document_path(args.file);
    info!(path = %path.display(), "running show");

    let doc = SecretsDocument::load(&path, false)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&doc))?);
        return Ok(());
    }

    output::header(&format!(
        "{} ({} secrets)",
        output::path(&path.display().to_string()),
        doc.len()
    ));
    for (name, value) in doc.secrets() {
        output::kv(&output::key(name), display_value(name, value));
    }
    for diagnostic in doc.diagnostics() {
        output::warn(&format!(
            "{}: {}",
            label(diagnostic),
            DocumentError::from(diagnostic.clone())
        ));
    }
    Ok(())
}

fn label(diagnostic: &Diagnostic) -> &'static str {
    match diagnostic {
        Diagnostic::Interrupted { .. } => "incomplete",
        _ => "skipped",
    }
}

/// Names, sensitivity, and problem entries. Values are never included.
fn to_json(doc: &SecretsDocument) -> serde_json::Value {
    let secrets: Vec<serde_json::Value> = doc
        .secrets()
        .keys()
        .map(|name| serde_json::json!({ "name": name, "sensitive": is_sensitive(name) }))
        .collect();
    let mut skipped = Vec::new();
    let mut incomplete = Vec::new();
    for d in doc.diagnostics() {
        let message = DocumentError::from(d.clone()).to_string();
        if matches!(d, Diagnostic::Interrupted { .. }) {
            incomplete.push(message);
        } else {
            skipped.push(message);
        }
    }
    serde_json::json!({ "secrets": secrets, "skipped": skipped, "incomplete": incomplete })
}
