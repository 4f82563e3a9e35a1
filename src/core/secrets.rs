//! Secret sets and uploads.
//!
//! A [`SecretSet`] is the ordered list of secrets a command intends to
//! publish. [`upload_all`] pushes every entry to a store independently and
//! reports a summary instead of stopping at the first failure.

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::constants::{PREVIEW_LEN, SENSITIVE_NAMES};
use crate::core::store::SecretStore;
use crate::core::types::{Repository, SecretName, SecretValue};
use crate::error::{Result, UploadError};

/// Ordered secrets to publish. Setting a name twice keeps its first
/// position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretSet {
    entries: IndexMap<SecretName, SecretValue>,
}

impl SecretSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<SecretValue>) {
        self.entries.insert(name.to_string(), value.into());
    }

    /// Insert only when a value is present.
    pub fn insert_opt(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.insert(name, value);
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `NAME=value` lines with sensitive values redacted, for dry runs.
    pub fn describe(&self) -> Vec<String> {
        self.iter()
            .map(|(name, value)| format!("{}={}", name, display_value(name, value)))
            .collect()
    }
}

impl From<&IndexMap<SecretName, SecretValue>> for SecretSet {
    fn from(map: &IndexMap<SecretName, SecretValue>) -> Self {
        Self {
            entries: map.clone(),
        }
    }
}

/// Whether a secret's value must never be printed.
pub fn is_sensitive(name: &str) -> bool {
    SENSITIVE_NAMES.contains(&name)
        || name.contains("PASSWORD")
        || name.contains("SECRET")
        || name.contains("TOKEN")
}

/// Value as shown to the operator: redacted when sensitive, else a preview.
pub fn display_value(name: &str, value: &str) -> String {
    if is_sensitive(name) {
        "<redacted>".to_string()
    } else {
        preview(value, PREVIEW_LEN)
    }
}

/// First `len` characters of a value, with `...` when cut, on one line.
pub fn preview(value: &str, len: usize) -> String {
    let flat = value.replace('\n', " ");
    if flat.chars().count() > len {
        let cut: String = flat.chars().take(len).collect();
        format!("{}...", cut)
    } else {
        flat
    }
}

/// Outcome of an upload run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub attempted: usize,
    /// Secret name and failure message, in upload order.
    pub failed: Vec<(SecretName, String)>,
}

impl UploadSummary {
    pub fn succeeded(&self) -> usize {
        self.attempted - self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// `Ok` only when every attempted secret was uploaded.
    pub fn into_result(self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(UploadError::Partial {
                failed: self.failed.len(),
                attempted: self.attempted,
            }
            .into())
        }
    }
}

/// Upload every secret in the set, continuing past failures.
///
/// `progress` is called after each attempt with the secret name and the
/// error, if any.
///
/// # Errors
///
/// Returns `UploadError::Nothing` for an empty set. Individual upload
/// failures are reported in the summary, not as an error.
pub fn upload_all<S, F>(
    store: &S,
    repo: &Repository,
    secrets: &SecretSet,
    mut progress: F,
) -> Result<UploadSummary>
where
    S: SecretStore + ?Sized,
    F: FnMut(&str, Option<&crate::error::Error>),
{
    if secrets.is_empty() {
        return Err(UploadError::Nothing.into());
    }

    let mut summary = UploadSummary::default();
    for (name, value) in secrets.iter() {
        summary.attempted += 1;
        match store.set_secret(repo, name, value) {
            Ok(()) => {
                debug!(name, %repo, "secret uploaded");
                progress(name, None);
            }
            Err(e) => {
                warn!(name, %repo, error = %e, "secret upload failed");
                progress(name, Some(&e));
                summary.failed.push((name.to_string(), e.to_string()));
            }
        }
    }
    Ok(summary)
}
