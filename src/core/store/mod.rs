//! Repository secret store abstraction.
//!
//! A secret store holds named secrets for one repository. Values only ever
//! travel to the store; they are never read back.
//!
//! ## Adding a New Store
//!
//! 1. Implement the `SecretStore` trait
//! 2. Add the implementation in a new file (e.g., `gitlab.rs`)
//! 3. Re-export from this module

use crate::core::types::Repository;
use crate::error::Result;

mod github;
#[cfg(test)]
pub(crate) mod memory;

pub use github::GitHubCli;

/// Repository secret store.
pub trait SecretStore {
    /// Fail unless the store's tool is installed and authenticated.
    fn ensure_ready(&self) -> Result<()>;

    /// Fail unless the repository exists and is visible to the caller.
    fn check_repository(&self, repo: &Repository) -> Result<()>;

    /// Create or replace one secret.
    fn set_secret(&self, repo: &Repository, name: &str, value: &str) -> Result<()>;

    /// Names of the secrets currently stored for the repository.
    fn list_secrets(&self, repo: &Repository) -> Result<Vec<String>>;
}
