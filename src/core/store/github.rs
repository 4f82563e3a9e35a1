//! GitHub CLI secret store.
//!
//! Values are written to `gh secret set` on stdin so they never show up in
//! process listings.

use tracing::debug;
use zeroize::Zeroizing;

use super::SecretStore;
use crate::core::exec::Tool;
use crate::core::types::Repository;
use crate::error::{Result, ToolError};

const INSTALL_HINT: &str = "install the GitHub CLI: https://cli.github.com/";
const LOGIN_HINT: &str = "run: gh auth login";

/// Secret store backed by the `gh` CLI.
#[derive(Debug, Clone)]
pub struct GitHubCli {
    tool: Tool,
}

impl Default for GitHubCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitHubCli {
    pub fn new() -> Self {
        Self {
            tool: Tool::new("gh", INSTALL_HINT),
        }
    }
}

impl SecretStore for GitHubCli {
    fn ensure_ready(&self) -> Result<()> {
        self.tool.ensure_installed()?;
        if !self.tool.status_ok(&["auth", "status"])? {
            return Err(ToolError::NotAuthenticated {
                program: self.tool.program().to_string(),
                hint: LOGIN_HINT.to_string(),
            }
            .into());
        }
        debug!("github cli ready");
        Ok(())
    }

    fn check_repository(&self, repo: &Repository) -> Result<()> {
        let repo = repo.to_string();
        if !self.tool.status_ok(&["repo", "view", repo.as_str()])? {
            return Err(ToolError::RepositoryAccess(repo).into());
        }
        Ok(())
    }

    fn set_secret(&self, repo: &Repository, name: &str, value: &str) -> Result<()> {
        let repo = repo.to_string();
        let value = Zeroizing::new(value.to_string());
        self.tool.run_with_input(
            &["secret", "set", name, "--repo", repo.as_str()],
            Some(value.as_str()),
        )?;
        Ok(())
    }

    fn list_secrets(&self, repo: &Repository) -> Result<Vec<String>> {
        let repo = repo.to_string();
        let stdout = self.tool.run(&["secret", "list", "--repo", repo.as_str()])?;
        Ok(parse_secret_list(&stdout))
    }
}

/// First column of each non-empty line of `gh secret list`.
fn parse_secret_list(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
