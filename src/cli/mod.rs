//! Command-line interface.

pub mod completions;
pub mod output;
pub mod rotate;
pub mod setup;
pub mod show;
pub mod sync;
pub mod upload;
pub mod validate;

use clap::{Args, Parser, Subcommand};

use crate::core::config::Config;
use crate::core::types::Repository;
use crate::error::{ConfigError, Result};

/// secretsync - provision Azure credentials and publish them as GitHub secrets.
#[derive(Parser)]
#[command(
    name = "secretsync",
    about = "Provision Azure credentials and publish them as GitHub repository secrets",
    version,
    after_help = "Logs: set SECRETSYNC_LOG=debug for details on every az/gh call."
)]
pub struct Cli {
    /// Show debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Upload every secret in a secrets document
    Upload(upload::UploadArgs),

    /// Create or reuse Azure credentials and upload them directly
    Sync(sync::SyncArgs),

    /// Create a new service principal and refresh AZURE_CREDENTIALS
    Rotate(rotate::RotateArgs),

    /// Create a service principal, write a fresh secrets document, upload it
    Setup(setup::SetupArgs),

    /// List the secrets a document defines
    Show(show::ShowArgs),

    /// Check AZURE_CREDENTIALS in a document without uploading
    Validate(validate::ValidateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Target repository flags shared by every uploading command.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// GitHub user or organization owning the repository
    #[arg(long, env = "SECRETSYNC_USER")]
    pub user: Option<String>,

    /// GitHub repository name (or owner/name)
    #[arg(long, env = "SECRETSYNC_REPO")]
    pub repo: Option<String>,
}

impl TargetArgs {
    /// Resolve the repository from flags, env vars, then the config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when user or repo cannot be found, and
    /// `ConfigError::Conflict` when `--repo owner/name` disagrees with `--user`.
    pub fn resolve(&self, config: &Config) -> Result<Repository> {
        let repo = self
            .repo
            .clone()
            .or_else(|| config.github.repo.clone())
            .ok_or_else(|| ConfigError::Missing {
                name: "repo",
                hint: "pass --repo or set [github] repo in .secretsync.toml".to_string(),
            })?;

        if let Some((owner, name)) = repo.split_once('/') {
            if let Some(user) = &self.user {
                if user != owner {
                    return Err(ConfigError::Conflict(format!(
                        "--user {} does not match --repo {}",
                        user, repo
                    ))
                    .into());
                }
            }
            return Repository::new(owner, name);
        }

        let user = self
            .user
            .clone()
            .or_else(|| config.github.user.clone())
            .ok_or_else(|| ConfigError::Missing {
                name: "user",
                hint: "pass --user or set [github] user in .secretsync.toml".to_string(),
            })?;
        Repository::new(&user, &repo)
    }
}

/// Execute a command.
pub fn execute(command: Command) -> Result<()> {
    use Command::*;

    match command {
        Upload(args) => upload::execute(args, &Config::load()?),
        Sync(args) => sync::execute(args, &Config::load()?),
        Rotate(args) => rotate::execute(args, &Config::load()?),
        Setup(args) => setup::execute(args, &Config::load()?),
        Show(args) => show::execute(args, &Config::load()?),
        Validate(args) => validate::execute(args, &Config::load()?),
        Completions { shell } => completions::execute(shell),
    }
}
