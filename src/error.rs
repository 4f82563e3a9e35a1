//! Error types for secretsync.
//!
//! Errors are grouped by concern: document parsing, credential validation,
//! external tools, configuration, and uploads. Each group converts into the
//! top-level [`Error`] so callers can propagate with `?`.

use thiserror::Error;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Process exit status for this error.
    ///
    /// A failed external command propagates its own exit code; everything
    /// else exits with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Tool(ToolError::Failed {
                code: Some(code), ..
            }) if *code != 0 => *code,
            _ => 1,
        }
    }

    /// Remediation hint shown under the error message, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Error::Tool(ToolError::NotInstalled { hint, .. }) => Some(hint.as_str()),
            Error::Tool(ToolError::NotAuthenticated { hint, .. }) => Some(hint.as_str()),
            Error::Config(ConfigError::Missing { hint, .. }) => Some(hint.as_str()),
            Error::Document(DocumentError::NotFound(_)) => {
                Some("create it with: secretsync setup")
            }
            _ => None,
        }
    }
}

/// Secrets document errors.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("secrets file not found: {0}")]
    NotFound(String),

    #[error("line {line}: value of {name} never closes its braces")]
    Unterminated { name: String, line: usize },

    #[error("line {line}: {name} has no Value: line")]
    MissingValue { name: String, line: usize },

    #[error("line {line}: Name: declaration without a name")]
    EmptyName { line: usize },

    #[error("line {line}: Value: without a preceding Name:")]
    OrphanValue { line: usize },

    #[error("{0} has a multi-line value that is not a JSON object")]
    MultilineScalar(String),

    #[error("value of {0} starts with '{{' but would not parse back as one JSON object")]
    AmbiguousValue(String),

    #[error("invalid secret name: {0:?}")]
    InvalidName(String),

    #[error("no secrets found in {0}")]
    Empty(String),
}

/// Credential validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{record} failed validation: {issues}")]
    Credentials { record: String, issues: String },

    #[error("{0} is not a JSON object")]
    NotAnObject(String),

    #[error("invalid repository: {0}")]
    Repository(String),
}

/// External command-line tool errors.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("{program} not found")]
    NotInstalled { program: String, hint: String },

    #[error("{program} is not authenticated")]
    NotAuthenticated { program: String, hint: String },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command failed: {command}{}", format_captured(.stdout, .stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    #[error("unexpected output from {command}: {source}")]
    InvalidOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot access repository {0}")]
    RepositoryAccess(String),

    #[error("no container registry found: {0}")]
    RegistryNotFound(String),
}

fn format_captured(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    if !stdout.trim().is_empty() {
        out.push_str("\n  stdout: ");
        out.push_str(stdout.trim());
    }
    if !stderr.trim().is_empty() {
        out.push_str("\n  stderr: ");
        out.push_str(stderr.trim());
    }
    out
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing required setting: {name}")]
    Missing { name: &'static str, hint: String },

    #[error("conflicting options: {0}")]
    Conflict(String),
}

/// Upload errors.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("{failed} of {attempted} secrets failed to upload")]
    Partial { failed: usize, attempted: usize },

    #[error("no secrets to upload")]
    Nothing,
}

/// Result alias using the crate error.
pub type Result<T> = std::result::Result<T, Error>;
