//! Constants used throughout secretsync.
//!
//! Centralizes document markers, well-known secret names, and defaults.

/// Default secrets document (github-secrets.txt).
pub const DEFAULT_SECRETS_FILE: &str = "github-secrets.txt";

/// Project-local configuration file name.
pub const CONFIG_FILE: &str = ".secretsync.toml";

/// Directory under the user config dir holding the global config.
pub const CONFIG_DIR: &str = "secretsync";

/// Line prefix declaring a record name.
pub const NAME_PREFIX: &str = "Name:";

/// Line prefix declaring a record value.
pub const VALUE_PREFIX: &str = "Value:";

/// Comment marker; lines starting with it are ignored.
pub const COMMENT_MARKER: char = '#';

/// Default prefix for generated service principal names.
pub const DEFAULT_SP_PREFIX: &str = "sp-github";

/// Default PostgreSQL port when a database URI omits one.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Length of value previews printed after parsing.
pub const PREVIEW_LEN: usize = 50;

/// Well-known secret names.
pub mod names {
    pub const AZURE_CREDENTIALS: &str = "AZURE_CREDENTIALS";
    pub const REGISTRY_LOGIN_SERVER: &str = "REGISTRY_LOGIN_SERVER";
    pub const REGISTRY_USERNAME: &str = "REGISTRY_USERNAME";
    pub const REGISTRY_PASSWORD: &str = "REGISTRY_PASSWORD";
    pub const RESOURCE_GROUP: &str = "RESOURCE_GROUP";
    pub const CONTAINER_APP_NAME: &str = "CONTAINER_APP_NAME";
    pub const CONTAINER_APP_ENVIRONMENT: &str = "CONTAINER_APP_ENVIRONMENT";
    pub const DB_URI: &str = "DB_URI";
    pub const DB_HOST: &str = "DB_HOST";
    pub const DB_PORT: &str = "DB_PORT";
    pub const DB_USER: &str = "DB_USER";
    pub const DB_PASSWORD: &str = "DB_PASSWORD";
    pub const DB_NAME: &str = "DB_NAME";
    pub const DB_SSL_MODE: &str = "DB_SSL_MODE";
}

/// Secret names whose values never appear in plans or previews.
pub const SENSITIVE_NAMES: &[&str] = &[
    names::AZURE_CREDENTIALS,
    names::REGISTRY_PASSWORD,
    names::DB_URI,
    names::DB_PASSWORD,
];
