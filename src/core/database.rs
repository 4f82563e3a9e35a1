//! PostgreSQL connection URI decomposition.
//!
//! Some deployments cannot consume a single `DB_URI` and need the discrete
//! `DB_*` parts instead.

use url::Url;

use crate::core::constants::{names, DEFAULT_DB_PORT};

/// Discrete parts of a database URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseComponents {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    /// `sslmode` query parameter, empty when absent.
    pub ssl_mode: String,
}

impl DatabaseComponents {
    /// Split a `postgres://` or `postgresql://` URI into its parts.
    ///
    /// Returns `None` for other schemes or unparseable input. User and
    /// password are kept exactly as written in the URI.
    pub fn parse(uri: &str) -> Option<Self> {
        let url = Url::parse(uri).ok()?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return None;
        }

        let ssl_mode = url
            .query_pairs()
            .find(|(k, _)| k == "sslmode")
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        Some(Self {
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port().unwrap_or(DEFAULT_DB_PORT),
            user: url.username().to_string(),
            password: url.password().unwrap_or_default().to_string(),
            database: url.path().trim_start_matches('/').to_string(),
            ssl_mode,
        })
    }

    /// Secrets derived from the parts. `DB_SSL_MODE` only when set.
    pub fn secrets(&self) -> Vec<(&'static str, String)> {
        let mut out = vec![
            (names::DB_HOST, self.host.clone()),
            (names::DB_PORT, self.port.to_string()),
            (names::DB_USER, self.user.clone()),
            (names::DB_PASSWORD, self.password.clone()),
            (names::DB_NAME, self.database.clone()),
        ];
        if !self.ssl_mode.is_empty() {
            out.push((names::DB_SSL_MODE, self.ssl_mode.clone()));
        }
        out
    }
}
