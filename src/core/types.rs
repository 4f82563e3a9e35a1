//! Type aliases and small value types for domain concepts.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ValidationError};

/// A secret name (e.g., AZURE_CREDENTIALS, DB_URI).
pub type SecretName = String;

/// A plaintext secret value, passed through opaquely.
pub type SecretValue = String;

/// A GitHub repository addressed as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    owner: String,
    name: String,
}

impl Repository {
    /// Build a repository from its owner (user or org) and name.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Repository` if either part is empty or
    /// contains a slash or whitespace.
    pub fn new(owner: &str, name: &str) -> Result<Self, Error> {
        let owner = owner.trim();
        let name = name.trim();
        for part in [owner, name] {
            if part.is_empty() || part.contains('/') || part.contains(char::is_whitespace) {
                return Err(ValidationError::Repository(format!("{}/{}", owner, name)).into());
            }
        }
        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for Repository {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) => Self::new(owner, name),
            None => Err(ValidationError::Repository(s.to_string()).into()),
        }
    }
}
