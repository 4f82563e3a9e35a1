//! In-memory secret store for tests.

use indexmap::IndexMap;
use std::cell::RefCell;

use super::SecretStore;
use crate::core::types::Repository;
use crate::error::{Result, ToolError};

/// Stores secrets in a map; names listed in `reject` fail to upload.
#[derive(Default)]
pub(crate) struct MemoryStore {
    pub reject: Vec<String>,
    pub secrets: RefCell<IndexMap<String, String>>,
    pub calls: RefCell<Vec<String>>,
}

impl MemoryStore {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.secrets.borrow().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.secrets.borrow().keys().cloned().collect()
    }
}

impl SecretStore for MemoryStore {
    fn ensure_ready(&self) -> Result<()> {
        self.calls.borrow_mut().push("ensure_ready".to_string());
        Ok(())
    }

    fn check_repository(&self, repo: &Repository) -> Result<()> {
        self.calls.borrow_mut().push(format!("check_repository {}", repo));
        Ok(())
    }

    fn set_secret(&self, repo: &Repository, name: &str, value: &str) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(format!("set_secret {} {}", repo, name));
        if self.reject.iter().any(|r| r == name) {
            return Err(ToolError::Failed {
                command: format!("gh secret set {} --repo {}", name, repo),
                code: Some(1),
                stdout: String::new(),
                stderr: "rejected".to_string(),
            }
            .into());
        }
        self.secrets
            .borrow_mut()
            .insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn list_secrets(&self, repo: &Repository) -> Result<Vec<String>> {
        self.calls.borrow_mut().push(format!("list_secrets {}", repo));
        Ok(self.names())
    }
}
