//! Service-principal credentials and their validation.
//!
//! The `AZURE_CREDENTIALS` secret holds the JSON printed by
//! `az ad sp create-for-rbac --json-auth`. Before anything is uploaded the
//! blob is checked for the four fields GitHub's `azure/login` action needs.

use serde_json::{Map, Value};
use std::fmt;

use crate::core::constants::names;
use crate::core::document::SecretsDocument;
use crate::error::{Result, ValidationError};

/// Fields every service-principal credential must carry.
pub const REQUIRED_FIELDS: &[&str] = &["clientId", "clientSecret", "subscriptionId", "tenantId"];

/// Value prefixes left behind by secrets templates.
pub const PLACEHOLDER_PREFIXES: &[&str] = &["your-"];

/// Shape a single JSON-valued record must have.
#[derive(Debug, Clone)]
pub struct CredentialSchema {
    /// Record the schema applies to.
    pub record: &'static str,
    pub required: &'static [&'static str],
    pub placeholders: &'static [&'static str],
}

impl CredentialSchema {
    /// Schema for `AZURE_CREDENTIALS`.
    pub const fn azure() -> Self {
        Self {
            record: names::AZURE_CREDENTIALS,
            required: REQUIRED_FIELDS,
            placeholders: PLACEHOLDER_PREFIXES,
        }
    }
}

/// One reason a credential failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    MissingRecord,
    InvalidJson(String),
    NotAnObject,
    MissingField(String),
    EmptyField(String),
    NotAString(String),
    Placeholder(String),
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::MissingRecord => write!(f, "record not found"),
            Issue::InvalidJson(e) => write!(f, "not valid JSON ({})", e),
            Issue::NotAnObject => write!(f, "not a JSON object"),
            Issue::MissingField(k) => write!(f, "missing required field {}", k),
            Issue::EmptyField(k) => write!(f, "{} is empty", k),
            Issue::NotAString(k) => write!(f, "{} is not a string", k),
            Issue::Placeholder(k) => write!(f, "{} still holds a placeholder value", k),
        }
    }
}

/// Outcome of validating a document against a schema.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub record: &'static str,
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Convert a failed report into an error for callers that abort on it.
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            return Ok(());
        }
        let issues = self
            .issues
            .iter()
            .map(Issue::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(ValidationError::Credentials {
            record: self.record.to_string(),
            issues,
        }
        .into())
    }
}

/// Validate the schema's record in a parsed document.
///
/// Never fails: problems are collected into the report.
pub fn validate(doc: &SecretsDocument, schema: &CredentialSchema) -> ValidationReport {
    let issues = match doc.get(schema.record) {
        Some(value) => validate_value(value, schema),
        None => vec![Issue::MissingRecord],
    };
    ValidationReport {
        record: schema.record,
        issues,
    }
}

/// Validate a raw credential JSON string.
pub fn validate_value(value: &str, schema: &CredentialSchema) -> Vec<Issue> {
    let json: Value = match serde_json::from_str(value) {
        Ok(json) => json,
        Err(e) => return vec![Issue::InvalidJson(e.to_string())],
    };
    let Some(obj) = json.as_object() else {
        return vec![Issue::NotAnObject];
    };

    let mut issues = Vec::new();
    for field in schema.required {
        match obj.get(*field) {
            None => issues.push(Issue::MissingField(field.to_string())),
            Some(Value::String(s)) if s.trim().is_empty() => {
                issues.push(Issue::EmptyField(field.to_string()))
            }
            Some(Value::String(s)) if schema.placeholders.iter().any(|p| s.starts_with(p)) => {
                issues.push(Issue::Placeholder(field.to_string()))
            }
            Some(Value::String(_)) => {}
            Some(Value::Null) => issues.push(Issue::EmptyField(field.to_string())),
            Some(_) => issues.push(Issue::NotAString(field.to_string())),
        }
    }
    issues
}

/// Service-principal credential blob.
///
/// Keeps the JSON object exactly as the identity provider returned it, in
/// field order, so it can be uploaded without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials(Map<String, Value>);

impl Credentials {
    /// Parse credentials from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns a JSON error for malformed input and
    /// `ValidationError::NotAnObject` when the JSON is not an object.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ValidationError::NotAnObject(names::AZURE_CREDENTIALS.to_string()).into()),
        }
    }

    fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn client_id(&self) -> Option<&str> {
        self.field("clientId")
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.field("tenantId")
    }

    pub fn subscription_id(&self) -> Option<&str> {
        self.field("subscriptionId")
    }

    /// Check the blob against a schema.
    pub fn validate(&self, schema: &CredentialSchema) -> ValidationReport {
        ValidationReport {
            record: schema.record,
            issues: validate_value(&self.to_compact(), schema),
        }
    }

    /// Single-line JSON, as uploaded by `sync`.
    pub fn to_compact(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }

    /// Two-space indented JSON, as written into documents.
    pub fn to_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}
