//! Secrets document model.
//!
//! A document is the flat text file operators keep next to their deployment
//! scripts (`github-secrets.txt` by default):
//!
//! ```text
//! # === CONTAINER REGISTRY ===
//! Name: REGISTRY_LOGIN_SERVER
//! Value: myregistry.azurecr.io
//!
//! Name: AZURE_CREDENTIALS
//! Value: {
//!   "clientId": "..."
//! }
//! ```
//!
//! Parsing reduces the file to an ordered mapping of name to value while
//! keeping every original line, so that updating one section and writing the
//! document back leaves the rest of the file as the operator wrote it.

mod parser;

use indexmap::IndexMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::core::constants::{NAME_PREFIX, VALUE_PREFIX};
use crate::core::types::{SecretName, SecretValue};
use crate::error::{DocumentError, Result};

pub use parser::Diagnostic;

/// A single named secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretRecord {
    pub name: SecretName,
    pub value: SecretValue,
}

#[derive(Debug, Clone)]
enum Block {
    /// A line kept verbatim: comment, blank, or anything that did not form a record.
    Text(String),
    /// A record and the lines it is written as.
    Record {
        record: SecretRecord,
        lines: Vec<String>,
        rewritten: bool,
    },
}

/// Parsed secrets document.
#[derive(Debug, Clone)]
pub struct SecretsDocument {
    blocks: Vec<Block>,
    secrets: IndexMap<SecretName, SecretValue>,
    diagnostics: Vec<Diagnostic>,
    trailing_newline: bool,
}

impl Default for SecretsDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretsDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            secrets: IndexMap::new(),
            diagnostics: Vec::new(),
            trailing_newline: true,
        }
    }

    /// Parse document text leniently.
    ///
    /// Records still open at end of input are left out of the mapping. A
    /// multi-line value cut short by the next `Name:` line is kept as far as
    /// it got. Both are reported through [`diagnostics`](Self::diagnostics). A
    /// later duplicate name overwrites the earlier value but keeps the
    /// position of the first occurrence.
    pub fn parse(text: &str) -> Self {
        let parsed = parser::parse(text);
        let lines: Vec<&str> = text.lines().collect();

        let mut blocks = Vec::with_capacity(lines.len());
        let mut secrets = IndexMap::new();
        let mut spans = parsed.spans.into_iter().peekable();
        let mut idx = 0;

        while idx < lines.len() {
            match spans.next_if(|span| span.start == idx) {
                Some(span) => {
                    let raw = lines[span.start..=span.end]
                        .iter()
                        .map(|l| l.to_string())
                        .collect();
                    secrets.insert(span.name.clone(), span.value.clone());
                    blocks.push(Block::Record {
                        record: SecretRecord {
                            name: span.name,
                            value: span.value,
                        },
                        lines: raw,
                        rewritten: false,
                    });
                    idx = span.end + 1;
                }
                None => {
                    blocks.push(Block::Text(lines[idx].to_string()));
                    idx += 1;
                }
            }
        }

        for diagnostic in &parsed.diagnostics {
            warn!(?diagnostic, "secrets document entry skipped");
        }
        debug!(
            records = secrets.len(),
            skipped = parsed.diagnostics.len(),
            "secrets document parsed"
        );

        Self {
            blocks,
            secrets,
            diagnostics: parsed.diagnostics,
            trailing_newline: text.is_empty() || text.ends_with('\n'),
        }
    }

    /// Parse document text, failing on the first skipped entry.
    ///
    /// # Errors
    ///
    /// Returns the [`DocumentError`] matching the first diagnostic: an
    /// unterminated JSON value, a name without a value, an empty name, or a
    /// value without a name.
    pub fn parse_strict(text: &str) -> Result<Self> {
        let doc = Self::parse(text);
        match doc.diagnostics.first() {
            Some(d) => Err(DocumentError::from(d.clone()).into()),
            None => Ok(doc),
        }
    }

    /// Read and parse a document from disk.
    ///
    /// # Errors
    ///
    /// Returns `DocumentError::NotFound` if the file does not exist, an IO
    /// error if it cannot be read, and a parse error in strict mode.
    pub fn load(path: &Path, strict: bool) -> Result<Self> {
        debug!(path = %path.display(), strict, "loading secrets document");
        if !path.exists() {
            return Err(DocumentError::NotFound(path.display().to_string()).into());
        }
        let text = std::fs::read_to_string(path)?;
        if strict {
            Self::parse_strict(&text)
        } else {
            Ok(Self::parse(&text))
        }
    }

    /// Write the document to disk.
    pub fn save(&self, path: &Path) -> Result<()> {
        debug!(path = %path.display(), records = self.len(), "saving secrets document");
        std::fs::write(path, self.to_string())?;
        Ok(())
    }

    /// Ordered name → value mapping.
    pub fn secrets(&self) -> &IndexMap<SecretName, SecretValue> {
        &self.secrets
    }

    /// Records in mapping order.
    pub fn records(&self) -> impl Iterator<Item = SecretRecord> + '_ {
        self.secrets.iter().map(|(name, value)| SecretRecord {
            name: name.clone(),
            value: value.clone(),
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.secrets.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Entries the parser skipped.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Names of records dropped because their value never completed.
    pub fn dropped(&self) -> Vec<&str> {
        self.diagnostics
            .iter()
            .filter_map(Diagnostic::dropped_name)
            .collect()
    }

    /// Set a secret, rewriting its section in place.
    ///
    /// Every section declaring `name` is replaced by a freshly formatted
    /// one; JSON objects are re-indented. Unknown names are appended as a
    /// new section at the end.
    ///
    /// # Errors
    ///
    /// Fails if the name is not a valid declaration, or if the value could
    /// not be read back unchanged (multi-line text that is not a JSON
    /// object, or a JSON value whose braces inside strings would end the
    /// section early).
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let (record, lines) = format_record(name, value)?;
        let mut found = false;

        for block in &mut self.blocks {
            if let Block::Record {
                record: existing,
                lines: written,
                rewritten,
            } = block
            {
                if existing.name == record.name {
                    *existing = record.clone();
                    *written = lines.clone();
                    *rewritten = true;
                    found = true;
                }
            }
        }

        if found {
            debug!(name = %record.name, "section rewritten");
            self.secrets.insert(record.name, record.value);
        } else {
            if !self.blocks.is_empty() && !self.ends_with_blank() {
                self.push_blank();
            }
            self.push_formatted(record, lines);
        }
        Ok(())
    }

    /// Append a comment line. The `#` marker is added when missing.
    pub fn push_comment(&mut self, text: &str) {
        let line = if text.starts_with(crate::core::constants::COMMENT_MARKER) {
            text.to_string()
        } else {
            format!("# {}", text)
        };
        self.blocks.push(Block::Text(line));
    }

    /// Append a blank line.
    pub fn push_blank(&mut self) {
        self.blocks.push(Block::Text(String::new()));
    }

    /// Append a record without inserting any separator.
    pub fn push_record(&mut self, name: &str, value: &str) -> Result<()> {
        let (record, lines) = format_record(name, value)?;
        self.push_formatted(record, lines);
        Ok(())
    }

    /// Build a fresh document grouped into titled sections.
    ///
    /// ```text
    /// # header line
    ///
    /// # === TITLE ===
    /// Name: A
    /// Value: a
    /// ```
    pub fn from_sections(header: &[String], sections: &[Section]) -> Result<Self> {
        let mut doc = Self::new();
        for line in header {
            doc.push_comment(line);
        }
        for section in sections.iter().filter(|s| !s.records.is_empty()) {
            if !doc.blocks.is_empty() {
                doc.push_blank();
            }
            doc.push_comment(&format!("=== {} ===", section.title));
            for (i, record) in section.records.iter().enumerate() {
                if i > 0 {
                    doc.push_blank();
                }
                doc.push_record(&record.name, &record.value)?;
            }
        }
        Ok(doc)
    }

    fn push_formatted(&mut self, record: SecretRecord, lines: Vec<String>) {
        self.secrets
            .insert(record.name.clone(), record.value.clone());
        self.blocks.push(Block::Record {
            record,
            lines,
            rewritten: false,
        });
    }

    fn ends_with_blank(&self) -> bool {
        matches!(self.blocks.last(), Some(Block::Text(t)) if t.trim().is_empty())
    }
}

/// A titled group of records for [`SecretsDocument::from_sections`].
#[derive(Debug, Clone)]
pub struct Section {
    pub title: String,
    pub records: Vec<SecretRecord>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            records: Vec::new(),
        }
    }

    /// Add a record; `None` values are skipped.
    pub fn with(mut self, name: &str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.records.push(SecretRecord {
                name: name.to_string(),
                value: value.to_string(),
            });
        }
        self
    }
}

impl fmt::Display for SecretsDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = Vec::with_capacity(self.blocks.len());

        for (i, block) in self.blocks.iter().enumerate() {
            match block {
                Block::Text(line) => lines.push(line.clone()),
                Block::Record {
                    lines: written,
                    rewritten,
                    ..
                } => {
                    lines.extend(written.iter().cloned());
                    // A rewritten section is always followed by a blank separator.
                    let next_is_blank = matches!(
                        self.blocks.get(i + 1),
                        Some(Block::Text(t)) if t.trim().is_empty()
                    );
                    if *rewritten && i + 1 < self.blocks.len() && !next_is_blank {
                        lines.push(String::new());
                    }
                }
            }
        }

        write!(f, "{}", lines.join("\n"))?;
        if self.trailing_newline && !lines.is_empty() {
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Format a record as document lines and return the value as it will read back.
fn format_record(name: &str, value: &str) -> Result<(SecretRecord, Vec<String>)> {
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(DocumentError::InvalidName(name.to_string()).into());
    }

    let value = value.trim();
    let value_lines: Vec<String> = if value.starts_with('{') {
        let json: serde_json::Value = serde_json::from_str(value)
            .map_err(|_| DocumentError::AmbiguousValue(name.to_string()))?;
        if !json.is_object() {
            return Err(DocumentError::AmbiguousValue(name.to_string()).into());
        }
        let pretty = serde_json::to_string_pretty(&json)?;
        let lines: Vec<String> = pretty.lines().map(str::to_string).collect();
        if !closes_on_last_line(&lines) {
            return Err(DocumentError::AmbiguousValue(name.to_string()).into());
        }
        lines
    } else if value.contains('\n') {
        return Err(DocumentError::MultilineScalar(name.to_string()).into());
    } else {
        vec![value.to_string()]
    };

    let mut lines = Vec::with_capacity(value_lines.len() + 1);
    lines.push(format!("{} {}", NAME_PREFIX, name));
    let mut iter = value_lines.iter();
    if let Some(first) = iter.next() {
        if first.is_empty() {
            lines.push(VALUE_PREFIX.to_string());
        } else {
            lines.push(format!("{} {}", VALUE_PREFIX, first));
        }
    }
    lines.extend(iter.cloned());

    let stored = value_lines
        .iter()
        .map(|l| l.trim())
        .collect::<Vec<_>>()
        .join("\n");

    Ok((
        SecretRecord {
            name: name.to_string(),
            value: stored,
        },
        lines,
    ))
}

/// True when the running brace balance first drops to zero on the last line.
fn closes_on_last_line(lines: &[String]) -> bool {
    let mut balance = 0;
    for (i, line) in lines.iter().enumerate() {
        balance += parser::brace_delta(line.trim());
        let last = i + 1 == lines.len();
        if last {
            return balance <= 0;
        }
        if balance <= 0 {
            return false;
        }
    }
    false
}
