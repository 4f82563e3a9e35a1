//! Line-oriented parser for the `Name:` / `Value:` secrets format.
//!
//! The parser is a three-state machine. Braces are counted per line to
//! decide when a multi-line JSON value is complete; there is no escaping.

use tracing::trace;

use crate::core::constants::{COMMENT_MARKER, NAME_PREFIX, VALUE_PREFIX};
use crate::error::DocumentError;

/// A committed record and the raw line span (0-based, inclusive) it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub name: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// Something the lenient parser skipped over.
///
/// Line numbers are 1-based and point at the line that opened the problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A multi-line value whose braces never balanced before end of input.
    Unterminated { name: String, line: usize },
    /// A multi-line value cut short by the next `Name:` line. The partial
    /// value is still committed.
    Interrupted { name: String, line: usize },
    /// A `Name:` that was never followed by a `Value:`.
    MissingValue { name: String, line: usize },
    /// A `Name:` line with nothing after the prefix.
    EmptyName { line: usize },
    /// A `Value:` line with no pending `Name:`.
    OrphanValue { line: usize },
}

impl Diagnostic {
    /// Name of the record this diagnostic dropped, if any.
    pub fn dropped_name(&self) -> Option<&str> {
        match self {
            Diagnostic::Unterminated { name, .. } | Diagnostic::MissingValue { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

impl From<Diagnostic> for DocumentError {
    fn from(d: Diagnostic) -> Self {
        match d {
            Diagnostic::Unterminated { name, line } | Diagnostic::Interrupted { name, line } => {
                DocumentError::Unterminated { name, line }
            }
            Diagnostic::MissingValue { name, line } => DocumentError::MissingValue { name, line },
            Diagnostic::EmptyName { line } => DocumentError::EmptyName { line },
            Diagnostic::OrphanValue { line } => DocumentError::OrphanValue { line },
        }
    }
}

/// Output of a parse pass.
#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub spans: Vec<Span>,
    pub diagnostics: Vec<Diagnostic>,
}

enum State {
    Idle,
    AwaitingValue {
        name: String,
        start: usize,
    },
    InMultiline {
        name: String,
        start: usize,
        end: usize,
        value: String,
        balance: i64,
    },
}

/// Net `{` minus `}` count of a line.
pub(crate) fn brace_delta(line: &str) -> i64 {
    line.chars().fold(0, |acc, c| match c {
        '{' => acc + 1,
        '}' => acc - 1,
        _ => acc,
    })
}

pub(crate) fn parse(text: &str) -> Parsed {
    let mut out = Parsed::default();
    let mut state = State::Idle;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();

        if line.is_empty() || line.starts_with(COMMENT_MARKER) {
            continue;
        }

        if let Some(rest) = line.strip_prefix(NAME_PREFIX) {
            flush(std::mem::replace(&mut state, State::Idle), &mut out);

            let name = rest.trim();
            if name.is_empty() {
                out.diagnostics.push(Diagnostic::EmptyName { line: idx + 1 });
            } else {
                state = State::AwaitingValue {
                    name: name.to_string(),
                    start: idx,
                };
            }
            continue;
        }

        state = match state {
            State::InMultiline {
                name,
                start,
                mut value,
                balance,
                ..
            } => {
                value.push('\n');
                value.push_str(line);
                let balance = balance + brace_delta(line);
                if balance <= 0 {
                    commit(&mut out, name, &value, start, idx);
                    State::Idle
                } else {
                    State::InMultiline {
                        name,
                        start,
                        end: idx,
                        value,
                        balance,
                    }
                }
            }
            State::AwaitingValue { name, start } => match line.strip_prefix(VALUE_PREFIX) {
                Some(rest) => {
                    let rest = rest.trim();
                    let balance = brace_delta(rest);
                    if rest.starts_with('{') && balance > 0 {
                        State::InMultiline {
                            name,
                            start,
                            end: idx,
                            value: rest.to_string(),
                            balance,
                        }
                    } else {
                        commit(&mut out, name, rest, start, idx);
                        State::Idle
                    }
                }
                None => {
                    trace!(line = idx + 1, "ignoring line between Name: and Value:");
                    State::AwaitingValue { name, start }
                }
            },
            State::Idle => {
                if line.starts_with(VALUE_PREFIX) {
                    out.diagnostics.push(Diagnostic::OrphanValue { line: idx + 1 });
                } else {
                    trace!(line = idx + 1, "ignoring stray line");
                }
                State::Idle
            }
        };
    }

    abandon(state, &mut out);
    out
}

fn commit(out: &mut Parsed, name: String, value: &str, start: usize, end: usize) {
    trace!(name = %name, start = start + 1, end = end + 1, "record committed");
    out.spans.push(Span {
        name,
        value: value.trim().to_string(),
        start,
        end,
    });
}

/// Close out the pending record when a new `Name:` line arrives.
///
/// An unfinished multi-line value is committed as far as it got, trimmed,
/// and flagged so strict parsing still rejects it.
fn flush(state: State, out: &mut Parsed) {
    match state {
        State::InMultiline {
            name,
            start,
            end,
            value,
            ..
        } => {
            out.diagnostics.push(Diagnostic::Interrupted {
                name: name.clone(),
                line: start + 1,
            });
            commit(out, name, &value, start, end);
        }
        other => abandon(other, out),
    }
}

fn abandon(state: State, out: &mut Parsed) {
    match state {
        State::Idle => {}
        State::AwaitingValue { name, start } => {
            out.diagnostics.push(Diagnostic::MissingValue {
                name,
                line: start + 1,
            });
        }
        State::InMultiline { name, start, .. } => {
            out.diagnostics.push(Diagnostic::Unterminated {
                name,
                line: start + 1,
            });
        }
    }
}
