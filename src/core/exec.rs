//! Subprocess plumbing shared by the CLI-backed providers.
//!
//! Every call blocks until the child exits. Output is captured; nothing is
//! streamed to the terminal.

use serde::de::DeserializeOwned;
use std::io::Write;
use std::process::{Command, Output, Stdio};
use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::error::{Result, ToolError};

/// An external command-line tool such as `az` or `gh`.
#[derive(Debug, Clone)]
pub struct Tool {
    program: String,
    install_hint: &'static str,
}

impl Tool {
    pub fn new(program: impl Into<String>, install_hint: &'static str) -> Self {
        Self {
            program: program.into(),
            install_hint,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Fail with `ToolError::NotInstalled` unless the program is on `PATH`
    /// and answers `--version`.
    pub fn ensure_installed(&self) -> Result<()> {
        let missing = || ToolError::NotInstalled {
            program: self.program.clone(),
            hint: self.install_hint.to_string(),
        };

        which::which(&self.program).map_err(|_| missing())?;
        let output = self.output(&["--version"], None)?;
        if !output.status.success() {
            return Err(missing().into());
        }
        trace!(program = %self.program, "tool available");
        Ok(())
    }

    /// Run and return the raw output, whatever the exit status.
    pub fn output(&self, args: &[&str], stdin: Option<&str>) -> Result<Output> {
        debug!(command = %self.render(args), "running");

        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            // A child that exits without reading its input still reports
            // its own status below.
            match pipe.write_all(input.as_bytes()) {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    debug!(command = %self.render(args), "stdin closed early");
                }
                other => other?,
            }
        }

        let output = child.wait_with_output()?;
        trace!(
            command = %self.render(args),
            status = ?output.status.code(),
            stdout_len = output.stdout.len(),
            "finished"
        );
        Ok(output)
    }

    /// Run and succeed only on exit status zero.
    pub fn status_ok(&self, args: &[&str]) -> Result<bool> {
        Ok(self.output(args, None)?.status.success())
    }

    /// Run, requiring success, and return stdout.
    pub fn run(&self, args: &[&str]) -> Result<String> {
        self.run_with_input(args, None)
    }

    /// Run with `input` written to stdin, requiring success.
    pub fn run_with_input(&self, args: &[&str], input: Option<&str>) -> Result<String> {
        let output = self.output(args, input)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            return Err(ToolError::Failed {
                command: self.render(args),
                code: output.status.code(),
                stdout,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            }
            .into());
        }
        Ok(stdout)
    }

    /// Run, requiring success, and deserialize stdout as JSON.
    pub fn run_json<T: DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let stdout = Zeroizing::new(self.run(args)?);
        serde_json::from_str(&stdout).map_err(|source| {
            ToolError::InvalidOutput {
                command: self.render(args),
                source,
            }
            .into()
        })
    }

    fn render(&self, args: &[&str]) -> String {
        let mut line = self.program.clone();
        for arg in args {
            line.push(' ');
            if arg.contains(char::is_whitespace) {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}
