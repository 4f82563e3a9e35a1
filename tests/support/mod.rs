//! Test support utilities for secretsync integration tests.
//!
//! Provides an isolated environment with fake `az` and `gh` tools on `PATH`.

#![allow(dead_code)]

pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;

use std::path::PathBuf;
use tempfile::TempDir;

/// Test environment with isolated temp directories.
///
/// Each test gets its own project dir, home dir, and bin dir. Child
/// processes use `.current_dir()` and an explicit `PATH`, so tests can run
/// in parallel.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
    /// Temporary home directory
    pub home: TempDir,
    /// Directory holding the fake tools and their call log
    pub bin: TempDir,
}

impl Test {
    /// Create an environment with no tools installed.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let home = TempDir::new().expect("failed to create temp home");
        let bin = TempDir::new().expect("failed to create temp bin");
        Self { dir, home, bin }
    }

    /// Create an environment with logged-in fake `az` and `gh`.
    #[cfg(unix)]
    pub fn with_tools() -> Self {
        let t = Self::new();
        t.install("az", FAKE_AZ);
        t.install("gh", FAKE_GH);
        t
    }

    /// Write an executable script into the bin dir.
    #[cfg(unix)]
    pub fn install(&self, name: &str, script: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = self.bin.path().join(name);
        std::fs::write(&path, script).expect("failed to write fake tool");
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to chmod fake tool");
    }

    /// Create a marker file the fake tools check (e.g. `az-logged-out`).
    pub fn flag(&self, name: &str) {
        std::fs::write(self.bin.path().join(name), "").expect("failed to write flag");
    }

    /// Path inside the project directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write a file in the project directory.
    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.path(name), contents).expect("failed to write file");
    }

    /// Read a file from the project directory.
    pub fn read(&self, name: &str) -> String {
        std::fs::read_to_string(self.path(name)).expect("failed to read file")
    }

    /// Every fake tool invocation so far, one per line.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.bin.path().join("calls.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Value a fake `gh secret set` received, if any.
    pub fn uploaded(&self, name: &str) -> Option<String> {
        std::fs::read_to_string(self.bin.path().join(format!("secret-{}", name))).ok()
    }
}
