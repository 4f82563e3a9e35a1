//! Tests for error handling and CLI flags.

use crate::support::*;

#[test]
fn test_help_lists_commands() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    for command in ["upload", "sync", "rotate", "setup", "show", "validate"] {
        assert_stdout_contains(&output, command);
    }
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, "secretsync");
}

#[test]
fn test_verbose_flag_accepted() {
    let t = Test::new();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t.cmd().args(["--verbose", "show"]).output().unwrap();
    assert_success(&output);
}

#[test]
fn test_completions() {
    let t = Test::new();

    for shell in ["bash", "zsh", "fish", "power-shell"] {
        let output = t.cmd().args(["completions", shell]).output().unwrap();
        assert_success(&output);
        assert_stdout_contains(&output, "secretsync");
    }
}

#[test]
fn test_missing_repository_has_hint() {
    let t = Test::new();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t.cmd().args(["upload", "--user", "acme"]).output().unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "missing required setting: repo");
    assert_stderr_contains(&output, "--repo");
}

#[test]
fn test_conflicting_owner() {
    let t = Test::new();

    let output = t
        .cmd()
        .args(["upload", "--user", "other", "--repo", "acme/api", "--dry-run"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "does not match");
}

#[test]
fn test_invalid_config_is_reported() {
    let t = Test::new();
    t.write(".secretsync.toml", "[github]\nowner = \"typo\"\n");

    let output = t.show();
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse config");
}
