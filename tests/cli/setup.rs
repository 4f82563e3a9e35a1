//! Tests for `secretsync setup`.

use crate::support::*;

#[test]
fn test_setup_writes_template_and_uploads() {
    let t = Test::with_tools();

    let output = t.run_for_repo(&[
        "setup",
        "--resource-group",
        "rg-app",
        "--container-app-name",
        "app",
        "--db-name",
        "main",
    ]);
    assert_success(&output);
    assert_stdout_contains(&output, "https://github.com/acme/api/actions");
    assert_output_excludes(&output, "acr-password");

    let written = t.read("github-secrets.txt");
    assert!(written.starts_with("# GitHub Secrets Configuration Template\n# Generated on "));
    assert!(written.contains("# === AZURE AUTHENTICATION ===\nName: AZURE_CREDENTIALS\nValue: {\n  \"clientId\": \"new-client\",\n"));
    assert!(written.contains("Name: REGISTRY_PASSWORD\nValue: acr-password\n"));
    assert!(written.contains("# === DATABASE ===\nName: DB_NAME\nValue: main\n"));
    assert!(!written.contains("DB_URI"));

    assert_eq!(t.uploaded("REGISTRY_LOGIN_SERVER").as_deref(), Some("fakeacr.azurecr.io"));
    assert_eq!(t.uploaded("CONTAINER_APP_NAME").as_deref(), Some("app"));
}

#[test]
fn test_setup_scopes_to_given_subscription() {
    let t = Test::with_tools();

    let output = t.run_for_repo(&[
        "setup",
        "--resource-group",
        "rg-app",
        "--subscription-id",
        "sub-other",
        "--sp-name",
        "sp-fixed",
    ]);
    assert_success(&output);
    assert!(t.calls().contains(
        &"az ad sp create-for-rbac --name sp-fixed --role contributor --scopes /subscriptions/sub-other --json-auth"
            .to_string()
    ));
}

#[test]
fn test_setup_requires_resource_group() {
    let t = Test::with_tools();

    let output = t.run_for_repo(&["setup"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "missing required setting: resource_group");
    assert_stderr_contains(&output, "--resource-group");
    assert_no_calls(&t);
}

#[test]
fn test_setup_refuses_to_overwrite() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t.run_for_repo(&["setup", "--resource-group", "rg-app"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "already exists");
    assert_eq!(t.read("github-secrets.txt"), VALID_DOC);
    assert_no_calls(&t);
}

#[test]
fn test_setup_force_overwrites() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t.run_for_repo(&["setup", "--resource-group", "rg-app", "--force"]);
    assert_success(&output);
    assert!(!t.read("github-secrets.txt").contains("old-client"));
}

#[test]
fn test_setup_without_registry_creates_nothing() {
    let t = Test::with_tools();
    t.flag("az-no-registry");

    let output = t.run_for_repo(&["setup", "--resource-group", "rg-empty"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "no container registry found: resource group rg-empty");
    assert!(!t.path("github-secrets.txt").exists());
    assert!(!t.calls().iter().any(|c| c.contains("create-for-rbac")));
}

#[test]
fn test_setup_dry_run_touches_nothing() {
    let t = Test::with_tools();

    let output = t.run_for_repo(&["setup", "--resource-group", "rg-app", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "[dry run] would write github-secrets.txt");
    assert_no_calls(&t);
    assert!(!t.path("github-secrets.txt").exists());
}
