//! Tests for `secretsync upload`.

use crate::support::*;

#[test]
fn test_upload_document() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t.upload();
    assert_success(&output);
    assert_stdout_contains(&output, "3/3 secrets uploaded");
    assert_output_excludes(&output, "hunter2");

    assert_eq!(t.uploaded("RESOURCE_GROUP").as_deref(), Some("rg-app"));
    let creds = t.uploaded("AZURE_CREDENTIALS").unwrap();
    assert!(creds.starts_with("{\n"));
    assert!(creds.contains("\"tenantId\": \"tenant-456\""));

    let calls = t.calls();
    assert!(calls.contains(&"gh repo view acme/api".to_string()));
    assert_eq!(
        calls.last().map(String::as_str),
        Some("gh secret list --repo acme/api")
    );
}

#[test]
fn test_upload_order_follows_document() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);
    assert_success(&t.upload());

    let sets: Vec<String> = t
        .calls()
        .into_iter()
        .filter(|c| c.starts_with("gh secret set"))
        .collect();
    assert_eq!(
        sets,
        vec![
            "gh secret set AZURE_CREDENTIALS --repo acme/api",
            "gh secret set RESOURCE_GROUP --repo acme/api",
            "gh secret set DB_URI --repo acme/api",
        ]
    );
}

#[test]
fn test_upload_missing_tenant_uploads_nothing() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", MISSING_TENANT_DOC);

    let output = t.upload();
    assert_failure(&output);
    assert_stderr_contains(&output, "missing required field tenantId");
    assert!(!t.calls().iter().any(|c| c.starts_with("gh secret set")));
}

#[test]
fn test_upload_unterminated_value_is_fatal() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", UNTERMINATED_DOC);

    let output = t.upload();
    assert_failure(&output);
    assert_stderr_contains(&output, "AZURE_CREDENTIALS never closes its braces");
    assert!(!t.calls().iter().any(|c| c.starts_with("gh secret set")));
}

#[test]
fn test_upload_continues_past_failed_secret() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);
    t.flag("gh-reject-RESOURCE_GROUP");

    let output = t.upload();
    assert_failure(&output);
    assert_stderr_contains(&output, "1 of 3 secrets failed to upload");
    assert_stdout_contains(&output, "2/3 secrets uploaded");
    assert!(t.uploaded("DB_URI").is_some());
    assert!(!t.calls().iter().any(|c| c.starts_with("gh secret list")));
}

#[test]
fn test_upload_dry_run_touches_nothing() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t.run_for_repo(&["upload", "--dry-run"]);
    assert_success(&output);
    assert_stdout_contains(&output, "[dry run] would upload 3 secrets to acme/api");
    assert_stdout_contains(&output, "RESOURCE_GROUP=rg-app");
    assert_output_excludes(&output, "hunter2");
    assert_no_calls(&t);
    assert_eq!(t.read("github-secrets.txt"), VALID_DOC);
}

#[test]
fn test_upload_custom_file() {
    let t = Test::with_tools();
    t.write("prod.txt", VALID_DOC);

    let output = t.run_for_repo(&["upload", "--file", "prod.txt"]);
    assert_success(&output);
}

#[test]
fn test_upload_missing_file_suggests_setup() {
    let t = Test::with_tools();

    let output = t.upload();
    assert_failure(&output);
    assert_stderr_contains(&output, "secrets file not found: github-secrets.txt");
    assert_stderr_contains(&output, "secretsync setup");
}

#[test]
fn test_upload_without_gh() {
    let t = Test::new();
    t.write("github-secrets.txt", VALID_DOC);

    let output = t
        .cmd()
        .env("PATH", t.bin.path())
        .args(["upload", "--user", "acme", "--repo", "api"])
        .output()
        .unwrap();
    assert_failure(&output);
    assert_stderr_contains(&output, "gh not found");
    assert_stderr_contains(&output, "https://cli.github.com/");
}

#[test]
fn test_upload_gh_logged_out() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);
    t.flag("gh-logged-out");

    let output = t.upload();
    assert_failure(&output);
    assert_stderr_contains(&output, "gh is not authenticated");
    assert_stderr_contains(&output, "gh auth login");
}

#[test]
fn test_upload_repository_not_visible() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);
    t.flag("gh-no-repo");

    let output = t.upload();
    assert_failure(&output);
    assert_stderr_contains(&output, "cannot access repository acme/api");
}

#[test]
fn test_upload_repo_from_env_and_config() {
    let t = Test::with_tools();
    t.write("github-secrets.txt", VALID_DOC);
    t.write(".secretsync.toml", "[github]\nuser = \"acme\"\n");

    let output = t
        .cmd()
        .env("SECRETSYNC_REPO", "api")
        .arg("upload")
        .output()
        .unwrap();
    assert_success(&output);
    assert!(t.calls().contains(&"gh repo view acme/api".to_string()));
}
