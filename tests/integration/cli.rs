//! CLI behavior: exit codes, output, summary files.

use crate::common::{release_json, zip_bytes};
use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ghrab() -> Command {
    let mut cmd = Command::cargo_bin("ghrab").unwrap();
    // Keep the host environment out of the tests.
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("GITHUB_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_config_file_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    ghrab()
        .current_dir(dir.path())
        .args(["--config", "absent.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn invalid_config_entry_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ghrab.json"),
        r#"[{"repo": "missing-slash", "asset-pattern": "*"}]"#,
    )
    .unwrap();

    ghrab()
        .current_dir(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn assembles_and_writes_a_summary() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("GET"))
        .and(path("/repos/acme/widget/releases/latest"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(release_json(&server.uri(), "v1.0.0", &[(1, "widget.zip")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dl/widget.zip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_bytes(&[("bin/widget", b"exe")])),
        )
        .mount(&server)
        .await;

    std::fs::write(
        dir.path().join("ghrab.json"),
        r#"[{"repo": "acme/widget", "asset-pattern": "*.zip"}]"#,
    )
    .unwrap();

    ghrab()
        .current_dir(dir.path())
        .args(["--api-url", &server.uri(), "--no-progress", "--summary", "report.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ok").and(predicate::str::contains("acme/widget")));

    assert!(dir.path().join("dist/widget/bin/widget").is_file());

    let summary: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(summary["entries"][0]["repo"], "acme/widget");
    assert_eq!(summary["entries"][0]["ok"], true);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn strict_failure_exits_nonzero() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    // No mounts: every lookup 404s.
    std::fs::write(
        dir.path().join("ghrab.json"),
        r#"[{"repo": "acme/ghost", "asset-pattern": "*"}]"#,
    )
    .unwrap();

    ghrab()
        .current_dir(dir.path())
        .args(["--api-url", &server.uri(), "--no-progress"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("acme/ghost"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ignore_errors_keeps_the_exit_code_zero() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ghrab.json"),
        r#"[{"repo": "acme/ghost", "asset-pattern": "*"}]"#,
    )
    .unwrap();

    ghrab()
        .current_dir(dir.path())
        .args(["--api-url", &server.uri(), "--no-progress", "--ignore-errors"])
        .assert()
        .success()
        .stdout(predicate::str::contains("failed").and(predicate::str::contains("not-found")));
}
