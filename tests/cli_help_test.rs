use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_every_resource() {
    let mut cmd = Command::cargo_bin("flowctl").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("definitions"))
        .stdout(predicate::str::contains("deployments"))
        .stdout(predicate::str::contains("instances"))
        .stdout(predicate::str::contains("tasks"))
        .stdout(predicate::str::contains("decisions"))
        .stdout(predicate::str::contains("forms"))
        .stdout(predicate::str::contains("users"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn test_instance_help_shows_lifecycle_actions() {
    let mut cmd = Command::cargo_bin("flowctl").unwrap();

    cmd.args(["instances", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("suspend"))
        .stdout(predicate::str::contains("activate"))
        .stdout(predicate::str::contains("terminate"));
}

#[test]
fn test_unreachable_engine_fails_with_hint() {
    // Nothing listens on a port released right after binding
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let workdir = tempfile::TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("flowctl").unwrap();

    cmd.current_dir(workdir.path())
        .env("FLOWCTL_RETRY__MAX_ATTEMPTS", "1")
        .args(["--base-url", &format!("http://127.0.0.1:{port}/api/v1"), "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("check engine.base_url"));
}
