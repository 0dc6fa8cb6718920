use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn deployctl() -> Command {
    Command::cargo_bin("deployctl").unwrap()
}

#[test]
fn test_cli_version() {
    deployctl()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("deployctl"));
}

#[test]
fn test_cli_help_lists_commands() {
    deployctl()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("review-app"))
        .stdout(predicate::str::contains("find-review-app"))
        .stdout(predicate::str::contains("wait-build"))
        .stdout(predicate::str::contains("normalize"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_review_app_help_shows_retry_flags() {
    deployctl()
        .args(["review-app", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--pipeline"))
        .stdout(predicate::str::contains("--retries"))
        .stdout(predicate::str::contains("--interval"));
}

#[test]
fn test_review_app_requires_arguments() {
    deployctl()
        .args(["review-app", "--pipeline", "p-1"])
        .env_remove("GITHUB_TOKEN")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--repo"));
}

#[test]
fn test_normalize_strips_prefix() {
    deployctl()
        .args(["normalize", "ft-alpha"])
        .assert()
        .success()
        .stdout("alpha\n");

    deployctl()
        .args(["normalize", "next-beta"])
        .assert()
        .success()
        .stdout("beta\n");
}

#[test]
fn test_normalize_keeps_scoped_name() {
    deployctl()
        .args(["normalize", "@financial-times/gamma"])
        .assert()
        .success()
        .stdout("@financial-times/gamma\n");
}

#[test]
fn test_normalize_strip_version() {
    for (input, expected) in [
        ("ft-alpha-v1", "alpha-v1\n"),
        ("next-beta-v99", "beta-v99\n"),
        ("ft-gamma-v123", "gamma\n"),
        ("next-delta-v123", "delta\n"),
        ("@financial-times/epsilon", "epsilon\n"),
    ] {
        deployctl()
            .args(["normalize", "--strip-version", input])
            .assert()
            .success()
            .stdout(expected);
    }
}

#[test]
fn test_auth_token_from_env() {
    deployctl()
        .arg("auth-token")
        .env("HEROKU_AUTH_TOKEN", "from-env")
        .assert()
        .success()
        .stdout("from-env\n");
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("deployctl.json");
    fs::write(&config, "{ not json").unwrap();

    deployctl()
        .args(["app-name", "--app", "app-1", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load settings"));
}

#[test]
fn test_run_without_router_fails() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "next-article"}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("deployctl.json"),
        r#"{"local_dev": {"router_command": "deployctl-router-that-does-not-exist"}}"#,
    )
    .unwrap();

    deployctl()
        .current_dir(&temp_dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "You need to install the next router first!",
        ));
}

#[cfg(unix)]
#[test]
fn test_run_reports_failing_app() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "next-article"}"#,
    )
    .unwrap();
    fs::write(
        temp_dir.path().join("deployctl.json"),
        r#"{"local_dev": {
            "app_command": "sh", "app_args": ["-c", "exit 4"],
            "router_command": "sleep", "router_args": ["30"]
        }}"#,
    )
    .unwrap();

    deployctl()
        .current_dir(&temp_dir)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("app exited with exit code 4"));
}
