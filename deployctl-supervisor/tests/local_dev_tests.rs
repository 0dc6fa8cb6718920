#![cfg(unix)]

use deployctl_core::{Error, LocalDevConfig};
use deployctl_supervisor::{ExitReport, LocalDev, Role};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn project(name: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("package.json"),
        format!(r#"{{"name": "{}", "version": "1.0.0"}}"#, name),
    )
    .unwrap();
    dir
}

fn config(app: (&str, &[&str]), router: (&str, &[&str])) -> LocalDevConfig {
    LocalDevConfig {
        app_command: app.0.to_string(),
        app_args: app.1.iter().map(|s| s.to_string()).collect(),
        router_command: router.0.to_string(),
        router_args: router.1.iter().map(|s| s.to_string()).collect(),
        ..LocalDevConfig::default()
    }
}

#[tokio::test]
async fn test_missing_router_fails_fast() {
    let dir = project("next-article");
    let config = LocalDevConfig {
        router_command: "deployctl-router-that-does-not-exist".to_string(),
        ..LocalDevConfig::default()
    };
    let local = LocalDev::new(config, dir.path());

    let err = local.run().await.unwrap_err();

    match err {
        Error::MissingDependency(message) => {
            assert!(message.starts_with("You need to install the next router first!"));
            assert!(message.contains("http://git.svc.ft.com/projects/NEXT/repos/router/browse"));
        }
        other => panic!("expected missing dependency, got {other:?}"),
    }
}

#[tokio::test]
async fn test_app_exit_stops_router() {
    let dir = project("next-article");
    let local = LocalDev::new(
        config(("sh", &["-c", "exit 3"]), ("sleep", &["30"])),
        dir.path(),
    );

    let started = Instant::now();
    let report = local.run().await.unwrap();

    match report {
        ExitReport::Exited { role, status } => {
            assert_eq!(role, Role::App);
            assert_eq!(status.code(), Some(3));
        }
        other => panic!("expected app exit, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_router_receives_env() {
    let dir = project("@financial-times/next-article");
    let script = r#"[ "$DEBUG" = proxy ] && [ "$PORT" = 5050 ] && [ "$article" = 3002 ]"#;
    let local = LocalDev::new(
        config(("sleep", &["30"]), ("sh", &["-c", script])),
        dir.path(),
    );

    let report = local.run().await.unwrap();

    match report {
        ExitReport::Exited { role, status } => {
            assert_eq!(role, Role::Router);
            assert!(status.success(), "router saw wrong env: {status}");
        }
        other => panic!("expected router exit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_app_runs_in_project_dir_with_port() {
    let dir = project("ft-search");
    std::fs::write(dir.path().join("marker"), "").unwrap();
    let local = LocalDev::new(
        config(
            ("sh", &["-c", r#"[ -f marker ] && [ "$PORT" = 3002 ]"#]),
            ("sleep", &["30"]),
        ),
        dir.path(),
    );

    let report = local.run().await.unwrap();

    assert!(matches!(
        report,
        ExitReport::Exited { role: Role::App, status } if status.success()
    ));
}

#[tokio::test]
async fn test_missing_package_json() {
    let dir = TempDir::new().unwrap();
    let local = LocalDev::new(config(("sleep", &["30"]), ("sleep", &["30"])), dir.path());

    assert!(local.run().await.is_err());
}

#[tokio::test]
async fn test_router_command_with_inline_flags() {
    let dir = project("next-article");
    let local = LocalDev::new(
        config(("sh", &["-c", "exit 0"]), ("sleep 30", &[])),
        dir.path(),
    );

    local.ensure_router_installed().await.unwrap();
    let report = local.run().await.unwrap();

    assert!(matches!(
        report,
        ExitReport::Exited { role: Role::App, status } if status.success()
    ));
}
