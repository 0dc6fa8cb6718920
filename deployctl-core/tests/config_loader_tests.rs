use deployctl_core::config::loader::read_package_name;
use deployctl_core::{ConfigLoader, Error, Settings};
use tempfile::TempDir;

#[tokio::test]
async fn test_load_settings_json() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("deployctl.json");

    let config = r#"{
        "heroku_api_url": "http://localhost:5000",
        "retry": {
            "retries": 12,
            "min_timeout_ms": 2000,
            "factor": 1.5
        },
        "local_dev": {
            "app_port": 3100,
            "router_command": "my-router"
        }
    }"#;
    std::fs::write(&config_path, config).unwrap();

    let loaded = ConfigLoader::new().load_file(&config_path).await.unwrap();

    assert_eq!(loaded.heroku_api_url, "http://localhost:5000");
    assert_eq!(loaded.github_api_url, "https://api.github.com");
    assert_eq!(loaded.retry.retries, 12);
    assert_eq!(loaded.retry.min_timeout_ms, 2000);
    assert_eq!(loaded.retry.factor, 1.5);
    assert_eq!(loaded.local_dev.app_port, 3100);
    assert_eq!(loaded.local_dev.router_port, 5050);
    assert_eq!(loaded.local_dev.router_command, "my-router");
}

#[tokio::test]
async fn test_discovers_config_file() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("deployctl.json"),
        r#"{"retry": {"retries": 3}}"#,
    )
    .unwrap();

    let loader = ConfigLoader::with_search_paths([temp_dir.path()]);
    let loaded = loader.load().await.unwrap();

    assert_eq!(loaded.retry.retries, 3);
}

#[tokio::test]
async fn test_discovers_package_json_section() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("package.json"),
        r#"{
            "name": "next-article",
            "deployctl": { "local_dev": { "router_port": 6060 } }
        }"#,
    )
    .unwrap();

    let loader = ConfigLoader::with_search_paths([temp_dir.path()]);
    let loaded = loader.load().await.unwrap();

    assert_eq!(loaded.local_dev.router_port, 6060);
    assert_eq!(loaded.retry.retries, 30);
}

#[tokio::test]
async fn test_package_json_without_section_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "next-article"}"#,
    )
    .unwrap();

    let loader = ConfigLoader::with_search_paths([temp_dir.path()]);
    let loaded = loader.load().await.unwrap();

    assert_eq!(loaded, Settings::default());
}

#[tokio::test]
async fn test_config_file_wins_over_package_json() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("deployctl.json"),
        r#"{"retry": {"retries": 7}}"#,
    )
    .unwrap();
    std::fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "x", "deployctl": {"retry": {"retries": 9}}}"#,
    )
    .unwrap();

    let loaded = ConfigLoader::with_search_paths([temp_dir.path()])
        .load()
        .await
        .unwrap();

    assert_eq!(loaded.retry.retries, 7);
}

#[tokio::test]
async fn test_no_config_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let loaded = ConfigLoader::with_search_paths([temp_dir.path()])
        .load()
        .await
        .unwrap();
    assert_eq!(loaded, Settings::default());
}

#[tokio::test]
async fn test_invalid_json_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("deployctl.json");
    std::fs::write(&config_path, "{ not json").unwrap();

    let result = ConfigLoader::new().load_file(&config_path).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_invalid_values_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("deployctl.json");
    std::fs::write(&config_path, r#"{"heroku_api_url": "ftp://nope"}"#).unwrap();

    let result = ConfigLoader::new().load_file(&config_path).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_explicit_package_json_requires_section() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("package.json");
    std::fs::write(&path, r#"{"name": "next-article"}"#).unwrap();

    let result = ConfigLoader::new().load_file(&path).await;
    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn test_read_package_name() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(
        temp_dir.path().join("package.json"),
        r#"{"name": "@financial-times/next-article", "version": "1.0.0"}"#,
    )
    .unwrap();

    let name = read_package_name(temp_dir.path()).await.unwrap();
    assert_eq!(name, "@financial-times/next-article");
}

#[tokio::test]
async fn test_read_package_name_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = read_package_name(temp_dir.path()).await;
    assert!(matches!(result, Err(Error::Io(_))));
}
