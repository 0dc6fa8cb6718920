use anyhow::{Context, Result};
use deployctl_core::{ConfigLoader, Settings};
use deployctl_platform::{GithubArchive, HerokuClient, ReviewApps, TokenProvider};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cli::RetryArgs;

/// Load settings from `--config` or by discovery, then apply retry flags.
pub async fn load_settings(config: Option<&Path>, retry: &RetryArgs) -> Result<Settings> {
    let loader = ConfigLoader::new();
    let mut settings = match config {
        Some(path) => loader
            .load_file(path)
            .await
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => loader.load().await.context("Failed to load settings")?,
    };

    if let Some(retries) = retry.retries {
        settings.retry = settings.retry.with_retries(retries);
    }
    if let Some(interval) = retry.interval {
        settings.retry = settings
            .retry
            .with_min_timeout(Duration::from_secs(interval));
    }
    settings.validate()?;

    debug!("Using retry policy {:?}", settings.retry);
    Ok(settings)
}

pub fn heroku_client(settings: &Settings) -> Result<Arc<HerokuClient>> {
    let tokens = Arc::new(TokenProvider::from_env());
    let client = HerokuClient::new(&settings.heroku_api_url, tokens)
        .context("Failed to build Heroku client")?;
    Ok(Arc::new(client))
}

pub fn review_apps(settings: &Settings) -> Result<ReviewApps> {
    let api = heroku_client(settings)?;
    let archive = Arc::new(
        GithubArchive::new(&settings.github_api_url).context("Failed to build GitHub client")?,
    );
    Ok(ReviewApps::new(api, archive).with_policy(settings.retry.clone()))
}
