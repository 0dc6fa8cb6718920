use crate::cli::ReviewAppArgs;
use crate::common;
use anyhow::Context;
use deployctl_platform::CreateParams;
use std::path::PathBuf;
use tracing::info;

pub async fn execute(config: Option<PathBuf>, args: ReviewAppArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(config.as_deref(), &args.retry).await?;
    let review_apps = common::review_apps(&settings)?;

    let params = CreateParams {
        pipeline_id: args.pipeline,
        repo_name: args.repo,
        branch: args.branch,
        commit: args.commit,
        github_token: args.github_token,
    };

    let deployment = review_apps
        .deploy(&params)
        .await
        .with_context(|| format!("Failed to deploy review app for branch '{}'", params.branch))?;

    info!(
        "Review app {} ({}) is serving {}{}",
        deployment.review_app_id,
        deployment.app_id,
        params.commit,
        if deployment.reused { ", reused" } else { "" }
    );
    println!("{}", deployment.app_name);
    Ok(())
}
