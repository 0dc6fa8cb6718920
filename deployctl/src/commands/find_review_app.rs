use crate::cli::{FindReviewAppArgs, RetryArgs};
use crate::common;
use anyhow::Context;
use std::path::PathBuf;

pub async fn execute(config: Option<PathBuf>, args: FindReviewAppArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(config.as_deref(), &RetryArgs::default()).await?;
    let review_apps = common::review_apps(&settings)?;

    let found = review_apps
        .find_created(&args.pipeline, &args.branch)
        .await
        .with_context(|| format!("Failed to list review apps of pipeline {}", args.pipeline))?;

    match found {
        Some(review_app) => println!("{}", review_app.id),
        None => println!("none"),
    }
    Ok(())
}
