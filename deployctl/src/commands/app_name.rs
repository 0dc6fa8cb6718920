use crate::cli::{AppNameArgs, RetryArgs};
use crate::common;
use std::path::PathBuf;

pub async fn execute(config: Option<PathBuf>, args: AppNameArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(config.as_deref(), &RetryArgs::default()).await?;
    let review_apps = common::review_apps(&settings)?;

    println!("{}", review_apps.app_name(&args.app).await?);
    Ok(())
}
