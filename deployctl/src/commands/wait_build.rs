use crate::cli::WaitBuildArgs;
use crate::common;
use anyhow::Context;
use std::path::PathBuf;

pub async fn execute(config: Option<PathBuf>, args: WaitBuildArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(config.as_deref(), &args.retry).await?;
    let review_apps = common::review_apps(&settings)?;

    let app_id = review_apps
        .wait_for_build(&args.app, &args.commit)
        .await
        .with_context(|| format!("No successful build of {} on {}", args.commit, args.app))?;

    println!("{}", app_id);
    Ok(())
}
