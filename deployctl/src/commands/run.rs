use crate::cli::{RetryArgs, RunArgs};
use crate::common;
use anyhow::Context;
use deployctl_supervisor::{ExitReport, LocalDev};
use std::path::PathBuf;

pub async fn execute(config: Option<PathBuf>, args: RunArgs) -> anyhow::Result<()> {
    let settings = common::load_settings(config.as_deref(), &RetryArgs::default()).await?;
    let cwd = match args.cwd {
        Some(cwd) => cwd,
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let local = LocalDev::new(settings.local_dev, cwd);
    match local.run().await? {
        ExitReport::Exited { role, status } if !status.success() => {
            anyhow::bail!("{} exited with {}", role, status)
        }
        ExitReport::Exited { role, status } => {
            println!("{} exited with {}", role, status);
        }
        ExitReport::Interrupted => {}
    }
    Ok(())
}
