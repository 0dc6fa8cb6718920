mod cli;
mod commands;
mod common;

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = cli::Cli::parse();
    let config = cli.config;

    match cli.command {
        cli::Command::ReviewApp(args) => commands::review_app::execute(config, args).await,
        cli::Command::FindReviewApp(args) => {
            commands::find_review_app::execute(config, args).await
        }
        cli::Command::WaitBuild(args) => commands::wait_build::execute(config, args).await,
        cli::Command::AppName(args) => commands::app_name::execute(config, args).await,
        cli::Command::Normalize(args) => commands::normalize::execute(args),
        cli::Command::AuthToken => commands::auth_token::execute().await,
        cli::Command::Run(args) => commands::run::execute(config, args).await,
    }
}
