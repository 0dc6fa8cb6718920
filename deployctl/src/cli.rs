use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deployctl")]
#[command(about = "Review-app deployment and local development for Heroku-hosted apps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to deployctl.json or the deployctl section of package.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create or reuse a review app for a branch and wait until the commit is built
    ReviewApp(ReviewAppArgs),

    /// Find a created review app for a branch
    FindReviewApp(FindReviewAppArgs),

    /// Wait until an app has a successful build of a commit
    WaitBuild(WaitBuildArgs),

    /// Print the name of an app
    AppName(AppNameArgs),

    /// Normalize an application or package name
    Normalize(NormalizeArgs),

    /// Print the Heroku auth token
    AuthToken,

    /// Run the app server behind the local router
    Run(RunArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RetryArgs {
    /// Retries after the first attempt
    #[arg(long)]
    pub retries: Option<u32>,

    /// Seconds to wait between attempts
    #[arg(long)]
    pub interval: Option<u64>,
}

#[derive(Parser)]
pub struct ReviewAppArgs {
    /// Pipeline that owns the review app
    #[arg(long)]
    pub pipeline: String,

    /// GitHub repository as OWNER/NAME
    #[arg(long)]
    pub repo: String,

    #[arg(long)]
    pub branch: String,

    /// Commit SHA to deploy
    #[arg(long)]
    pub commit: String,

    /// Token used to fetch the source archive
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(Parser)]
pub struct FindReviewAppArgs {
    #[arg(long)]
    pub pipeline: String,

    #[arg(long)]
    pub branch: String,
}

#[derive(Parser)]
pub struct WaitBuildArgs {
    /// App id
    #[arg(long)]
    pub app: String,

    #[arg(long)]
    pub commit: String,

    #[command(flatten)]
    pub retry: RetryArgs,
}

#[derive(Parser)]
pub struct AppNameArgs {
    /// App id
    #[arg(long)]
    pub app: String,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    pub name: String,

    /// Drop the organisation scope and a trailing -vNNN version
    #[arg(long)]
    pub strip_version: bool,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Project directory containing package.json
    #[arg(short = 'd', long)]
    pub cwd: Option<PathBuf>,
}
