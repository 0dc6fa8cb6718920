//! Heroku bearer token resolution.

use async_trait::async_trait;
use deployctl_core::ProcessBuilder;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error};

use crate::{Error, Result};

pub const TOKEN_ENV: &str = "HEROKU_AUTH_TOKEN";
const HEROKU_CLI: &str = "heroku";
const AUTH_HINT: &str =
    "Please make sure the Heroku CLI is authenticated by running `heroku auth:token`";

/// Runs an external command and returns its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<String> {
        let output = ProcessBuilder::new(program).args(args).output().await?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: format!("{} {}", program, args.join(" ")),
                status: deployctl_core::ExitStatus::from_std(output.status).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Resolves the token once and hands out the cached value afterwards.
///
/// An explicit token (normally `HEROKU_AUTH_TOKEN`) always wins and never
/// touches the CLI. A token fetched through the CLI is kept for the life of
/// the provider, even if it goes stale.
pub struct TokenProvider {
    explicit: Option<String>,
    runner: Arc<dyn CommandRunner>,
    cached: OnceCell<String>,
}

impl TokenProvider {
    pub fn new(explicit: Option<String>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            explicit: explicit.filter(|t| !t.is_empty()),
            runner,
            cached: OnceCell::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(TOKEN_ENV).ok(), Arc::new(SystemRunner))
    }

    pub async fn token(&self) -> Result<String> {
        if let Some(token) = &self.explicit {
            return Ok(token.clone());
        }

        self.cached
            .get_or_try_init(|| self.fetch_from_cli())
            .await
            .cloned()
    }

    async fn fetch_from_cli(&self) -> Result<String> {
        debug!("Resolving Heroku token through the CLI");

        let token = async {
            self.runner.run(HEROKU_CLI, &["auth:whoami"]).await?;
            self.runner.run(HEROKU_CLI, &["auth:token"]).await
        }
        .await;

        match token {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Ok(_) => {
                error!("heroku auth:token printed no token");
                Err(Error::Authentication(AUTH_HINT.to_string()))
            }
            Err(err) => {
                error!("Heroku CLI authentication failed: {}", err);
                Err(Error::Authentication(AUTH_HINT.to_string()))
            }
        }
    }
}
