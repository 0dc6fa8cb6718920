use deployctl_core::{
    Error, ExitStatus, LocalDevConfig, ProcessBuilder, ProcessHandle, Result, Signal,
    config::loader::read_package_name, env_key,
};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

/// Time a surviving child gets between SIGTERM and SIGKILL.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// The two children started for local development.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    App,
    Router,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::App => write!(f, "app"),
            Role::Router => write!(f, "router"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReport {
    /// One child exited on its own; the other one was stopped.
    Exited { role: Role, status: ExitStatus },
    /// Ctrl-C was received and both children were stopped.
    Interrupted,
}

/// Runs the app server behind the local router until one of them exits.
pub struct LocalDev {
    config: LocalDevConfig,
    cwd: PathBuf,
}

impl LocalDev {
    pub fn new(config: LocalDevConfig, cwd: impl Into<PathBuf>) -> Self {
        Self {
            config,
            cwd: cwd.into(),
        }
    }

    fn app_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.config.app_command).args(&self.config.app_args)
    }

    fn router_command(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.config.router_command).args(&self.config.router_args)
    }

    pub async fn ensure_router_installed(&self) -> Result<()> {
        let installed = ProcessBuilder::new("which")
            .args([self.router_command().program()])
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false);

        if installed {
            return Ok(());
        }
        Err(Error::MissingDependency(format!(
            "You need to install the next router first!  See docs here: {}",
            self.config.router_docs_url
        )))
    }

    pub fn app_env(&self) -> Vec<(String, String)> {
        vec![("PORT".to_string(), self.config.app_port.to_string())]
    }

    pub fn router_env(&self, package_name: &str) -> Vec<(String, String)> {
        vec![
            ("DEBUG".to_string(), self.config.router_debug.clone()),
            ("PORT".to_string(), self.config.router_port.to_string()),
            (env_key(package_name), self.config.app_port.to_string()),
        ]
    }

    pub async fn run(&self) -> Result<ExitReport> {
        self.ensure_router_installed().await?;
        let package_name = read_package_name(&self.cwd).await?;
        info!(
            "Starting {} on port {} behind {} on port {}",
            package_name, self.config.app_port, self.config.router_command, self.config.router_port
        );

        let mut app = self
            .spawn(
                Role::App,
                self.app_command().envs(self.app_env()),
            )
            .await?;
        let router = match self
            .spawn(
                Role::Router,
                self.router_command().envs(self.router_env(&package_name)),
            )
            .await
        {
            Ok(router) => router,
            Err(e) => {
                self.stop(Role::App, &mut app).await?;
                return Err(e);
            }
        };

        self.supervise(app, router).await
    }

    async fn spawn(&self, role: Role, builder: ProcessBuilder) -> Result<ProcessHandle> {
        let child = builder.current_dir(&self.cwd).spawn().await?;
        let mut handle = ProcessHandle::new(role.to_string(), child);

        if let Some(stdout) = handle.take_stdout() {
            forward(role, stdout, tokio::io::stdout());
        }
        if let Some(stderr) = handle.take_stderr() {
            forward(role, stderr, tokio::io::stderr());
        }

        debug!("Started {} with pid {}", role, handle.pid);
        Ok(handle)
    }

    async fn supervise(
        &self,
        mut app: ProcessHandle,
        mut router: ProcessHandle,
    ) -> Result<ExitReport> {
        let report = tokio::select! {
            status = app.wait() => ExitReport::Exited { role: Role::App, status: status? },
            status = router.wait() => ExitReport::Exited { role: Role::Router, status: status? },
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|e| Error::Signal(e.to_string()))?;
                ExitReport::Interrupted
            }
        };

        match report {
            ExitReport::Exited { role, status } => {
                warn!("{} exited with {}", role, status);
                match role {
                    Role::App => self.stop(Role::Router, &mut router).await?,
                    Role::Router => self.stop(Role::App, &mut app).await?,
                };
            }
            ExitReport::Interrupted => {
                info!("Interrupted, stopping local development");
                self.stop(Role::App, &mut app).await?;
                self.stop(Role::Router, &mut router).await?;
            }
        }

        Ok(report)
    }

    async fn stop(&self, role: Role, handle: &mut ProcessHandle) -> Result<ExitStatus> {
        debug!("Stopping {} (pid {})", role, handle.pid);

        // Already gone if the signal cannot be delivered.
        if let Err(e) = handle.signal(Signal::Terminate).await {
            debug!("Could not signal {}: {}", role, e);
        }

        let status = match tokio::time::timeout(STOP_TIMEOUT, handle.wait()).await {
            Ok(status) => status?,
            Err(_) => {
                warn!("{} ignored SIGTERM for {:?}, killing", role, STOP_TIMEOUT);
                handle.kill().await?;
                handle.wait().await?
            }
        };

        debug!("{} stopped with {}", role, status);
        Ok(status)
    }
}

fn forward<R, W>(role: Role, mut from: R, mut to: W)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: tokio::io::AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = tokio::io::copy(&mut from, &mut to).await {
            debug!("Output of {} closed: {}", role, e);
        }
    });
}
