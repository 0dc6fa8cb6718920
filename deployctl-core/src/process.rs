use std::fmt;
use std::process::Stdio;
use tokio::process::{Child, ChildStderr, ChildStdout, Command};

#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
    child: Child,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
}

impl ProcessHandle {
    pub fn new(name: impl Into<String>, mut child: Child) -> Self {
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        Self {
            pid: child.id().unwrap_or_default(),
            name: name.into(),
            child,
            stdout,
            stderr,
        }
    }

    pub async fn wait(&mut self) -> crate::Result<ExitStatus> {
        let status = self.child.wait().await?;
        Ok(ExitStatus::from_std(status))
    }

    pub async fn kill(&mut self) -> crate::Result<()> {
        self.child.kill().await?;
        Ok(())
    }

    pub async fn signal(&mut self, signal: Signal) -> crate::Result<()> {
        #[cfg(unix)]
        {
            use nix::sys::signal;
            use nix::unistd::Pid;
            signal::kill(Pid::from_raw(self.pid as i32), signal.to_nix())?;
            Ok(())
        }
        #[cfg(not(unix))]
        {
            match signal {
                Signal::Terminate | Signal::Kill => self.kill().await,
            }
        }
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.stderr.take()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Terminate,
    Kill,
}

impl Signal {
    #[cfg(unix)]
    fn to_nix(self) -> nix::sys::signal::Signal {
        use nix::sys::signal::Signal as NixSignal;
        match self {
            Signal::Terminate => NixSignal::SIGTERM,
            Signal::Kill => NixSignal::SIGKILL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus {
    code: Option<i32>,
    signal: Option<i32>,
}

impl ExitStatus {
    pub fn from_std(status: std::process::ExitStatus) -> Self {
        Self {
            code: status.code(),
            #[cfg(unix)]
            signal: {
                use std::os::unix::process::ExitStatusExt;
                status.signal()
            },
            #[cfg(not(unix))]
            signal: None,
        }
    }

    pub fn new(code: Option<i32>, signal: Option<i32>) -> Self {
        Self { code, signal }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn signal(&self) -> Option<i32> {
        self.signal
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "signal {}", signal),
            (None, None) => write!(f, "unknown status"),
        }
    }
}

pub struct ProcessBuilder {
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    cwd: Option<std::path::PathBuf>,
}

impl ProcessBuilder {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: Vec::new(),
            cwd: None,
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args = args.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }

    pub fn env<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.env
            .push((key.as_ref().to_string(), value.as_ref().to_string()));
        self
    }

    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in vars {
            self.env
                .push((k.as_ref().to_string(), v.as_ref().to_string()));
        }
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<std::path::Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Executable that will be started, after splitting the command string.
    pub fn program(&self) -> String {
        self.resolve().0
    }

    /// Split a command string such as `"nodemon server/app"`; explicit args
    /// follow the words of the command string.
    fn resolve(&self) -> (String, Vec<String>) {
        let (actual_command, mut parsed_args) =
            if self.command.trim().contains(char::is_whitespace) {
                match shell_words::split(&self.command) {
                    Ok(parts) if !parts.is_empty() => {
                        let mut parts = parts.into_iter();
                        let cmd = parts.next().unwrap_or_default();
                        (cmd, parts.collect())
                    }
                    _ => (self.command.clone(), Vec::new()),
                }
            } else {
                (self.command.clone(), Vec::new())
            };
        parsed_args.extend(self.args.iter().cloned());
        (actual_command, parsed_args)
    }

    fn into_command(self) -> (String, Command) {
        let (actual_command, parsed_args) = self.resolve();

        tracing::debug!(
            "Preparing process: command='{}', args={:?}",
            actual_command,
            parsed_args
        );

        let mut cmd = Command::new(&actual_command);
        cmd.args(&parsed_args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if let Some(cwd) = self.cwd {
            tracing::debug!("Setting working directory to: {:?}", cwd);
            cmd.current_dir(cwd);
        }

        for (key, value) in self.env {
            cmd.env(key, value);
        }

        (actual_command, cmd)
    }

    pub async fn spawn(self) -> crate::Result<Child> {
        let (actual_command, mut cmd) = self.into_command();
        tracing::info!("Spawning process: {}", actual_command);
        cmd.spawn()
            .map_err(|e| crate::Error::SpawnFailed(format!("{}: {}", actual_command, e)))
    }

    /// Run to completion and capture stdout/stderr.
    pub async fn output(self) -> crate::Result<std::process::Output> {
        let (actual_command, mut cmd) = self.into_command();
        cmd.output()
            .await
            .map_err(|e| crate::Error::SpawnFailed(format!("{}: {}", actual_command, e)))
    }
}
