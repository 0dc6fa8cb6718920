pub mod backoff;
pub mod config;
pub mod error;
pub mod name;
pub mod poll;
pub mod process;

pub use backoff::{BackoffStrategy, RetryPolicy};
pub use config::{ConfigLoader, LocalDevConfig, Settings};
pub use error::{Error, Result};
pub use name::{NormalizeOptions, env_key, normalize_name};
pub use poll::{Check, FailedAttempt, NoopObserver, PollError, PollObserver, TracingObserver, poll};
pub use process::{ExitStatus, ProcessBuilder, ProcessHandle, Signal};
