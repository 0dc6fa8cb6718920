//! Retry driver for asynchronous remote state transitions.
//!
//! A check reports one of three outcomes. [`poll`] interprets them against a
//! [`RetryPolicy`]: `Ready` stops with the value, `NotReady` waits and tries
//! again, `Abort` stops immediately. Progress is reported to a
//! [`PollObserver`]; the driver itself does not log.

use std::future::Future;
use thiserror::Error;

use crate::RetryPolicy;

/// Outcome of a single check.
#[derive(Debug)]
pub enum Check<T, E> {
    Ready(T),
    NotReady(String),
    Abort(E),
}

#[derive(Debug, Error)]
pub enum PollError<E> {
    #[error("{0}")]
    Aborted(E),

    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub attempt: u32,
    pub retries_left: u32,
    pub retries: u32,
    pub message: String,
}

pub trait PollObserver: Send + Sync {
    fn on_failed_attempt(&self, failed: &FailedAttempt);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {
    fn on_failed_attempt(&self, _failed: &FailedAttempt) {}
}

/// Logs `attempt/retries: message` for every attempt that was not ready.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PollObserver for TracingObserver {
    fn on_failed_attempt(&self, failed: &FailedAttempt) {
        tracing::warn!("{}/{}: {}", failed.attempt, failed.retries, failed.message);
    }
}

pub async fn poll<T, E, F, Fut>(
    policy: &RetryPolicy,
    observer: &dyn PollObserver,
    mut check: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Check<T, E>>,
{
    let mut backoff = policy.backoff();
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let message = match check().await {
            Check::Ready(value) => return Ok(value),
            Check::Abort(err) => return Err(PollError::Aborted(err)),
            Check::NotReady(message) => message,
        };

        observer.on_failed_attempt(&FailedAttempt {
            attempt,
            retries_left: policy.max_attempts().saturating_sub(attempt),
            retries: policy.retries,
            message: message.clone(),
        });

        match backoff.next_delay() {
            Some(delay) => tokio::time::sleep(delay).await,
            None => {
                return Err(PollError::Exhausted {
                    attempts: attempt,
                    last: message,
                });
            }
        }
    }
}
