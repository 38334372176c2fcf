//! Bounded retry for idempotent control-plane calls
//!
//! Mutating calls against the control plane can fail transiently: rate
//! limiting, backend overload, or a lock held on the project while
//! another operation settles. Those are retried on a fixed schedule up
//! to a bounded number of attempts; every other failure is surfaced
//! immediately.

use crate::error::{OpsError, Result};
use std::future::Future;
use std::time::Duration;

/// Whether an error is worth retrying unchanged after a delay.
///
/// Retryable: 429 (rate limited), 500 (backend overload), 423 (project
/// locked by a concurrent operation). Errors without an HTTP status are
/// never retryable.
pub fn is_retryable(err: &OpsError) -> bool {
    matches!(err.status(), Some(429) | Some(500) | Some(423))
}

/// Retry schedule for idempotent actions
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Fixed wait between attempts
    pub delay: Duration,

    /// Upper bound on invocations of the action
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: 10,
        }
    }
}

impl RetryPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
        }
    }

    /// Run `action` until it succeeds, fails permanently, or the attempt
    /// budget is exhausted.
    ///
    /// The action must be idempotent: it is re-invoked from the top on
    /// every retry, including any completion wait it performs
    /// internally. On exhaustion the last transient error is surfaced; a
    /// non-retryable error short-circuits after a single invocation.
    pub async fn run<F, Fut>(&self, name: &str, mut action: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let mut attempt: u32 = 0;
        let mut last: Option<OpsError> = None;

        while attempt < self.max_attempts {
            match action().await {
                Ok(()) => {
                    if attempt > 0 {
                        tracing::debug!("{} succeeded after {} retries", name, attempt);
                    }
                    return Ok(());
                }
                // The backend occasionally reports a success status inside
                // an error envelope; treat it as a completed no-op.
                Err(err) if err.status() == Some(200) => {
                    tracing::debug!(
                        "{} returned an error with status 200, treating as success",
                        name
                    );
                    return Ok(());
                }
                Err(err) if is_retryable(&err) => {
                    attempt += 1;
                    tracing::debug!(
                        "{} failed transiently (attempt {}/{}): {}",
                        name,
                        attempt,
                        self.max_attempts,
                        err
                    );
                    last = Some(err);
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        match last {
            Some(err) => {
                tracing::warn!("{} exhausted {} attempts: {}", name, self.max_attempts, err);
                Err(err)
            }
            // max_attempts of zero means the action was never invoked
            None => Ok(()),
        }
    }
}
