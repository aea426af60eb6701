//! Retry and state polling for provider operations

use crate::error::{ProviderError, Result};
use std::future::Future;
use std::time::Duration;

/// Retry configuration for provider operations
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(config: &RetryConfig, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = config.initial_delay;
    let mut attempt = 1;

    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(operation, attempt, error = %e, "retrying after error");
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(config.backoff_multiplier).min(config.max_delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Parameters for [`wait_for_state`]
#[derive(Debug, Clone)]
pub struct StateWait {
    /// Description used in errors and logs (e.g. "waiting for MediaLive Multiplex (id) create")
    pub operation: String,
    pub pending: Vec<&'static str>,
    pub target: Vec<&'static str>,
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Treat "not found" as reaching the target (used when waiting for deletion)
    pub not_found_is_target: bool,
}

impl StateWait {
    pub fn new(operation: impl Into<String>, pending: &[&'static str], target: &[&'static str]) -> Self {
        Self {
            operation: operation.into(),
            pending: pending.to_vec(),
            target: target.to_vec(),
            timeout: Duration::from_secs(30 * 60),
            poll_interval: Duration::from_secs(5),
            not_found_is_target: false,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn until_not_found(mut self) -> Self {
        self.not_found_is_target = true;
        self
    }
}

/// Poll `refresh` until the remote object reaches a target state.
///
/// `refresh` returns `None` when the object does not exist, otherwise the
/// object together with its state name.
pub async fn wait_for_state<T, F, Fut>(wait: &StateWait, mut refresh: F) -> Result<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<(T, String)>>>,
{
    let deadline = tokio::time::Instant::now() + wait.timeout;

    loop {
        match refresh().await? {
            None if wait.not_found_is_target => return Ok(None),
            None => return Err(ProviderError::NotFound(wait.operation.clone())),
            Some((value, state)) => {
                if wait.target.contains(&state.as_str()) {
                    return Ok(Some(value));
                }
                if !wait.pending.contains(&state.as_str()) {
                    return Err(ProviderError::UnexpectedState {
                        operation: wait.operation.clone(),
                        state,
                        expected: wait.target.join(", "),
                    });
                }
                tracing::debug!(operation = %wait.operation, state = %state, "still pending");
            }
        }

        if tokio::time::Instant::now() + wait.poll_interval > deadline {
            return Err(ProviderError::Timeout(wait.operation.clone()));
        }
        tokio::time::sleep(wait.poll_interval).await;
    }
}
