use crate::config::RetryConfig;
use crate::model::ApiError;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Errors that can tell whether repeating the call might help.
pub trait Retryable {
    fn is_transient(&self) -> bool;

    fn retry_after(&self) -> Option<Duration> {
        None
    }
}

impl Retryable for ApiError {
    fn is_transient(&self) -> bool {
        ApiError::is_transient(self)
    }

    fn retry_after(&self) -> Option<Duration> {
        ApiError::retry_after(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    pub fn from_config(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            initial_delay: Duration::from_millis(cfg.initial_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
            jitter: cfg.jitter,
        }
    }

    /// Policy without any waiting, for replay and tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    /// Backoff after the given failed attempt (1-based): doubles each time, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self.initial_delay.saturating_mul(1u32 << exponent);
        delay.min(self.max_delay)
    }

    fn wait_before_retry(&self, attempt: u32, server_hint: Option<Duration>) -> Duration {
        let mut wait = self.delay_for(attempt);
        if self.jitter && !wait.is_zero() {
            let spread = (wait.as_millis() as u64 / 4).max(1);
            wait += Duration::from_millis(rand::rng().random_range(0..=spread));
        }
        match server_hint {
            Some(hint) if hint > wait => hint,
            _ => wait,
        }
    }
}

/// Runs `op` until it succeeds, fails with a non-transient error, or
/// `max_attempts` is used up. The last error is returned on give-up.
pub async fn run_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    step_name: &str,
    mut op: F,
) -> Result<T, E>
where
    E: Retryable + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        debug!("{}: attempt {}/{}", step_name, attempt, max_attempts);
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!("{}: succeeded on attempt {}/{}", step_name, attempt, max_attempts);
                }
                return Ok(value);
            }
            Err(e) if !e.is_transient() => {
                warn!("{}: not retrying: {}", step_name, e);
                return Err(e);
            }
            Err(e) if attempt >= max_attempts => {
                error!("{}: all {} attempts failed, last error: {}", step_name, max_attempts, e);
                return Err(e);
            }
            Err(e) => {
                let wait = policy.wait_before_retry(attempt, e.retry_after());
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:.1}s",
                    step_name,
                    attempt,
                    max_attempts,
                    e,
                    wait.as_secs_f64()
                );
                sleep(wait).await;
                attempt += 1;
            }
        }
    }
}
