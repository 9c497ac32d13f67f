// Retry handling for idempotent engine reads.
// State-changing calls never go through here: a repeated suspend or complete
// could duplicate side effects on the engine.

use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, warn};

use crate::engine::EngineError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. `1` disables retries.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delays between attempts: base, 2×base, 4×base… capped at `max_delay`.
    pub fn delays(&self) -> Vec<Duration> {
        let factor = (self.base_delay.as_millis() as u64 / 2).max(1);
        ExponentialBackoff::from_millis(2)
            .factor(factor)
            .max_delay(self.max_delay)
            .take(self.max_attempts.saturating_sub(1) as usize)
            .map(|delay| if self.jitter { jitter(delay) } else { delay })
            .collect()
    }

    /// Run an idempotent read, retrying only errors that
    /// [`EngineError::is_retryable`] accepts.
    pub async fn run<F, Fut, T>(&self, operation: &str, action: F) -> Result<T, EngineError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, EngineError>>,
    {
        debug!(operation, max_attempts = self.max_attempts, "Starting idempotent request");
        RetryIf::spawn(self.delays(), action, |error: &EngineError| {
            let retry = error.is_retryable();
            if retry {
                warn!(operation, error = %error, "Retryable failure, backing off");
            }
            retry
        })
        .await
    }
}
