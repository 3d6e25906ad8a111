use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::metrics::Metrics;

// ============================================================================
// Exponential Backoff Retry Strategy
// ============================================================================
//
// Used for the database connection at startup and for catalog projection
// writes. Errors that know they are permanent (IsTransient) stop the loop
// early so the message can go to the dead letter queue.
//
// ============================================================================

#[derive(Clone, Debug)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Startup connections: the database may still be coming up
    pub fn startup() -> Self {
        Self {
            max_attempts: 10,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(15),
            multiplier: 2.0,
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_millis(((delay.as_millis() as f64) * self.multiplier) as u64).min(self.max_delay)
    }
}

#[derive(Debug)]
pub enum RetryResult<T, E> {
    Success(T),
    /// Failed on every attempt
    Failed(E),
    /// Failed with an error that retrying cannot fix
    PermanentFailure(E),
}

impl<T, E> RetryResult<T, E> {
    pub fn into_result(self) -> Result<T, E> {
        match self {
            RetryResult::Success(value) => Ok(value),
            RetryResult::Failed(e) | RetryResult::PermanentFailure(e) => Err(e),
        }
    }
}

/// Check if an error is transient (should retry) or permanent (should not retry)
pub trait IsTransient {
    fn is_transient(&self) -> bool;
}

impl IsTransient for anyhow::Error {
    fn is_transient(&self) -> bool {
        true
    }
}

/// Named retry loop; attempts and outcomes go to the metrics registry when one is given
pub struct Retry {
    operation: &'static str,
    config: RetryConfig,
    metrics: Option<Arc<Metrics>>,
}

impl Retry {
    pub fn new(operation: &'static str, config: RetryConfig) -> Self {
        Self {
            operation,
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Metrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> RetryResult<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display + IsTransient,
    {
        let mut attempt = 0;
        let mut delay = self.config.initial_delay;

        loop {
            attempt += 1;
            if let Some(metrics) = &self.metrics {
                metrics.record_retry_attempt(self.operation, attempt);
            }

            match operation(attempt).await {
                Ok(result) => {
                    if attempt > 1 {
                        tracing::info!(
                            operation = self.operation,
                            attempt = attempt,
                            "Operation succeeded after retry"
                        );
                        self.record_outcome(true);
                    }
                    return RetryResult::Success(result);
                }
                Err(error) => {
                    if !error.is_transient() {
                        tracing::error!(
                            operation = self.operation,
                            error = %error,
                            "Permanent failure detected, not retrying"
                        );
                        self.record_outcome(false);
                        return RetryResult::PermanentFailure(error);
                    }

                    if attempt >= self.config.max_attempts {
                        tracing::error!(
                            operation = self.operation,
                            attempt = attempt,
                            error = %error,
                            "Operation failed after all retries"
                        );
                        self.record_outcome(false);
                        return RetryResult::Failed(error);
                    }

                    tracing::warn!(
                        operation = self.operation,
                        attempt = attempt,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "Transient failure, retrying after delay"
                    );

                    sleep(delay).await;
                    delay = self.config.next_delay(delay);
                }
            }
        }
    }

    fn record_outcome(&self, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_retry_outcome(self.operation, success);
        }
    }
}

/// Retry every error until attempts run out
pub async fn retry_with_backoff<F, Fut, T>(
    operation_name: &'static str,
    config: RetryConfig,
    operation: F,
) -> anyhow::Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    Retry::new(operation_name, config).run(operation).await.into_result()
}
