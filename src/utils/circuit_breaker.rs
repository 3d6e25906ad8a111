use std::sync::Arc;
use tokio::sync::Mutex;
use std::time::{Duration, Instant};

use crate::metrics::Metrics;

// ============================================================================
// Circuit Breaker
// ============================================================================
//
// Guards the catalog cache connection. After `failure_threshold` errors in a
// row calls fail fast until `timeout` has passed, then a trial call decides
// between closing again and reopening.
//
// States:
// - Closed: calls pass through
// - Open: calls rejected immediately
// - HalfOpen: trial calls allowed
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    fn gauge(self) -> u8 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }

    fn label(self) -> &'static str {
        match self {
            CircuitState::Closed => "Closed",
            CircuitState::Open => "Open",
            CircuitState::HalfOpen => "HalfOpen",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub timeout: Duration,
    /// Successes needed in HalfOpen before closing
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout: Duration::from_secs(30),
            success_threshold: 2,
        }
    }
}

#[derive(Default)]
struct Window {
    consecutive_failures: u32,
    trial_successes: u32,
    opened_at: Option<Instant>,
}

struct Inner {
    state: CircuitState,
    window: Window,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    name: &'static str,
    inner: Arc<Mutex<Inner>>,
    config: CircuitBreakerConfig,
    metrics: Option<Arc<Metrics>>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                window: Window::default(),
            })),
            config,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<Arc<Metrics>>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Run `operation` unless the circuit is open
    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        self.admit().await?;

        let outcome = operation.await;
        let mut inner = self.inner.lock().await;
        match outcome {
            Ok(value) => {
                self.on_success(&mut inner);
                Ok(value)
            }
            Err(err) => {
                self.on_failure(&mut inner);
                Err(CircuitBreakerError::OperationFailed(err))
            }
        }
    }

    async fn admit<E>(&self) -> Result<(), CircuitBreakerError<E>> {
        let mut inner = self.inner.lock().await;
        if inner.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = inner
            .window
            .opened_at
            .map_or(true, |at| at.elapsed() >= self.config.timeout);
        if !cooled_down {
            return Err(CircuitBreakerError::CircuitOpen);
        }

        inner.window.trial_successes = 0;
        self.move_to(&mut inner, CircuitState::HalfOpen);
        Ok(())
    }

    fn on_success(&self, inner: &mut Inner) {
        match inner.state {
            CircuitState::Closed => inner.window.consecutive_failures = 0,
            CircuitState::HalfOpen => {
                inner.window.trial_successes += 1;
                if inner.window.trial_successes >= self.config.success_threshold {
                    inner.window = Window::default();
                    self.move_to(inner, CircuitState::Closed);
                }
            }
            // another caller reopened the circuit while this one was in flight
            CircuitState::Open => {}
        }
    }

    fn on_failure(&self, inner: &mut Inner) {
        inner.window.consecutive_failures += 1;

        let trip = match inner.state {
            CircuitState::Closed => inner.window.consecutive_failures >= self.config.failure_threshold,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if trip {
            inner.window.opened_at = Some(Instant::now());
            self.move_to(inner, CircuitState::Open);
        }
    }

    fn move_to(&self, inner: &mut Inner, to: CircuitState) {
        let from = std::mem::replace(&mut inner.state, to);

        tracing::warn!(
            breaker = self.name,
            from = from.label(),
            to = to.label(),
            failures = inner.window.consecutive_failures,
            "Circuit breaker state change"
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_circuit_breaker_transition(from.label(), to.label());
            metrics.update_circuit_breaker_state(to.gauge());
        }
    }

    pub async fn get_state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    pub async fn get_failure_count(&self) -> u32 {
        self.inner.lock().await.window.consecutive_failures
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("circuit breaker is open")]
    CircuitOpen,
    #[error("operation failed: {0}")]
    OperationFailed(E),
}
