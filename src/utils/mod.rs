pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use retry::{retry_with_backoff, IsTransient, Retry, RetryConfig, RetryResult};
