use std::time::Duration;

use crate::actors::ProjectorConfig;
use crate::utils::{CircuitBreakerConfig, RetryConfig};

// ============================================================================
// Settings - environment configuration
// ============================================================================
//
// Required:
//   DATABASE_URL                      PostgreSQL event store
//   REDIS_URL                         catalog document store
//
// Optional:
//   METRICS_PORT                      default 9090
//   PROJECTOR_POLL_INTERVAL_MS        default 2000
//   PROJECTOR_BATCH_SIZE              default 100
//   PROJECTOR_MAX_FAILURES            default 5
//   RETRY_MAX_ATTEMPTS                default 3
//   RETRY_INITIAL_DELAY_MS            default 100
//   CIRCUIT_BREAKER_FAILURE_THRESHOLD default 5
//   CIRCUIT_BREAKER_TIMEOUT_SECS      default 30
//
// ============================================================================

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("environment variable {0} cannot be empty")]
    EmptyValue(String),

    #[error("environment variable {key} has an invalid value: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub redis_url: String,
    pub metrics_port: u16,
    pub projector: ProjectorConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Settings {
    /// Read the process environment, after loading `.env` if there is one
    pub fn from_env() -> Result<Self, ConfigError> {
        if dotenvy::dotenv().is_ok() {
            tracing::debug!("Loaded environment from .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let retry_defaults = RetryConfig::default();
        let retry = RetryConfig {
            max_attempts: env.parse("RETRY_MAX_ATTEMPTS", retry_defaults.max_attempts)?,
            initial_delay: Duration::from_millis(
                env.parse("RETRY_INITIAL_DELAY_MS", retry_defaults.initial_delay.as_millis() as u64)?,
            ),
            ..retry_defaults
        };

        let projector_defaults = ProjectorConfig::default();
        let projector = ProjectorConfig {
            poll_interval: Duration::from_millis(env.parse(
                "PROJECTOR_POLL_INTERVAL_MS",
                projector_defaults.poll_interval.as_millis() as u64,
            )?),
            batch_size: env.parse("PROJECTOR_BATCH_SIZE", projector_defaults.batch_size)?,
            max_failures: env.parse("PROJECTOR_MAX_FAILURES", projector_defaults.max_failures)?,
            retry,
        };

        let breaker_defaults = CircuitBreakerConfig::default();
        let circuit_breaker = CircuitBreakerConfig {
            failure_threshold: env.parse("CIRCUIT_BREAKER_FAILURE_THRESHOLD", breaker_defaults.failure_threshold)?,
            timeout: Duration::from_secs(
                env.parse("CIRCUIT_BREAKER_TIMEOUT_SECS", breaker_defaults.timeout.as_secs())?,
            ),
            ..breaker_defaults
        };

        Ok(Self {
            database_url: env.required("DATABASE_URL")?,
            redis_url: env.required("REDIS_URL")?,
            metrics_port: env.parse("METRICS_PORT", 9090)?,
            projector,
            circuit_breaker,
        })
    }
}

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        let value = (self.0)(key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))?;
        if value.trim().is_empty() {
            return Err(ConfigError::EmptyValue(key.to_string()));
        }
        Ok(value)
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, default: T) -> Result<T, ConfigError> {
        match (self.0)(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
        }
    }
}
