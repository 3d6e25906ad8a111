use chrono::{DateTime, Utc};

// ============================================================================
// Health Check Abstractions
// ============================================================================
//
// Components report a HealthStatus to the HealthMonitorActor; the worst
// status wins when the system status is computed.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, HealthStatus::Degraded(_))
    }

    pub fn is_unhealthy(&self) -> bool {
        matches!(self, HealthStatus::Unhealthy(_))
    }

    /// 0=Unhealthy, 1=Degraded, 2=Healthy
    pub fn gauge_value(&self) -> i64 {
        match self {
            HealthStatus::Unhealthy(_) => 0,
            HealthStatus::Degraded(_) => 1,
            HealthStatus::Healthy => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    pub last_check: DateTime<Utc>,
    pub details: Option<String>,
}

impl ComponentHealth {
    pub fn new(name: impl Into<String>, status: HealthStatus) -> Self {
        Self {
            name: name.into(),
            status,
            last_check: Utc::now(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Implemented by actors that can describe their own health
pub trait HealthCheckable {
    fn check_health(&self) -> ComponentHealth;

    fn component_name(&self) -> &str;
}
