use actix::prelude::*;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::{ComponentHealth, HealthStatus};
use crate::metrics::Metrics;
use crate::utils::{CircuitBreaker, CircuitState};

// ============================================================================
// Health Monitor Actor - Monitors system health
// ============================================================================
//
// Responsibilities:
// - Track health status of all components
// - Watch the catalog store circuit breaker
// - Aggregate system-wide health and publish it as a gauge
//
// ============================================================================

const BREAKER_CHECK_INTERVAL: Duration = Duration::from_secs(10);

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct UpdateHealth {
    pub component: String,
    pub status: HealthStatus,
    pub details: Option<String>,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

#[derive(Debug, Clone, MessageResponse)]
pub struct SystemHealth {
    pub overall_status: HealthStatus,
    pub components: HashMap<String, ComponentHealth>,
    pub check_time: chrono::DateTime<Utc>,
}

// ============================================================================
// Health Monitor Actor
// ============================================================================

pub struct HealthMonitorActor {
    components: HashMap<String, ComponentHealth>,
    catalog_breaker: Option<CircuitBreaker>,
    metrics: Option<Arc<Metrics>>,
}

impl HealthMonitorActor {
    pub fn new(catalog_breaker: Option<CircuitBreaker>, metrics: Option<Arc<Metrics>>) -> Self {
        Self {
            components: HashMap::new(),
            catalog_breaker,
            metrics,
        }
    }

    fn compute_overall_status(&self) -> HealthStatus {
        let mut has_degraded = false;
        let mut unhealthy_components = Vec::new();

        for (name, health) in &self.components {
            match &health.status {
                HealthStatus::Unhealthy(msg) => {
                    unhealthy_components.push(format!("{}: {}", name, msg));
                }
                HealthStatus::Degraded(_) => has_degraded = true,
                HealthStatus::Healthy => {}
            }
        }

        if !unhealthy_components.is_empty() {
            unhealthy_components.sort();
            HealthStatus::Unhealthy(unhealthy_components.join(", "))
        } else if has_degraded {
            HealthStatus::Degraded("Some components degraded".to_string())
        } else {
            HealthStatus::Healthy
        }
    }
}

impl Actor for HealthMonitorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor started");

        let Some(breaker) = self.catalog_breaker.clone() else {
            return;
        };

        ctx.run_interval(BREAKER_CHECK_INTERVAL, move |_act, ctx| {
            let breaker = breaker.clone();
            let me = ctx.address();

            actix::spawn(async move {
                let status = match breaker.get_state().await {
                    CircuitState::Closed => HealthStatus::Healthy,
                    CircuitState::HalfOpen => HealthStatus::Degraded("Circuit breaker half-open".to_string()),
                    CircuitState::Open => HealthStatus::Unhealthy("Circuit breaker open".to_string()),
                };
                me.do_send(UpdateHealth {
                    component: "catalog_store".to_string(),
                    status,
                    details: None,
                });
            });
        });
    }
}

// ============================================================================
// Message Handlers
// ============================================================================

impl Handler<UpdateHealth> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, msg: UpdateHealth, _ctx: &mut Self::Context) {
        tracing::debug!(
            component = %msg.component,
            status = ?msg.status,
            "Updated component health"
        );

        let mut health = ComponentHealth::new(msg.component.clone(), msg.status);
        if let Some(details) = msg.details {
            health = health.with_details(details);
        }
        self.components.insert(msg.component, health);

        if let Some(metrics) = &self.metrics {
            metrics.update_actor_health(self.compute_overall_status().gauge_value());
        }
    }
}

impl Handler<GetSystemHealth> for HealthMonitorActor {
    type Result = SystemHealth;

    fn handle(&mut self, _msg: GetSystemHealth, _ctx: &mut Self::Context) -> SystemHealth {
        SystemHealth {
            overall_status: self.compute_overall_status(),
            components: self.components.clone(),
            check_time: Utc::now(),
        }
    }
}
