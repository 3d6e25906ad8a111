use actix::prelude::*;
use std::sync::Arc;

use crate::actors::core::HealthStatus;
use crate::catalog::CatalogProjection;
use crate::event_sourcing::OutboxStore;
use crate::metrics::Metrics;
use crate::utils::CircuitBreaker;
use super::{
    CatalogProjector, DlqActor, DrainNow, DrainReport, GetDlqStats, DlqStats, GetSystemHealth,
    HealthMonitorActor, OutboxDrainer, ProjectorConfig, SystemHealth, UpdateHealth,
};

// ============================================================================
// Coordinator Actor - Orchestrates all system actors
// ============================================================================
//
// Actor Hierarchy:
//   CoordinatorActor (Supervisor)
//   ├── HealthMonitorActor
//   ├── DlqActor
//   └── CatalogProjector
//
// Domain commands never go through actors; the coordinator only owns the
// background side of the system.
//
// ============================================================================

const HEALTH_LOG_INTERVAL: std::time::Duration = std::time::Duration::from_secs(30);

pub struct CoordinatorActor {
    outbox: Arc<dyn OutboxStore>,
    projection: CatalogProjection,
    config: ProjectorConfig,
    catalog_breaker: Option<CircuitBreaker>,
    metrics: Option<Arc<Metrics>>,
    projector: Option<Addr<CatalogProjector>>,
    health_monitor: Option<Addr<HealthMonitorActor>>,
    dlq_actor: Option<Addr<DlqActor>>,
}

impl CoordinatorActor {
    pub fn new(
        outbox: Arc<dyn OutboxStore>,
        projection: CatalogProjection,
        config: ProjectorConfig,
    ) -> Self {
        Self {
            outbox,
            projection,
            config,
            catalog_breaker: None,
            metrics: None,
            projector: None,
            health_monitor: None,
            dlq_actor: None,
        }
    }

    pub fn with_catalog_breaker(mut self, breaker: CircuitBreaker) -> Self {
        self.catalog_breaker = Some(breaker);
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn start_child_actors(&mut self) {
        tracing::info!("Starting supervised child actors");

        let health_monitor =
            HealthMonitorActor::new(self.catalog_breaker.clone(), self.metrics.clone()).start();
        self.health_monitor = Some(health_monitor.clone());

        let dlq_actor = DlqActor::new(self.outbox.clone(), Some(health_monitor.clone())).start();
        self.dlq_actor = Some(dlq_actor);

        health_monitor.do_send(UpdateHealth {
            component: "dead_letter_queue".to_string(),
            status: HealthStatus::Healthy,
            details: Some("DLQ actor started".to_string()),
        });

        let drainer = OutboxDrainer::new(
            self.outbox.clone(),
            self.projection.clone(),
            self.config.clone(),
            self.metrics.clone(),
        );
        let projector = CatalogProjector::new(drainer, Some(health_monitor.clone())).start();
        self.projector = Some(projector);

        health_monitor.do_send(UpdateHealth {
            component: "catalog_projector".to_string(),
            status: HealthStatus::Healthy,
            details: Some("Catalog projector started".to_string()),
        });

        tracing::info!("All supervised actors started");
    }
}

impl Actor for CoordinatorActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("CoordinatorActor started");
        self.start_child_actors();

        ctx.run_interval(HEALTH_LOG_INTERVAL, |act, _ctx| {
            let Some(health_monitor) = act.health_monitor.clone() else {
                return;
            };
            actix::spawn(async move {
                match health_monitor.send(GetSystemHealth).await {
                    Ok(health) => match health.overall_status {
                        HealthStatus::Healthy => tracing::debug!("System health check: Healthy"),
                        HealthStatus::Degraded(ref msg) => {
                            tracing::warn!("System health check: Degraded - {}", msg)
                        }
                        HealthStatus::Unhealthy(ref msg) => {
                            tracing::error!("System health check: Unhealthy - {}", msg)
                        }
                    },
                    Err(e) => tracing::error!("Failed to get system health: {}", e),
                }
            });
        });
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        tracing::info!("CoordinatorActor stopping - initiating graceful shutdown");
        Running::Stop
    }

    fn stopped(&mut self, _: &mut Self::Context) {
        tracing::info!("CoordinatorActor stopped");
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

/// Forwarded to the projector
#[derive(Message)]
#[rtype(result = "Result<DrainReport, String>")]
pub struct DrainCatalog;

#[derive(Message)]
#[rtype(result = "Result<SystemHealth, String>")]
pub struct GetHealth;

#[derive(Message)]
#[rtype(result = "Result<DlqStats, String>")]
pub struct GetDeadLetterStats;

impl Handler<Shutdown> for CoordinatorActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) {
        tracing::info!("Received shutdown signal");

        if let Some(ref projector) = self.projector {
            projector.do_send(StopActor);
        }
        if let Some(ref dlq_actor) = self.dlq_actor {
            dlq_actor.do_send(StopActor);
        }
        if let Some(ref health_monitor) = self.health_monitor {
            health_monitor.do_send(StopActor);
        }

        ctx.stop();
    }
}

impl Handler<DrainCatalog> for CoordinatorActor {
    type Result = ResponseFuture<Result<DrainReport, String>>;

    fn handle(&mut self, _msg: DrainCatalog, _ctx: &mut Self::Context) -> Self::Result {
        let projector = self.projector.clone();
        Box::pin(async move {
            let projector = projector.ok_or_else(|| "Catalog projector not running".to_string())?;
            projector.send(DrainNow).await.map_err(|e| e.to_string())?
        })
    }
}

impl Handler<GetHealth> for CoordinatorActor {
    type Result = ResponseFuture<Result<SystemHealth, String>>;

    fn handle(&mut self, _msg: GetHealth, _ctx: &mut Self::Context) -> Self::Result {
        let monitor = self.health_monitor.clone();
        Box::pin(async move {
            let monitor = monitor.ok_or_else(|| "Health monitor not running".to_string())?;
            monitor.send(GetSystemHealth).await.map_err(|e| e.to_string())
        })
    }
}

impl Handler<GetDeadLetterStats> for CoordinatorActor {
    type Result = ResponseFuture<Result<DlqStats, String>>;

    fn handle(&mut self, _msg: GetDeadLetterStats, _ctx: &mut Self::Context) -> Self::Result {
        let dlq = self.dlq_actor.clone();
        Box::pin(async move {
            let dlq = dlq.ok_or_else(|| "DLQ actor not running".to_string())?;
            dlq.send(GetDlqStats).await.map_err(|e| e.to_string())?
        })
    }
}

#[derive(Message)]
#[rtype(result = "()")]
struct StopActor;

impl Handler<StopActor> for CatalogProjector {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        tracing::info!("CatalogProjector received stop signal");
        ctx.stop();
    }
}

impl Handler<StopActor> for HealthMonitorActor {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        tracing::info!("HealthMonitorActor received stop signal");
        ctx.stop();
    }
}

impl Handler<StopActor> for DlqActor {
    type Result = ();

    fn handle(&mut self, _: StopActor, ctx: &mut Self::Context) {
        tracing::info!("DlqActor received stop signal");
        ctx.stop();
    }
}
