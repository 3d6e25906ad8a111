use actix::prelude::*;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::actors::core::{ComponentHealth, HealthCheckable, HealthStatus};
use crate::catalog::{CatalogError, CatalogProjection, ProjectionOutcome};
use crate::event_sourcing::{OutboxMessage, OutboxStore};
use crate::metrics::Metrics;
use crate::utils::{Retry, RetryConfig, RetryResult};
use super::{HealthMonitorActor, UpdateHealth};

// ============================================================================
// Catalog Projector - drains the outbox into the catalog read model
// ============================================================================
//
// Every poll:
// 1. Fetch the oldest pending outbox rows
// 2. Project each one with retry (restaurant events update documents,
//    other aggregates are acknowledged)
// 3. Mark it published, or record the failure
// 4. Park it in the dead letter table once it has failed too often, or
//    immediately when the failure is permanent
//
// A transient failure ends the batch so later events of the same
// restaurant are not applied ahead of it.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct ProjectorConfig {
    pub poll_interval: Duration,
    pub batch_size: i64,
    /// Failed polls before a message is dead-lettered
    pub max_failures: i32,
    pub retry: RetryConfig,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            batch_size: 100,
            max_failures: 5,
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DrainReport {
    pub projected: usize,
    pub skipped: usize,
    pub failed: usize,
    pub dead_lettered: usize,
}

impl DrainReport {
    pub fn is_empty(&self) -> bool {
        self.projected + self.skipped + self.failed + self.dead_lettered == 0
    }
}

/// Projection loop without the actor around it
#[derive(Clone)]
pub struct OutboxDrainer {
    outbox: Arc<dyn OutboxStore>,
    projection: CatalogProjection,
    config: ProjectorConfig,
    metrics: Option<Arc<Metrics>>,
}

impl OutboxDrainer {
    pub fn new(
        outbox: Arc<dyn OutboxStore>,
        projection: CatalogProjection,
        config: ProjectorConfig,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            outbox,
            projection,
            config,
            metrics,
        }
    }

    pub async fn drain_once(&self) -> anyhow::Result<DrainReport> {
        let messages = self.outbox.fetch_pending(self.config.batch_size).await?;
        let mut report = DrainReport::default();

        let retry = Retry::new("catalog_projection", self.config.retry.clone())
            .with_metrics(self.metrics.clone());

        for message in messages {
            let started = Instant::now();
            let result = retry.run(|_attempt| self.projection.project_message(&message)).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                RetryResult::Success(outcome) => {
                    self.outbox.mark_published(message.id).await?;
                    self.record(&message, elapsed, true);
                    match outcome {
                        ProjectionOutcome::Projected => report.projected += 1,
                        ProjectionOutcome::Skipped => report.skipped += 1,
                    }
                }
                RetryResult::PermanentFailure(error) => {
                    self.record(&message, elapsed, false);
                    self.dead_letter(&message, &error).await?;
                    report.dead_lettered += 1;
                }
                RetryResult::Failed(error) => {
                    self.record(&message, elapsed, false);
                    let failures = self.outbox.record_failure(message.id, &error.to_string()).await?;

                    if failures >= self.config.max_failures {
                        self.dead_letter(&message, &error).await?;
                        report.dead_lettered += 1;
                    } else {
                        tracing::warn!(
                            outbox_id = %message.id,
                            event_type = %message.event_type,
                            failures = failures,
                            error = %error,
                            "Projection failed, will retry on next poll"
                        );
                        report.failed += 1;
                        break;
                    }
                }
            }
        }

        if !report.is_empty() {
            tracing::debug!(
                projected = report.projected,
                skipped = report.skipped,
                failed = report.failed,
                dead_lettered = report.dead_lettered,
                "Outbox batch drained"
            );
        }

        Ok(report)
    }

    async fn dead_letter(&self, message: &OutboxMessage, error: &CatalogError) -> anyhow::Result<()> {
        tracing::error!(
            outbox_id = %message.id,
            aggregate_id = %message.aggregate_id,
            event_type = %message.event_type,
            error = %error,
            "Moving message to dead letter queue"
        );

        self.outbox.move_to_dead_letter(message, &error.to_string()).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_dlq_message(&message.event_type);
        }
        Ok(())
    }

    fn record(&self, message: &OutboxMessage, elapsed: f64, success: bool) {
        if let Some(metrics) = &self.metrics {
            metrics.record_outbox_event(&message.event_type, elapsed, success);
        }
    }
}

// ============================================================================
// Actor
// ============================================================================

pub struct CatalogProjector {
    drainer: OutboxDrainer,
    poll_interval: Duration,
    health_monitor: Option<Addr<HealthMonitorActor>>,
    draining: bool,
    last_error: Option<String>,
    consecutive_failures: u32,
}

impl CatalogProjector {
    pub fn new(drainer: OutboxDrainer, health_monitor: Option<Addr<HealthMonitorActor>>) -> Self {
        let poll_interval = drainer.config.poll_interval;
        Self {
            drainer,
            poll_interval,
            health_monitor,
            draining: false,
            last_error: None,
            consecutive_failures: 0,
        }
    }

    fn poll(&mut self, ctx: &mut Context<Self>) {
        if self.draining {
            return;
        }
        self.draining = true;

        let drainer = self.drainer.clone();
        let fut = async move { drainer.drain_once().await };

        ctx.spawn(fut.into_actor(self).map(|result, act, _ctx| {
            act.draining = false;
            match result {
                Ok(report) => {
                    act.last_error = None;
                    act.consecutive_failures = if report.failed > 0 { act.consecutive_failures + 1 } else { 0 };
                }
                Err(e) => {
                    tracing::error!(error = %e, "Outbox poll failed");
                    act.last_error = Some(e.to_string());
                    act.consecutive_failures += 1;
                }
            }
            act.report_health();
        }));
    }

    fn report_health(&self) {
        if let Some(monitor) = &self.health_monitor {
            let health = self.check_health();
            monitor.do_send(UpdateHealth {
                component: health.name,
                status: health.status,
                details: health.details,
            });
        }
    }
}

impl HealthCheckable for CatalogProjector {
    fn check_health(&self) -> ComponentHealth {
        let status = match (&self.last_error, self.consecutive_failures) {
            (Some(error), _) => HealthStatus::Unhealthy(error.clone()),
            (None, 0) => HealthStatus::Healthy,
            (None, n) => HealthStatus::Degraded(format!("{} polls with failed projections", n)),
        };
        ComponentHealth::new(self.component_name(), status)
    }

    fn component_name(&self) -> &str {
        "catalog_projector"
    }
}

impl Actor for CatalogProjector {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            "CatalogProjector started"
        );

        ctx.run_interval(self.poll_interval, |act, ctx| act.poll(ctx));
    }
}

/// Drain right away instead of waiting for the next tick
#[derive(Message)]
#[rtype(result = "Result<DrainReport, String>")]
pub struct DrainNow;

impl Handler<DrainNow> for CatalogProjector {
    type Result = ResponseFuture<Result<DrainReport, String>>;

    fn handle(&mut self, _msg: DrainNow, _ctx: &mut Self::Context) -> Self::Result {
        let drainer = self.drainer.clone();
        Box::pin(async move { drainer.drain_once().await.map_err(|e| e.to_string()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogStore, InMemoryCatalogStore, RestaurantDocument};
    use crate::catalog::documents::tests::registered_event;
    use crate::domain::restaurant::{MenuAdded, Menu, RestaurantEvent};
    use crate::event_sourcing::core::serialize_event;
    use crate::event_sourcing::InMemoryOutboxStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn config() -> ProjectorConfig {
        ProjectorConfig {
            poll_interval: Duration::from_millis(10),
            batch_size: 10,
            max_failures: 2,
            retry: RetryConfig {
                max_attempts: 2,
                initial_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                multiplier: 2.0,
            },
        }
    }

    fn message(aggregate_type: &str, aggregate_id: Uuid, event: &RestaurantEvent) -> OutboxMessage {
        use crate::event_sourcing::core::DomainEvent;
        OutboxMessage {
            id: Uuid::new_v4(),
            aggregate_id,
            aggregate_type: aggregate_type.to_string(),
            event_id: Uuid::new_v4(),
            event_type: event.event_type().to_string(),
            payload: serialize_event(event).unwrap(),
            created_at: Utc::now(),
            attempts: 0,
        }
    }

    fn menu_added() -> RestaurantEvent {
        RestaurantEvent::MenuAdded(MenuAdded {
            menu: Menu {
                menu_id: Uuid::new_v4(),
                name: "Pranzo".to_string(),
                name_eng: "Lunch".to_string(),
                image_url: String::new(),
            },
        })
    }

    fn drainer(outbox: Arc<InMemoryOutboxStore>, catalog: Arc<InMemoryCatalogStore>) -> OutboxDrainer {
        OutboxDrainer::new(outbox, CatalogProjection::new(catalog), config(), None)
    }

    #[tokio::test]
    async fn test_drain_projects_and_acknowledges() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let restaurant_id = Uuid::new_v4();

        outbox
            .push(message("Restaurant", restaurant_id, &RestaurantEvent::Registered(registered_event("Da Gino"))))
            .await;
        outbox.push(message("Restaurant", restaurant_id, &menu_added())).await;
        outbox.push(message("Order", Uuid::new_v4(), &menu_added())).await;

        let report = drainer(outbox.clone(), catalog.clone()).drain_once().await.unwrap();

        assert_eq!(report, DrainReport { projected: 2, skipped: 1, failed: 0, dead_lettered: 0 });
        assert_eq!(outbox.pending_count().await, 0);
        assert_eq!(outbox.published_count().await, 3);

        let doc: RestaurantDocument = catalog.get_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(doc.menus.len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_payload_dead_lettered_immediately() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let catalog = Arc::new(InMemoryCatalogStore::new());

        let mut bad = message("Restaurant", Uuid::new_v4(), &menu_added());
        bad.payload = "{\"type\":\"Unknown\"}".to_string();
        outbox.push(bad).await;

        let report = drainer(outbox.clone(), catalog).drain_once().await.unwrap();

        assert_eq!(report.dead_lettered, 1);
        assert_eq!(outbox.dead_letter_count().await.unwrap(), 1);
        assert_eq!(outbox.pending_count().await, 0);
    }

    #[tokio::test]
    async fn test_missing_document_is_dead_lettered() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let catalog = Arc::new(InMemoryCatalogStore::new());
        outbox.push(message("Restaurant", Uuid::new_v4(), &menu_added())).await;

        let report = drainer(outbox.clone(), catalog).drain_once().await.unwrap();

        assert_eq!(report.dead_lettered, 1);
        let letters = outbox.list_dead_letters(10).await.unwrap();
        assert_eq!(letters[0].event_type, "MenuAdded");
    }

    #[actix::test]
    async fn test_actor_drain_now() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let catalog = Arc::new(InMemoryCatalogStore::new());
        let restaurant_id = Uuid::new_v4();
        outbox
            .push(message("Restaurant", restaurant_id, &RestaurantEvent::Registered(registered_event("Da Gino"))))
            .await;

        let projector = CatalogProjector::new(drainer(outbox.clone(), catalog.clone()), None).start();
        let report = projector.send(DrainNow).await.unwrap().unwrap();

        // The interval may have drained it first
        assert!(report.projected <= 1);
        assert_eq!(outbox.pending_count().await, 0);
        assert!(catalog.get_restaurant(restaurant_id).await.unwrap().is_some());
    }
}
