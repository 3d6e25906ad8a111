use actix::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::actors::core::HealthStatus;
use crate::event_sourcing::{DeadLetter, OutboxStore};
use super::{HealthMonitorActor, UpdateHealth};

// ============================================================================
// Dead Letter Queue Actor
// ============================================================================
//
// The projector parks messages in the dead letter table; this actor makes
// them visible. It answers queries for manual intervention and reports the
// queue as degraded health while it is not empty.
//
// ============================================================================

const STATS_INTERVAL: Duration = Duration::from_secs(30);
const STATS_SAMPLE: i64 = 1000;

pub struct DlqActor {
    outbox: Arc<dyn OutboxStore>,
    health_monitor: Option<Addr<HealthMonitorActor>>,
}

impl DlqActor {
    pub fn new(outbox: Arc<dyn OutboxStore>, health_monitor: Option<Addr<HealthMonitorActor>>) -> Self {
        Self { outbox, health_monitor }
    }
}

impl Actor for DlqActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!("DlqActor started - Dead Letter Queue ready");

        ctx.run_interval(STATS_INTERVAL, |act, _ctx| {
            let Some(monitor) = act.health_monitor.clone() else {
                return;
            };
            let outbox = act.outbox.clone();

            actix::spawn(async move {
                let status = match outbox.dead_letter_count().await {
                    Ok(0) => HealthStatus::Healthy,
                    Ok(n) => HealthStatus::Degraded(format!("{} messages in dead letter queue", n)),
                    Err(e) => HealthStatus::Unhealthy(format!("Dead letter queue unreadable: {}", e)),
                };
                monitor.do_send(UpdateHealth {
                    component: "dead_letter_queue".to_string(),
                    status,
                    details: None,
                });
            });
        });
    }
}

// ============================================================================
// Messages
// ============================================================================

#[derive(Message)]
#[rtype(result = "Result<Vec<DeadLetter>, String>")]
pub struct GetDlqMessages {
    pub limit: i64,
}

#[derive(Message)]
#[rtype(result = "Result<DlqStats, String>")]
pub struct GetDlqStats;

#[derive(Debug, Clone, Default)]
pub struct DlqStats {
    pub total_messages: i64,
    /// Counted over the most recent dead letters
    pub by_event_type: HashMap<String, i64>,
}

// ============================================================================
// Handlers
// ============================================================================

impl Handler<GetDlqMessages> for DlqActor {
    type Result = ResponseFuture<Result<Vec<DeadLetter>, String>>;

    fn handle(&mut self, msg: GetDlqMessages, _: &mut Self::Context) -> Self::Result {
        let outbox = self.outbox.clone();

        Box::pin(async move {
            outbox
                .list_dead_letters(msg.limit)
                .await
                .map_err(|e| format!("Failed to query DLQ: {}", e))
        })
    }
}

impl Handler<GetDlqStats> for DlqActor {
    type Result = ResponseFuture<Result<DlqStats, String>>;

    fn handle(&mut self, _msg: GetDlqStats, _: &mut Self::Context) -> Self::Result {
        let outbox = self.outbox.clone();

        Box::pin(async move {
            let total_messages = outbox
                .dead_letter_count()
                .await
                .map_err(|e| format!("Failed to count DLQ messages: {}", e))?;

            let letters = outbox
                .list_dead_letters(STATS_SAMPLE)
                .await
                .map_err(|e| format!("Failed to query DLQ: {}", e))?;

            let mut by_event_type = HashMap::new();
            for letter in letters {
                *by_event_type.entry(letter.event_type).or_insert(0) += 1;
            }

            Ok(DlqStats {
                total_messages,
                by_event_type,
            })
        })
    }
}
