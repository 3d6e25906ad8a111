// Private module declaration
mod server;

use prometheus::core::Collector;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::domain::order::OrderType;

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Ordering (placements, order value, lifecycle transitions, checkouts)
// - Outbox projection (throughput, latency)
// - Retry attempts and outcomes
// - Dead Letter Queue statistics
// - Circuit breaker state transitions
// - Actor health status
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the entire application
pub struct Metrics {
    registry: Registry,

    // Ordering Metrics
    pub orders_placed: IntCounterVec,
    pub order_value: HistogramVec,
    pub order_transitions: IntCounterVec,
    pub basket_checkouts: IntCounter,

    // Outbox Projection Metrics
    pub outbox_events_processed: IntCounterVec,
    pub outbox_events_failed: IntCounterVec,
    pub projection_duration: HistogramVec,

    // Retry Metrics
    pub retry_attempts_total: IntCounterVec,
    pub retry_success: IntCounterVec,
    pub retry_failure: IntCounterVec,

    // DLQ Metrics
    pub dlq_messages_total: IntCounter,
    pub dlq_messages_by_event_type: IntCounterVec,

    // Circuit Breaker Metrics
    pub circuit_breaker_state: IntGauge,
    pub circuit_breaker_transitions: IntCounterVec,

    // Actor Metrics
    pub actor_health_status: IntGauge,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let r = &registry;

        let metrics = Self {
            orders_placed: register(r, IntCounterVec::new(
                Opts::new("orders_placed_total", "Total orders placed"),
                &["order_type"],
            )?)?,
            order_value: register(r, HistogramVec::new(
                HistogramOpts::new("order_payable_amount", "Payable amount per placed order")
                    .buckets(vec![5.0, 10.0, 20.0, 30.0, 50.0, 75.0, 100.0, 200.0]),
                &["order_type"],
            )?)?,
            order_transitions: register(r, IntCounterVec::new(
                Opts::new("order_transitions_total", "Order lifecycle transitions by target state"),
                &["state"],
            )?)?,
            basket_checkouts: register(r, IntCounter::new("basket_checkouts_total", "Total baskets checked out")?)?,

            outbox_events_processed: register(r, IntCounterVec::new(
                Opts::new("outbox_events_processed_total", "Outbox events projected into the catalog"),
                &["event_type"],
            )?)?,
            outbox_events_failed: register(r, IntCounterVec::new(
                Opts::new("outbox_events_failed_total", "Outbox events whose projection failed"),
                &["event_type", "reason"],
            )?)?,
            projection_duration: register(r, HistogramVec::new(
                HistogramOpts::new("projection_duration_seconds", "Catalog projection duration")
                    .buckets(prometheus::exponential_buckets(0.001, 4.0, 7)?),
                &["event_type"],
            )?)?,

            retry_attempts_total: register(r, IntCounterVec::new(
                Opts::new("retry_attempts_total", "Attempts made by retried operations"),
                &["operation", "attempt"],
            )?)?,
            retry_success: register(r, IntCounterVec::new(
                Opts::new("retry_success_total", "Retried operations that eventually succeeded"),
                &["operation"],
            )?)?,
            retry_failure: register(r, IntCounterVec::new(
                Opts::new("retry_failure_total", "Retried operations that gave up"),
                &["operation"],
            )?)?,

            dlq_messages_total: register(r, IntCounter::new("dlq_messages_total", "Outbox messages moved to the dead letter queue")?)?,
            dlq_messages_by_event_type: register(r, IntCounterVec::new(
                Opts::new("dlq_messages_by_event_type", "Dead-lettered messages by event type"),
                &["event_type"],
            )?)?,

            circuit_breaker_state: register(r, IntGauge::new(
                "circuit_breaker_state",
                "Catalog store breaker (0=Closed, 1=Open, 2=HalfOpen)",
            )?)?,
            circuit_breaker_transitions: register(r, IntCounterVec::new(
                Opts::new("circuit_breaker_transitions_total", "Catalog store breaker transitions"),
                &["from_state", "to_state"],
            )?)?,

            actor_health_status: register(r, IntGauge::new(
                "actor_health_status",
                "Overall actor health (0=Unhealthy, 1=Degraded, 2=Healthy)",
            )?)?,

            registry: r.clone(),
        };

        Ok(metrics)
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_order_placed(&self, order_type: OrderType, payable_amount: Decimal) {
        let label = order_type_label(order_type);
        self.orders_placed.with_label_values(&[label]).inc();
        self.order_value
            .with_label_values(&[label])
            .observe(payable_amount.to_f64().unwrap_or_default());
    }

    pub fn record_order_transition(&self, state: &str) {
        self.order_transitions.with_label_values(&[state]).inc();
    }

    pub fn record_basket_checkout(&self) {
        self.basket_checkouts.inc();
    }

    /// Helper to record outbox event processing
    pub fn record_outbox_event(&self, event_type: &str, duration_secs: f64, success: bool) {
        if success {
            self.outbox_events_processed.with_label_values(&[event_type]).inc();
        } else {
            self.outbox_events_failed.with_label_values(&[event_type, "processing_error"]).inc();
        }
        self.projection_duration.with_label_values(&[event_type]).observe(duration_secs);
    }

    /// Helper to record retry attempt
    pub fn record_retry_attempt(&self, operation: &str, attempt: u32) {
        self.retry_attempts_total.with_label_values(&[operation, &attempt.to_string()]).inc();
    }

    /// Helper to record retry outcome
    pub fn record_retry_outcome(&self, operation: &str, success: bool) {
        if success {
            self.retry_success.with_label_values(&[operation]).inc();
        } else {
            self.retry_failure.with_label_values(&[operation]).inc();
        }
    }

    /// Helper to record DLQ message
    pub fn record_dlq_message(&self, event_type: &str) {
        self.dlq_messages_total.inc();
        self.dlq_messages_by_event_type.with_label_values(&[event_type]).inc();
    }

    pub fn update_circuit_breaker_state(&self, state: u8) {
        self.circuit_breaker_state.set(i64::from(state));
    }

    pub fn record_circuit_breaker_transition(&self, from_state: &str, to_state: &str) {
        self.circuit_breaker_transitions.with_label_values(&[from_state, to_state]).inc();
    }

    pub fn update_actor_health(&self, status: i64) {
        self.actor_health_status.set(status);
    }
}

fn register<C: Collector + Clone + 'static>(registry: &Registry, collector: C) -> prometheus::Result<C> {
    registry.register(Box::new(collector.clone()))?;
    Ok(collector)
}

fn order_type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Delivery => "delivery",
        OrderType::TakeAway => "take_away",
    }
}
