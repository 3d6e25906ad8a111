use async_trait::async_trait;
use sqlx::PgPool;
use std::marker::PhantomData;
use uuid::Uuid;
use anyhow::{Result, bail};
use chrono::{DateTime, Utc};

use crate::event_sourcing::core::{deserialize_event, serialize_event, Aggregate, DomainEvent, EventEnvelope};

// ============================================================================
// Event Repository - Persistence port for event streams
// ============================================================================
//
// 1. Append events to an aggregate stream (append-only)
// 2. Load event history for aggregates
// 3. Enforce optimistic concurrency on the stream version
// 4. Write to outbox in the same transaction as the events
//
// ============================================================================

#[async_trait]
pub trait EventRepository<E: DomainEvent>: Send + Sync {
    /// Append events and return the new stream version
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64>;

    /// Load all events for an aggregate, oldest first
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>>;

    async fn get_current_version(&self, aggregate_id: Uuid) -> Result<i64>;

    async fn aggregate_exists(&self, aggregate_id: Uuid) -> Result<bool> {
        Ok(self.get_current_version(aggregate_id).await? > 0)
    }
}

/// Rebuild an aggregate from whatever repository holds its stream
pub async fn load_aggregate<A, S>(store: &S, aggregate_id: Uuid) -> Result<A>
where
    A: Aggregate,
    S: EventRepository<A::Event> + ?Sized,
{
    let events = store.load_events(aggregate_id).await?;

    if events.is_empty() {
        bail!("{} not found: {}", A::AGGREGATE_TYPE, aggregate_id);
    }

    A::load_from_events(events)
}

// ============================================================================
// PostgreSQL Event Store
// ============================================================================

pub struct PgEventStore<E: DomainEvent> {
    pool: PgPool,
    aggregate_type_name: String,  // e.g., "Order", "Restaurant", "Basket"
    _phantom: PhantomData<fn() -> E>,
}

#[derive(sqlx::FromRow)]
struct EventRow {
    aggregate_id: Uuid,
    sequence_number: i64,
    event_id: Uuid,
    event_type: String,
    event_version: i32,
    event_data: String,
    causation_id: Option<Uuid>,
    correlation_id: Uuid,
    occurred_at: DateTime<Utc>,
}

impl<E: DomainEvent> PgEventStore<E> {
    pub fn new(pool: PgPool, aggregate_type_name: &str) -> Self {
        Self {
            pool,
            aggregate_type_name: aggregate_type_name.to_string(),
            _phantom: PhantomData,
        }
    }

    pub fn aggregate_type_name(&self) -> &str {
        &self.aggregate_type_name
    }
}

#[async_trait]
impl<E: DomainEvent> EventRepository<E> for PgEventStore<E> {
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64> {
        if events.is_empty() {
            bail!("Cannot append empty event list");
        }

        let mut tx = self.pool.begin().await?;

        // Row lock keeps concurrent writers on the same stream serialised;
        // brand new streams are protected by the (aggregate_id, sequence) key
        let current_version: i64 = sqlx::query_scalar(
            "SELECT current_sequence FROM aggregate_sequence WHERE aggregate_id = $1 FOR UPDATE",
        )
        .bind(aggregate_id)
        .fetch_optional(&mut *tx)
        .await?
        .unwrap_or(0);

        if current_version != expected_version {
            bail!(
                "Concurrency conflict: expected version {}, but current is {}",
                expected_version,
                current_version
            );
        }

        let mut new_version = expected_version;

        for envelope in &events {
            new_version += 1;

            let event_json = serialize_event(&envelope.event_data)?;

            sqlx::query(
                "INSERT INTO event_store (
                    aggregate_id, sequence_number, event_id, aggregate_type, event_type,
                    event_version, event_data, causation_id, correlation_id, occurred_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(aggregate_id)
            .bind(new_version)
            .bind(envelope.event_id)
            .bind(&self.aggregate_type_name)
            .bind(&envelope.event_type)
            .bind(envelope.event_version)
            .bind(&event_json)
            .bind(envelope.causation_id)
            .bind(envelope.correlation_id)
            .bind(envelope.timestamp)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO outbox_messages (
                    id, aggregate_id, aggregate_type, event_id, event_type,
                    payload, created_at, attempts
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, 0)",
            )
            .bind(Uuid::now_v7())
            .bind(aggregate_id)
            .bind(&self.aggregate_type_name)
            .bind(envelope.event_id)
            .bind(&envelope.event_type)
            .bind(&event_json)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "INSERT INTO aggregate_sequence (aggregate_id, current_sequence, updated_at)
             VALUES ($1, $2, $3)
             ON CONFLICT (aggregate_id)
             DO UPDATE SET current_sequence = EXCLUDED.current_sequence, updated_at = EXCLUDED.updated_at",
        )
        .bind(aggregate_id)
        .bind(new_version)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version = new_version,
            event_count = events.len(),
            "Appended events to event store"
        );

        Ok(new_version)
    }

    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            "SELECT aggregate_id, sequence_number, event_id, event_type, event_version,
                    event_data, causation_id, correlation_id, occurred_at
             FROM event_store
             WHERE aggregate_id = $1
             ORDER BY sequence_number ASC",
        )
        .bind(aggregate_id)
        .fetch_all(&self.pool)
        .await?;

        let mut events = Vec::with_capacity(rows.len());

        for row in rows {
            let event_data: E = deserialize_event(&row.event_data)?;

            events.push(EventEnvelope {
                event_id: row.event_id,
                aggregate_id: row.aggregate_id,
                sequence_number: row.sequence_number,
                event_type: row.event_type,
                event_version: row.event_version,
                event_data,
                causation_id: row.causation_id,
                correlation_id: row.correlation_id,
                timestamp: row.occurred_at,
            });
        }

        tracing::debug!("Loaded {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }

    async fn get_current_version(&self, aggregate_id: Uuid) -> Result<i64> {
        let version: Option<i64> = sqlx::query_scalar(
            "SELECT current_sequence FROM aggregate_sequence WHERE aggregate_id = $1",
        )
        .bind(aggregate_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(version.unwrap_or(0))
    }
}
