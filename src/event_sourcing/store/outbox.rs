use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;
use uuid::Uuid;
use anyhow::Result;

// ============================================================================
// Transactional Outbox
// ============================================================================
//
// Rows are written by the event store in the same transaction as the
// events. The projector drains pending rows, marks them published, and
// parks the ones that keep failing in the dead letter table.
//
// ============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OutboxMessage {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub aggregate_type: String,
    pub event_id: Uuid,
    pub event_type: String,
    pub payload: String,
    pub created_at: DateTime<Utc>,
    pub attempts: i32,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DeadLetter {
    pub id: Uuid,
    pub outbox_id: Uuid,
    pub aggregate_id: Uuid,
    pub event_type: String,
    pub payload: String,
    pub error_message: String,
    pub failure_count: i32,
    pub failed_at: DateTime<Utc>,
}

#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Oldest unpublished rows first
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<OutboxMessage>>;

    async fn mark_published(&self, id: Uuid) -> Result<()>;

    /// Bump the attempt counter and return the new count
    async fn record_failure(&self, id: Uuid, error: &str) -> Result<i32>;

    /// Park a message: it leaves the pending set and lands in the DLQ
    async fn move_to_dead_letter(&self, message: &OutboxMessage, error: &str) -> Result<()>;

    async fn dead_letter_count(&self) -> Result<i64>;

    async fn list_dead_letters(&self, limit: i64) -> Result<Vec<DeadLetter>>;
}

// ============================================================================
// PostgreSQL Outbox
// ============================================================================

pub struct PgOutboxStore {
    pool: PgPool,
}

impl PgOutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OutboxStore for PgOutboxStore {
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<OutboxMessage>> {
        let messages: Vec<OutboxMessage> = sqlx::query_as(
            "SELECT id, aggregate_id, aggregate_type, event_id, event_type,
                    payload, created_at, attempts
             FROM outbox_messages
             WHERE published_at IS NULL AND dead_lettered_at IS NULL
             ORDER BY created_at ASC, id ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn mark_published(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE outbox_messages SET published_at = $2 WHERE id = $1")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn record_failure(&self, id: Uuid, error: &str) -> Result<i32> {
        let attempts: i32 = sqlx::query_scalar(
            "UPDATE outbox_messages
             SET attempts = attempts + 1, last_error = $2
             WHERE id = $1
             RETURNING attempts",
        )
        .bind(id)
        .bind(error)
        .fetch_one(&self.pool)
        .await?;

        Ok(attempts)
    }

    async fn move_to_dead_letter(&self, message: &OutboxMessage, error: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO dead_letter_queue (
                id, outbox_id, aggregate_id, event_type, payload,
                error_message, failure_count, failed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::now_v7())
        .bind(message.id)
        .bind(message.aggregate_id)
        .bind(&message.event_type)
        .bind(&message.payload)
        .bind(error)
        .bind(message.attempts)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE outbox_messages SET dead_lettered_at = $2, last_error = $3 WHERE id = $1")
            .bind(message.id)
            .bind(now)
            .bind(error)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::warn!(
            outbox_id = %message.id,
            event_type = %message.event_type,
            "Message moved to dead letter queue"
        );

        Ok(())
    }

    async fn dead_letter_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dead_letter_queue")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn list_dead_letters(&self, limit: i64) -> Result<Vec<DeadLetter>> {
        let letters: Vec<DeadLetter> = sqlx::query_as(
            "SELECT id, outbox_id, aggregate_id, event_type, payload,
                    error_message, failure_count, failed_at
             FROM dead_letter_queue
             ORDER BY failed_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(letters)
    }
}

// ============================================================================
// In-memory Outbox
// ============================================================================

#[derive(Default)]
struct OutboxState {
    pending: Vec<OutboxMessage>,
    published: Vec<Uuid>,
    dead_letters: Vec<DeadLetter>,
}

#[derive(Default)]
pub struct InMemoryOutboxStore {
    state: Mutex<OutboxState>,
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, message: OutboxMessage) {
        self.state.lock().await.pending.push(message);
    }

    pub async fn pending_count(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn published_count(&self) -> usize {
        self.state.lock().await.published.len()
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn fetch_pending(&self, limit: i64) -> Result<Vec<OutboxMessage>> {
        let state = self.state.lock().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.pending.iter().take(limit).cloned().collect())
    }

    async fn mark_published(&self, id: Uuid) -> Result<()> {
        let mut state = self.state.lock().await;
        state.pending.retain(|m| m.id != id);
        state.published.push(id);
        Ok(())
    }

    async fn record_failure(&self, id: Uuid, _error: &str) -> Result<i32> {
        let mut state = self.state.lock().await;
        let Some(message) = state.pending.iter_mut().find(|m| m.id == id) else {
            anyhow::bail!("Outbox message not found: {}", id);
        };
        message.attempts += 1;
        Ok(message.attempts)
    }

    async fn move_to_dead_letter(&self, message: &OutboxMessage, error: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.pending.retain(|m| m.id != message.id);
        state.dead_letters.push(DeadLetter {
            id: Uuid::now_v7(),
            outbox_id: message.id,
            aggregate_id: message.aggregate_id,
            event_type: message.event_type.clone(),
            payload: message.payload.clone(),
            error_message: error.to_string(),
            failure_count: message.attempts,
            failed_at: Utc::now(),
        });
        Ok(())
    }

    async fn dead_letter_count(&self) -> Result<i64> {
        Ok(self.state.lock().await.dead_letters.len() as i64)
    }

    async fn list_dead_letters(&self, limit: i64) -> Result<Vec<DeadLetter>> {
        let state = self.state.lock().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(state.dead_letters.iter().rev().take(limit).cloned().collect())
    }
}
