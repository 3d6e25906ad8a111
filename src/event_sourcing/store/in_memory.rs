use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;
use anyhow::{Result, bail};

use crate::event_sourcing::core::{serialize_event, DomainEvent, EventEnvelope};
use super::event_store::EventRepository;
use super::outbox::{InMemoryOutboxStore, OutboxMessage};

// ============================================================================
// In-memory Event Store
// ============================================================================
//
// Same contract as the PostgreSQL store (version check, outbox rows) kept
// in process memory. Used by tests and by local runs without a database.
//
// ============================================================================

pub struct InMemoryEventStore<E: DomainEvent> {
    streams: Mutex<HashMap<Uuid, Vec<EventEnvelope<E>>>>,
    outbox: Arc<InMemoryOutboxStore>,
    aggregate_type_name: String,
}

impl<E: DomainEvent> InMemoryEventStore<E> {
    pub fn new(aggregate_type_name: &str, outbox: Arc<InMemoryOutboxStore>) -> Self {
        Self {
            streams: Mutex::new(HashMap::new()),
            outbox,
            aggregate_type_name: aggregate_type_name.to_string(),
        }
    }

    /// Store with a private outbox nobody drains
    pub fn standalone(aggregate_type_name: &str) -> Self {
        Self::new(aggregate_type_name, Arc::new(InMemoryOutboxStore::new()))
    }
}

#[async_trait]
impl<E: DomainEvent> EventRepository<E> for InMemoryEventStore<E> {
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64> {
        if events.is_empty() {
            bail!("Cannot append empty event list");
        }

        let mut streams = self.streams.lock().await;
        let stream = streams.entry(aggregate_id).or_default();
        let current_version = stream.len() as i64;

        if current_version != expected_version {
            bail!(
                "Concurrency conflict: expected version {}, but current is {}",
                expected_version,
                current_version
            );
        }

        // Serialise everything up front so a bad payload leaves the stream untouched
        let mut outbox_rows = Vec::with_capacity(events.len());
        for envelope in &events {
            outbox_rows.push(OutboxMessage {
                id: Uuid::now_v7(),
                aggregate_id,
                aggregate_type: self.aggregate_type_name.clone(),
                event_id: envelope.event_id,
                event_type: envelope.event_type.clone(),
                payload: serialize_event(&envelope.event_data)?,
                created_at: Utc::now(),
                attempts: 0,
            });
        }

        let mut new_version = expected_version;
        for mut envelope in events {
            new_version += 1;
            envelope.sequence_number = new_version;
            stream.push(envelope);
        }
        drop(streams);

        for row in outbox_rows {
            self.outbox.push(row).await;
        }

        tracing::debug!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version = new_version,
            "Appended events to in-memory store"
        );

        Ok(new_version)
    }

    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>> {
        let streams = self.streams.lock().await;
        Ok(streams.get(&aggregate_id).cloned().unwrap_or_default())
    }

    async fn get_current_version(&self, aggregate_id: Uuid) -> Result<i64> {
        let streams = self.streams.lock().await;
        Ok(streams.get(&aggregate_id).map(|s| s.len() as i64).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_sourcing::store::OutboxStore;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Clone, Debug)]
    struct Pinged {
        n: u32,
    }

    impl DomainEvent for Pinged {
        fn event_type(&self) -> &'static str {
            "Pinged"
        }
    }

    #[tokio::test]
    async fn test_append_and_load() {
        let outbox = Arc::new(InMemoryOutboxStore::new());
        let store = InMemoryEventStore::<Pinged>::new("Ping", outbox.clone());
        let id = Uuid::new_v4();
        let correlation = Uuid::new_v4();

        let version = store
            .append_events(
                id,
                0,
                vec![
                    EventEnvelope::new(id, 1, Pinged { n: 1 }, correlation),
                    EventEnvelope::new(id, 2, Pinged { n: 2 }, correlation),
                ],
            )
            .await
            .unwrap();

        assert_eq!(version, 2);
        assert!(store.aggregate_exists(id).await.unwrap());

        let events = store.load_events(id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].sequence_number, 2);
        assert_eq!(events[1].event_data.n, 2);

        let pending = outbox.fetch_pending(10).await.unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].aggregate_type, "Ping");
        assert_eq!(pending[0].event_id, events[0].event_id);
    }

    #[tokio::test]
    async fn test_version_conflict() {
        let store = InMemoryEventStore::<Pinged>::standalone("Ping");
        let id = Uuid::new_v4();

        store
            .append_events(id, 0, vec![EventEnvelope::new(id, 1, Pinged { n: 1 }, id)])
            .await
            .unwrap();

        let stale = store
            .append_events(id, 0, vec![EventEnvelope::new(id, 1, Pinged { n: 9 }, id)])
            .await;

        assert!(stale.is_err());
        assert_eq!(store.get_current_version(id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unknown_aggregate() {
        let store = InMemoryEventStore::<Pinged>::standalone("Ping");
        let id = Uuid::new_v4();

        assert!(!store.aggregate_exists(id).await.unwrap());
        assert!(store.load_events(id).await.unwrap().is_empty());
    }
}
