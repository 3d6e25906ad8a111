use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;
use anyhow::{Result, bail};

use crate::event_sourcing::core::{Aggregate, EventEnvelope};
use crate::event_sourcing::store::{load_aggregate, EventRepository};

// ============================================================================
// Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// Domain modules wrap this with their own handler type so routing between
// creation and regular commands stays next to the aggregate.
//
// ============================================================================

/// Aggregate state after a command, plus the envelopes that were stored
pub struct Executed<A: Aggregate> {
    pub aggregate: A,
    pub envelopes: Vec<EventEnvelope<A::Event>>,
}

impl<A> std::fmt::Debug for Executed<A>
where
    A: Aggregate + std::fmt::Debug,
    A::Event: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executed")
            .field("aggregate", &self.aggregate)
            .field("envelopes", &self.envelopes)
            .finish()
    }
}

impl<A: Aggregate> Executed<A> {
    /// Id of the last stored event, used as causation for follow-up commands
    pub fn last_event_id(&self) -> Option<Uuid> {
        self.envelopes.last().map(|e| e.event_id)
    }
}

pub struct CommandHandler<A: Aggregate> {
    event_store: Arc<dyn EventRepository<A::Event>>,
    _aggregate: PhantomData<fn() -> A>,
}

impl<A: Aggregate> Clone for CommandHandler<A> {
    fn clone(&self) -> Self {
        Self {
            event_store: self.event_store.clone(),
            _aggregate: PhantomData,
        }
    }
}

impl<A: Aggregate> CommandHandler<A> {
    pub fn new(event_store: Arc<dyn EventRepository<A::Event>>) -> Self {
        Self {
            event_store,
            _aggregate: PhantomData,
        }
    }

    pub async fn load(&self, aggregate_id: Uuid) -> Result<A> {
        load_aggregate::<A, _>(self.event_store.as_ref(), aggregate_id).await
    }

    pub async fn exists(&self, aggregate_id: Uuid) -> Result<bool> {
        self.event_store.aggregate_exists(aggregate_id).await
    }

    /// Start a new stream from a creation command
    pub async fn create(
        &self,
        aggregate_id: Uuid,
        command: &A::Command,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
    ) -> Result<Executed<A>> {
        if self.event_store.aggregate_exists(aggregate_id).await? {
            bail!("{} already exists: {}", A::AGGREGATE_TYPE, aggregate_id);
        }

        let (aggregate, event) = A::create(aggregate_id, command)?;

        let envelopes = vec![Self::envelope(aggregate_id, 1, event, correlation_id, causation_id)];

        self.event_store
            .append_events(aggregate_id, 0, envelopes.clone())
            .await?;

        tracing::debug!(
            aggregate_id = %aggregate_id,
            aggregate_type = A::AGGREGATE_TYPE,
            "Aggregate created"
        );

        Ok(Executed { aggregate, envelopes })
    }

    /// Load, run the command, persist what it emitted
    pub async fn execute(
        &self,
        aggregate_id: Uuid,
        command: &A::Command,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
    ) -> Result<Executed<A>> {
        let mut aggregate = self.load(aggregate_id).await?;
        let expected_version = aggregate.version();

        let events = aggregate.execute(command)?;

        if events.is_empty() {
            return Ok(Executed { aggregate, envelopes: Vec::new() });
        }

        let envelopes: Vec<EventEnvelope<A::Event>> = events
            .into_iter()
            .zip(expected_version + 1..)
            .map(|(event, seq)| Self::envelope(aggregate_id, seq, event, correlation_id, causation_id))
            .collect();

        let new_version = self
            .event_store
            .append_events(aggregate_id, expected_version, envelopes.clone())
            .await?;

        tracing::debug!(
            aggregate_id = %aggregate_id,
            aggregate_type = A::AGGREGATE_TYPE,
            new_version = new_version,
            "Command executed"
        );

        Ok(Executed { aggregate, envelopes })
    }

    fn envelope(
        aggregate_id: Uuid,
        sequence_number: i64,
        event: A::Event,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
    ) -> EventEnvelope<A::Event> {
        let envelope = EventEnvelope::new(aggregate_id, sequence_number, event, correlation_id);
        match causation_id {
            Some(cause) => envelope.with_causation(cause),
            None => envelope,
        }
    }
}
