use uuid::Uuid;
use anyhow::Result;
use super::event::{DomainEvent, EventEnvelope};

// ============================================================================
// Aggregate Root Pattern
// ============================================================================
//
// 1. State is derived from events (never stored directly)
// 2. Commands are validated against current state before emitting events
// 3. Creation commands are validated without any prior state
//
// ============================================================================

pub trait Aggregate: Sized + Send + Sync {
    type Event: DomainEvent;
    type Command: Send + Sync;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Name stored with every event and outbox row ("Order", "Restaurant", ...)
    const AGGREGATE_TYPE: &'static str;

    /// Create new aggregate from its first event
    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error>;

    /// Apply subsequent events to update state
    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error>;

    /// Validate a command that brings a new aggregate into existence.
    /// Creation always yields exactly one event.
    fn handle_creation(command: &Self::Command) -> Result<Self::Event, Self::Error>;

    /// Handle command against current state and emit events
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    fn aggregate_id(&self) -> Uuid;

    fn version(&self) -> i64;

    fn set_version(&mut self, version: i64);

    /// Run a creation command and apply what it emitted
    fn create(
        aggregate_id: Uuid,
        command: &Self::Command,
    ) -> Result<(Self, Self::Event), Self::Error> {
        let event = Self::handle_creation(command)?;
        let mut aggregate = Self::apply_first_event(aggregate_id, &event)?;
        aggregate.set_version(1);
        Ok((aggregate, event))
    }

    /// Run a command and apply what it emitted
    fn execute(&mut self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = self.handle_command(command)?;
        for event in &events {
            self.apply_event(event)?;
        }
        self.set_version(self.version() + events.len() as i64);
        Ok(events)
    }

    /// Rebuild state from the stored event history
    fn load_from_events(events: Vec<EventEnvelope<Self::Event>>) -> Result<Self> {
        let Some(first) = events.first() else {
            anyhow::bail!("No events to load");
        };

        let mut aggregate = Self::apply_first_event(first.aggregate_id, &first.event_data)
            .map_err(|e| anyhow::anyhow!("Failed to apply first event: {}", e))?;
        aggregate.set_version(first.sequence_number);

        for envelope in events.iter().skip(1) {
            aggregate
                .apply_event(&envelope.event_data)
                .map_err(|e| anyhow::anyhow!("Failed to apply event: {}", e))?;
            aggregate.set_version(envelope.sequence_number);
        }

        Ok(aggregate)
    }
}
