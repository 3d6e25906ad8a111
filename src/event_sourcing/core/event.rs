use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use anyhow::Result;

// ============================================================================
// Event Envelope
// ============================================================================
//
// Wraps a domain event with the metadata the store needs: identity,
// position in the aggregate stream, type name, and correlation/causation
// ids for following a checkout across aggregates.
//
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventEnvelope<E> {
    // Event Identity
    pub event_id: Uuid,
    pub aggregate_id: Uuid,
    pub sequence_number: i64,

    // Event Type Information
    pub event_type: String,
    pub event_version: i32,

    // Event Payload
    pub event_data: E,

    // Causation & Correlation
    pub causation_id: Option<Uuid>,
    pub correlation_id: Uuid,

    pub timestamp: DateTime<Utc>,
}

impl<E: DomainEvent> EventEnvelope<E> {
    pub fn new(
        aggregate_id: Uuid,
        sequence_number: i64,
        event_data: E,
        correlation_id: Uuid,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            aggregate_id,
            sequence_number,
            event_type: event_data.event_type().to_string(),
            event_version: event_data.event_version(),
            event_data,
            causation_id: None,
            correlation_id,
            timestamp: Utc::now(),
        }
    }

    pub fn with_causation(mut self, causation_id: Uuid) -> Self {
        self.causation_id = Some(causation_id);
        self
    }
}

// ============================================================================
// Domain Event Trait
// ============================================================================

pub trait DomainEvent: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Stable name stored next to the payload (e.g. "OrderPlaced")
    fn event_type(&self) -> &'static str;

    fn event_version(&self) -> i32 {
        1
    }
}

pub fn serialize_event<E: Serialize>(event: &E) -> Result<String> {
    Ok(serde_json::to_string(event)?)
}

pub fn deserialize_event<E: DeserializeOwned>(json: &str) -> Result<E> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
    enum KitchenEvent {
        TicketPrinted { table: u32 },
    }

    impl DomainEvent for KitchenEvent {
        fn event_type(&self) -> &'static str {
            match self {
                KitchenEvent::TicketPrinted { .. } => "TicketPrinted",
            }
        }

        fn event_version(&self) -> i32 {
            2
        }
    }

    #[test]
    fn test_envelope_takes_type_and_version_from_event() {
        let basket_id = Uuid::new_v4();
        let checkout = Uuid::new_v4();

        let envelope = EventEnvelope::new(basket_id, 4, KitchenEvent::TicketPrinted { table: 7 }, checkout);

        assert_eq!(envelope.event_type, "TicketPrinted");
        assert_eq!(envelope.event_version, 2);
        assert_eq!(envelope.sequence_number, 4);
        assert_eq!(envelope.correlation_id, checkout);
        assert!(envelope.causation_id.is_none());
        assert_eq!(envelope.event_id.get_version_num(), 7);
    }

    #[test]
    fn test_causation_links_events_across_aggregates() {
        let checked_out = EventEnvelope::new(Uuid::new_v4(), 3, KitchenEvent::TicketPrinted { table: 1 }, Uuid::new_v4());
        let placed = EventEnvelope::new(Uuid::new_v4(), 1, KitchenEvent::TicketPrinted { table: 1 }, checked_out.correlation_id)
            .with_causation(checked_out.event_id);

        assert_eq!(placed.causation_id, Some(checked_out.event_id));
        assert_eq!(placed.correlation_id, checked_out.correlation_id);
    }

    #[test]
    fn test_payload_json() {
        let json = serialize_event(&KitchenEvent::TicketPrinted { table: 12 }).unwrap();
        assert_eq!(json, r#"{"TicketPrinted":{"table":12}}"#);

        let back: KitchenEvent = deserialize_event(&json).unwrap();
        assert_eq!(back, KitchenEvent::TicketPrinted { table: 12 });
        assert!(deserialize_event::<KitchenEvent>("{\"Unknown\":{}}").is_err());
    }
}
