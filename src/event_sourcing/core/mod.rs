// ============================================================================
// Event Sourcing Core - Generic Abstractions
// ============================================================================
//
// No domain-specific code here (no Order, Restaurant, Basket).
//
// ============================================================================

pub mod aggregate;
pub mod event;

pub use aggregate::Aggregate;
pub use event::{DomainEvent, EventEnvelope, serialize_event, deserialize_event};
