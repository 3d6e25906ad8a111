// ============================================================================
// Event Sourcing Store - Generic Persistence Layer
// ============================================================================
//
// Event streams and the transactional outbox, each with a PostgreSQL and an
// in-memory implementation. Works with any aggregate/event type.
//
// ============================================================================

pub mod event_store;
pub mod in_memory;
pub mod outbox;

pub use event_store::{load_aggregate, EventRepository, PgEventStore};
pub use in_memory::InMemoryEventStore;
pub use outbox::{DeadLetter, InMemoryOutboxStore, OutboxMessage, OutboxStore, PgOutboxStore};
