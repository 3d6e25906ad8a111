// ============================================================================
// Order Domain - Business Logic for Order Aggregate
// ============================================================================
//
// - Value objects (OrderItem, OrderDetail, OrderState, OrderType, PaymentType)
// - Events (OrderPlaced, OrderConfirmed, etc.)
// - Commands (PlaceOrder, Confirm, etc.)
// - Errors (OrderError enum)
// - Aggregate (OrderAggregate with totals and state machine)
// - Command Handler (OrderCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

// Re-export for convenience
pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
