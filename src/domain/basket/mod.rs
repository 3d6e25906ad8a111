// ============================================================================
// Basket Domain - Business Logic for Basket Aggregate
// ============================================================================
//
// One basket per customer session, one restaurant per basket. Checkout
// freezes the basket and hands its lines to order placement.
//
// ============================================================================

pub mod value_objects;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
