// ============================================================================
// Event Sourcing Infrastructure
// ============================================================================
//
// Generic, reusable event sourcing infrastructure.
// Domain-specific code is in src/domain/
//
// ============================================================================

pub mod core;
pub mod store;
pub mod command_handler;

pub use self::core::*;
pub use self::store::*;
pub use self::command_handler::{CommandHandler, Executed};
