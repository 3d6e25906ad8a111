// ============================================================================
// Restaurant Domain - Business Logic for Restaurant Aggregate
// ============================================================================
//
// - Value objects (state, subscription, contract, food, pricing policy)
// - Rules (OpeningAndClosingHoursAreValid)
// - Events, commands, errors
// - Aggregate (RestaurantAggregate with menus and foods)
// - Command Handler (RestaurantCommandHandler)
//
// ============================================================================

pub mod value_objects;
pub mod rules;
pub mod events;
pub mod commands;
pub mod errors;
pub mod aggregate;
pub mod command_handler;

pub use value_objects::*;
pub use rules::*;
pub use events::*;
pub use commands::*;
pub use errors::*;
pub use aggregate::*;
pub use command_handler::*;
