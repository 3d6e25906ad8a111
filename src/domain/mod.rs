// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
// - Command handler
//
// `shared` is the kernel every aggregate builds on; `ordering` coordinates
// restaurant, basket and order for the checkout flow.
//
// ============================================================================

pub mod shared;
pub mod restaurant;
pub mod basket;
pub mod order;
pub mod ordering;

pub use ordering::{CheckoutRequest, OrderingService};
