// ============================================================================
// Shared Kernel
// ============================================================================
//
// Value objects and rule primitives used by every aggregate:
// - MoneyValue (currency-tagged amounts)
// - Business rules (ConditionMustBeTrueRule, check_rule/check_rules)
// - Phone number and delivery location
//
// ============================================================================

pub mod money;
pub mod rules;
pub mod value_objects;

pub use money::*;
pub use rules::*;
pub use value_objects::*;
