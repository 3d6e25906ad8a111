use uuid::Uuid;

use crate::domain::shared::{BusinessRuleViolation, ValueObjectError};
use super::value_objects::ContractStatus;

// ============================================================================
// Restaurant Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RestaurantError {
    #[error(transparent)]
    RuleViolation(#[from] BusinessRuleViolation),

    #[error(transparent)]
    InvalidValue(#[from] ValueObjectError),

    #[error("Restaurant is already registered")]
    AlreadyRegistered,

    #[error("Restaurant must be registered first")]
    NotRegistered,

    #[error("Restaurant is already open")]
    AlreadyOpen,

    #[error("Restaurant is already closed")]
    AlreadyClosed,

    #[error("An active contract is required, contract is {0:?}")]
    ContractNotActive(ContractStatus),

    #[error("Menu not found: {0}")]
    MenuNotFound(Uuid),

    #[error("Food not found: {0}")]
    FoodNotFound(Uuid),
}
