use uuid::Uuid;

use crate::domain::shared::BusinessRuleViolation;

// ============================================================================
// Basket Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum BasketError {
    #[error(transparent)]
    RuleViolation(#[from] BusinessRuleViolation),

    #[error("Basket is already checked out")]
    AlreadyCheckedOut,

    #[error("Basket already exists")]
    AlreadyCreated,

    #[error("Basket must be created first")]
    NotCreated,

    #[error("Basket item not found: {0}")]
    ItemNotFound(Uuid),
}
