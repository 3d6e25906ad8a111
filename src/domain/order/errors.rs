use crate::domain::shared::BusinessRuleViolation;
use super::value_objects::OrderState;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error(transparent)]
    RuleViolation(#[from] BusinessRuleViolation),

    #[error("Order cannot move from {from:?} to {to:?}")]
    InvalidStateTransition { from: OrderState, to: OrderState },

    #[error("Take-away orders are collected, not dispatched")]
    NotADeliveryOrder,

    #[error("Order is already placed")]
    AlreadyPlaced,

    #[error("Order must be placed first")]
    NotPlaced,
}
