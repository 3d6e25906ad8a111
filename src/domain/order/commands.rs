use uuid::Uuid;

use crate::domain::restaurant::PricingPolicy;
use super::value_objects::{OrderDetail, OrderItem, OrderType, PaymentType};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum OrderCommand {
    /// Pricing policy is the restaurant's policy at placement time
    PlaceOrder {
        customer_id: Uuid,
        restaurant_id: Uuid,
        basket_id: Option<Uuid>,
        items: Vec<OrderItem>,
        detail: OrderDetail,
        order_type: OrderType,
        payment_type: PaymentType,
        pricing_policy: PricingPolicy,
    },
    Confirm,
    StartPreparing,
    Dispatch,
    Deliver,
    Cancel {
        reason: Option<String>,
    },
    Reject {
        reason: Option<String>,
    },
}
