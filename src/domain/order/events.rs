use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::event_sourcing::core::DomainEvent;
use super::value_objects::{OrderDetail, OrderItem, OrderType, PaymentType};

// ============================================================================
// Order Events - Domain Events for Order Aggregate
// ============================================================================

/// Order Event - Union type for all order events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    Placed(OrderPlaced),
    Confirmed(OrderConfirmed),
    PreparationStarted(OrderPreparationStarted),
    Dispatched(OrderDispatched),
    Delivered(OrderDelivered),
    Cancelled(OrderCancelled),
    Rejected(OrderRejected),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::Placed(_) => "OrderPlaced",
            OrderEvent::Confirmed(_) => "OrderConfirmed",
            OrderEvent::PreparationStarted(_) => "OrderPreparationStarted",
            OrderEvent::Dispatched(_) => "OrderDispatched",
            OrderEvent::Delivered(_) => "OrderDelivered",
            OrderEvent::Cancelled(_) => "OrderCancelled",
            OrderEvent::Rejected(_) => "OrderRejected",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Order Placed - Initial event in order lifecycle, totals computed at placement
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPlaced {
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub basket_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub detail: OrderDetail,
    pub order_type: OrderType,
    pub payment_type: PaymentType,
    pub total_amount: Decimal,
    pub delivery_charge: Decimal,
    pub payable_amount: Decimal,
    pub placed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderConfirmed {
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderPreparationStarted {
    pub started_at: DateTime<Utc>,
}

/// Order Dispatched - handed to the rider
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderDispatched {
    pub dispatched_at: DateTime<Utc>,
}

/// Order Delivered - delivered, or collected for take-away orders
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderDelivered {
    pub delivered_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderCancelled {
    pub reason: Option<String>,
    pub cancelled_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OrderRejected {
    pub reason: Option<String>,
    pub rejected_at: DateTime<Utc>,
}
