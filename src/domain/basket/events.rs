use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::Location;
use crate::event_sourcing::core::DomainEvent;
use super::value_objects::BasketItem;

// ============================================================================
// Basket Events - Domain Events for Basket Aggregate
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BasketEvent {
    Created(BasketCreated),
    ItemAdded(ItemAdded),
    ItemRemoved(ItemRemoved),
    QuantityChanged(QuantityChanged),
    DeliveryAddressProvided(DeliveryAddressProvided),
    CheckedOut(BasketCheckedOut),
    Refilled(BasketRefilled),
}

impl DomainEvent for BasketEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BasketEvent::Created(_) => "BasketCreated",
            BasketEvent::ItemAdded(_) => "BasketItemAdded",
            BasketEvent::ItemRemoved(_) => "BasketItemRemoved",
            BasketEvent::QuantityChanged(_) => "BasketQuantityChanged",
            BasketEvent::DeliveryAddressProvided(_) => "DeliveryAddressProvided",
            BasketEvent::CheckedOut(_) => "BasketCheckedOut",
            BasketEvent::Refilled(_) => "BasketRefilled",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BasketCreated {
    pub customer_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ItemAdded {
    pub restaurant_id: Uuid,
    pub item: BasketItem,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ItemRemoved {
    pub item_id: Uuid,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QuantityChanged {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DeliveryAddressProvided {
    pub address: String,
    pub location: Location,
}

/// Basket Checked Out - snapshot of the lines the order is placed from
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BasketCheckedOut {
    pub restaurant_id: Uuid,
    pub items: Vec<BasketItem>,
    pub subtotal: Decimal,
    pub checked_out_at: DateTime<Utc>,
}

/// Basket Refilled - contents replaced with the lines of a previous order
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct BasketRefilled {
    pub restaurant_id: Uuid,
    pub items: Vec<BasketItem>,
}
