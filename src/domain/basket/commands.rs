use uuid::Uuid;

use crate::domain::shared::Location;
use super::value_objects::BasketItem;

// ============================================================================
// Basket Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum BasketCommand {
    CreateBasket {
        customer_id: Uuid,
    },
    AddItem {
        restaurant_id: Uuid,
        item: BasketItem,
    },
    RemoveItem {
        item_id: Uuid,
    },
    /// Zero removes the line
    ChangeQuantity {
        item_id: Uuid,
        quantity: i32,
    },
    ProvideDeliveryAddress {
        address: String,
        location: Location,
    },
    Checkout,
    Refill {
        restaurant_id: Uuid,
        items: Vec<BasketItem>,
    },
}
