use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::basket::BasketItem;
use crate::domain::shared::{Location, MoneyValue, PhoneNumber};

// ============================================================================
// Order Value Objects
// ============================================================================

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderItem {
    pub food_id: Uuid,
    pub food_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Option<Decimal>,
}

impl OrderItem {
    pub fn from_basket_item(item: &BasketItem) -> Self {
        Self {
            food_id: item.food_id,
            food_name: item.display_name(),
            quantity: item.quantity,
            unit_price: item.unit_price_with_add_ons().value(),
            discount: None,
        }
    }

    pub fn unit_price(&self) -> MoneyValue {
        MoneyValue::of(self.unit_price)
    }

    /// Unit price times quantity, before discount
    pub fn total(&self) -> MoneyValue {
        self.unit_price() * self.quantity
    }

    pub fn discount(&self) -> MoneyValue {
        MoneyValue::of(self.discount.unwrap_or(Decimal::ZERO))
    }

    pub fn net_total(&self) -> MoneyValue {
        MoneyValue::of(self.total().value() - self.discount.unwrap_or(Decimal::ZERO))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderDetail {
    pub customer_name: String,
    pub contact_number: PhoneNumber,
    pub address: String,
    pub delivery_location: Option<Location>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderState {
    Placed,
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    Cancelled,
    Rejected,
}

impl OrderState {
    pub fn can_transition_to(&self, next: OrderState) -> bool {
        use OrderState::*;

        matches!(
            (self, next),
            (Placed, Confirmed)
                | (Placed, Cancelled)
                | (Placed, Rejected)
                | (Confirmed, Preparing)
                | (Confirmed, Cancelled)
                | (Preparing, OutForDelivery)
                | (Preparing, Delivered)
                | (OutForDelivery, Delivered)
        )
    }

    pub fn is_final(&self) -> bool {
        matches!(self, OrderState::Delivered | OrderState::Cancelled | OrderState::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Placed => "placed",
            OrderState::Confirmed => "confirmed",
            OrderState::Preparing => "preparing",
            OrderState::OutForDelivery => "out_for_delivery",
            OrderState::Delivered => "delivered",
            OrderState::Cancelled => "cancelled",
            OrderState::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Delivery,
    TakeAway,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    CashOnDelivery,
    Card,
    Online,
}

// ============================================================================
// Unit Tests
// ============================================================================
