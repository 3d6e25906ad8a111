use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::MoneyValue;

// ============================================================================
// Restaurant Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestaurantState {
    Open,
    Closed,
}

impl RestaurantState {
    /// Effective state at a given hour of the day.
    ///
    /// A stored `Open` only holds inside `[opening_hour, closing_hour]`;
    /// outside that window the restaurant reads as closed. A stored
    /// `Closed` is never reopened by the clock.
    pub fn at_hour(self, opening_hour: i32, closing_hour: i32, hour: u32) -> RestaurantState {
        let hour = hour as i32;
        match self {
            RestaurantState::Open if hour < opening_hour || hour > closing_hour => {
                RestaurantState::Closed
            }
            state => state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubscriptionType {
    Free,
    Basic,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Unsigned,
    Active,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodType {
    Starter,
    MainCourse,
    Pizza,
    Dessert,
    Beverage,
    Side,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodStatus {
    Available,
    OutOfStock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Menu {
    pub menu_id: Uuid,
    pub name: String,
    pub name_eng: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub variant_id: Uuid,
    pub name: String,
    pub name_eng: String,
    pub price: MoneyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddOn {
    pub add_on_id: Uuid,
    pub name: String,
    pub name_eng: String,
    pub description: String,
    pub price: MoneyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub food_id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub description: String,
    pub unit_price: MoneyValue,
    /// Price before the last change; equals `unit_price` until one happens
    pub old_unit_price: MoneyValue,
    pub is_veg: bool,
    pub is_non_veg: bool,
    pub is_gluten_free: bool,
    pub image_url: String,
    pub food_type: FoodType,
    pub status: FoodStatus,
    pub variants: Vec<Variant>,
    pub add_ons: Vec<AddOn>,
}

impl Food {
    pub fn is_available(&self) -> bool {
        self.status == FoodStatus::Available
    }

    pub fn variant(&self, variant_id: Uuid) -> Option<&Variant> {
        self.variants.iter().find(|v| v.variant_id == variant_id)
    }

    pub fn add_on(&self, add_on_id: Uuid) -> Option<&AddOn> {
        self.add_ons.iter().find(|a| a.add_on_id == add_on_id)
    }
}

// ============================================================================
// Pricing Policy
// ============================================================================
//
// minimum_charge   - smallest order subtotal the restaurant accepts
// fixed_charge     - delivery fee
// additional_price - surcharge on top of the delivery fee
// maximum_charge   - cap on the whole delivery charge
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub minimum_charge: Decimal,
    pub maximum_charge: Option<Decimal>,
    pub fixed_charge: Decimal,
    pub additional_price: Option<Decimal>,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            minimum_charge: Decimal::ZERO,
            maximum_charge: None,
            fixed_charge: Decimal::ZERO,
            additional_price: None,
        }
    }
}

impl PricingPolicy {
    pub fn delivery_charge(&self) -> Decimal {
        let charge = self.fixed_charge + self.additional_price.unwrap_or(Decimal::ZERO);
        match self.maximum_charge {
            Some(cap) => charge.min(cap),
            None => charge,
        }
    }

    pub fn minimum_charge_reached(&self, subtotal: &MoneyValue) -> bool {
        subtotal.value() >= self.minimum_charge
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub status: ContractStatus,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl Contract {
    pub fn unsigned() -> Self {
        Self {
            status: ContractStatus::Unsigned,
            expiration_date: None,
        }
    }

    /// Active contracts past their expiration date read as expired
    pub fn status_at(&self, now: DateTime<Utc>) -> ContractStatus {
        match (self.status, self.expiration_date) {
            (ContractStatus::Active, Some(expires)) if expires <= now => ContractStatus::Expired,
            (status, _) => status,
        }
    }
}

/// Running review statistics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rating {
    pub total_stars: i64,
    pub count: i32,
}

impl Rating {
    pub fn record(&mut self, star_rate: i32) {
        self.total_stars += i64::from(star_rate);
        self.count += 1;
    }

    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_stars as f64 / f64::from(self.count)
    }
}
