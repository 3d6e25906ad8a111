use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::PhoneNumber;
use crate::event_sourcing::core::DomainEvent;
use super::value_objects::{FoodStatus, FoodType, Menu, PricingPolicy, SubscriptionType};

// ============================================================================
// Restaurant Events - Domain Events for Restaurant Aggregate
// ============================================================================
//
// Prices travel as plain decimals; the aggregate rebuilds MoneyValue from
// them so the currency is always derived from the amount.
//
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RestaurantEvent {
    Registered(RestaurantRegistered),
    HoursUpdated(HoursUpdated),
    CategoryChanged(CategoryChanged),
    Opened(RestaurantOpened),
    Closed(RestaurantClosed),
    SubscriptionChanged(SubscriptionChanged),
    ContractSigned(ContractSigned),
    PricingPolicySet(PricingPolicySet),
    MenuAdded(MenuAdded),
    FoodAdded(FoodAdded),
    VariantAdded(VariantAdded),
    AddOnAdded(AddOnAdded),
    FoodPriceChanged(FoodPriceChanged),
    FoodStatusChanged(FoodStatusChanged),
    Reviewed(RestaurantReviewed),
}

impl DomainEvent for RestaurantEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RestaurantEvent::Registered(_) => "RestaurantRegistered",
            RestaurantEvent::HoursUpdated(_) => "RestaurantHoursUpdated",
            RestaurantEvent::CategoryChanged(_) => "RestaurantCategoryChanged",
            RestaurantEvent::Opened(_) => "RestaurantOpened",
            RestaurantEvent::Closed(_) => "RestaurantClosed",
            RestaurantEvent::SubscriptionChanged(_) => "RestaurantSubscriptionChanged",
            RestaurantEvent::ContractSigned(_) => "RestaurantContractSigned",
            RestaurantEvent::PricingPolicySet(_) => "PricingPolicySet",
            RestaurantEvent::MenuAdded(_) => "MenuAdded",
            RestaurantEvent::FoodAdded(_) => "FoodAdded",
            RestaurantEvent::VariantAdded(_) => "VariantAdded",
            RestaurantEvent::AddOnAdded(_) => "AddOnAdded",
            RestaurantEvent::FoodPriceChanged(_) => "FoodPriceChanged",
            RestaurantEvent::FoodStatusChanged(_) => "FoodStatusChanged",
            RestaurantEvent::Reviewed(_) => "RestaurantReviewed",
        }
    }
}

// ============================================================================
// Individual Event Types
// ============================================================================

/// Restaurant Registered - Initial event in restaurant lifecycle
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RestaurantRegistered {
    pub name: String,
    pub description: String,
    pub phone_number: PhoneNumber,
    pub locality_id: Uuid,
    pub category_id: Uuid,
    pub opening_hour: i32,
    pub closing_hour: i32,
    pub subscription: SubscriptionType,
    pub image_url: String,
    pub manager_id: Uuid,
    pub registered_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HoursUpdated {
    pub opening_hour: i32,
    pub closing_hour: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CategoryChanged {
    pub category_id: Uuid,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RestaurantOpened {
    pub opened_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RestaurantClosed {
    pub closed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SubscriptionChanged {
    pub subscription: SubscriptionType,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ContractSigned {
    pub expiration_date: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PricingPolicySet {
    pub policy: PricingPolicy,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct MenuAdded {
    pub menu: Menu,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FoodAdded {
    pub food_id: Uuid,
    pub menu_id: Uuid,
    pub name: String,
    pub description: String,
    pub unit_price: Decimal,
    pub is_veg: bool,
    pub is_non_veg: bool,
    pub is_gluten_free: bool,
    pub image_url: String,
    pub food_type: FoodType,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct VariantAdded {
    pub food_id: Uuid,
    pub variant_id: Uuid,
    pub name: String,
    pub name_eng: String,
    pub price: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AddOnAdded {
    pub food_id: Uuid,
    pub add_on_id: Uuid,
    pub name: String,
    pub name_eng: String,
    pub description: String,
    pub price: Decimal,
}

/// Food Price Changed - previous price kept as the food's old unit price
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FoodPriceChanged {
    pub food_id: Uuid,
    pub old_price: Decimal,
    pub new_price: Decimal,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FoodStatusChanged {
    pub food_id: Uuid,
    pub status: FoodStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RestaurantReviewed {
    pub customer_id: Uuid,
    pub star_rate: i32,
    pub comment: Option<String>,
}
