use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::value_objects::{FoodStatus, FoodType, PricingPolicy, SubscriptionType};

// ============================================================================
// Restaurant Commands - Represent user intent
// ============================================================================

#[derive(Debug, Clone)]
pub enum RestaurantCommand {
    RegisterRestaurant {
        name: String,
        description: String,
        phone_number: String,
        locality_id: Uuid,
        category_id: Uuid,
        opening_hour: i32,
        closing_hour: i32,
        subscription: SubscriptionType,
        image_url: String,
        manager_id: Uuid,
    },
    UpdateHours {
        opening_hour: i32,
        closing_hour: i32,
    },
    UpdateCategory {
        category_id: Uuid,
    },
    Open,
    Close,
    ChangeSubscription {
        subscription: SubscriptionType,
    },
    SignContract {
        expiration_date: DateTime<Utc>,
    },
    SetPricingPolicy {
        policy: PricingPolicy,
    },
    AddMenu {
        menu_id: Uuid,
        name: String,
        name_eng: String,
        image_url: String,
    },
    AddFood {
        food_id: Uuid,
        menu_id: Uuid,
        name: String,
        description: String,
        unit_price: Decimal,
        is_veg: bool,
        is_non_veg: bool,
        is_gluten_free: bool,
        image_url: String,
        food_type: FoodType,
    },
    AddVariant {
        food_id: Uuid,
        variant_id: Uuid,
        name: String,
        name_eng: String,
        price: Decimal,
    },
    AddAddOn {
        food_id: Uuid,
        add_on_id: Uuid,
        name: String,
        name_eng: String,
        description: String,
        price: Decimal,
    },
    ChangeFoodPrice {
        food_id: Uuid,
        new_price: Decimal,
    },
    ChangeFoodStatus {
        food_id: Uuid,
        status: FoodStatus,
    },
    Review {
        customer_id: Uuid,
        star_rate: i32,
        comment: Option<String>,
    },
}
