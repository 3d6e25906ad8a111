use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::shared::{Location, MoneyValue};

// ============================================================================
// Basket Value Objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasketStatus {
    Active,
    CheckedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketAddOn {
    pub add_on_id: Uuid,
    pub name: String,
    pub price: Decimal,
}

/// One line of the basket, priced when the food was picked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasketItem {
    pub item_id: Uuid,
    pub food_id: Uuid,
    pub food_name: String,
    pub variant_id: Option<Uuid>,
    pub variant_name: Option<String>,
    pub add_ons: Vec<BasketAddOn>,
    /// Food or variant price, add-ons excluded
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl BasketItem {
    pub fn unit_price_with_add_ons(&self) -> MoneyValue {
        let add_ons: Decimal = self.add_ons.iter().map(|a| a.price).sum();
        MoneyValue::of(self.unit_price + add_ons)
    }

    pub fn line_total(&self) -> MoneyValue {
        self.unit_price_with_add_ons() * self.quantity
    }

    /// Same food, same variant and same add-ons
    pub fn same_selection(&self, other: &BasketItem) -> bool {
        let mut mine: Vec<Uuid> = self.add_ons.iter().map(|a| a.add_on_id).collect();
        let mut theirs: Vec<Uuid> = other.add_ons.iter().map(|a| a.add_on_id).collect();
        mine.sort();
        theirs.sort();

        self.food_id == other.food_id && self.variant_id == other.variant_id && mine == theirs
    }

    /// Name shown on the order line ("Margherita (Maxi)")
    pub fn display_name(&self) -> String {
        match &self.variant_name {
            Some(variant) => format!("{} ({})", self.food_name, variant),
            None => self.food_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub address: String,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(add_ons: Vec<BasketAddOn>) -> BasketItem {
        BasketItem {
            item_id: Uuid::new_v4(),
            food_id: Uuid::nil(),
            food_name: "Margherita".to_string(),
            variant_id: None,
            variant_name: None,
            add_ons,
            unit_price: dec!(6.50),
            quantity: 2,
        }
    }

    fn add_on(id: Uuid, price: Decimal) -> BasketAddOn {
        BasketAddOn {
            add_on_id: id,
            name: "Extra".to_string(),
            price,
        }
    }

    #[test]
    fn test_line_total_includes_add_ons() {
        let line = item(vec![add_on(Uuid::new_v4(), dec!(0.50)), add_on(Uuid::new_v4(), dec!(1))]);

        assert_eq!(line.unit_price_with_add_ons().value(), dec!(8.00));
        assert_eq!(line.line_total().value(), dec!(16.00));
    }

    #[test]
    fn test_same_selection_ignores_add_on_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let first = item(vec![add_on(a, dec!(1)), add_on(b, dec!(1))]);
        let second = item(vec![add_on(b, dec!(1)), add_on(a, dec!(1))]);
        let plain = item(vec![]);

        assert!(first.same_selection(&second));
        assert!(!first.same_selection(&plain));
    }

    #[test]
    fn test_display_name() {
        let mut line = item(vec![]);
        assert_eq!(line.display_name(), "Margherita");

        line.variant_name = Some("Maxi".to_string());
        assert_eq!(line.display_name(), "Margherita (Maxi)");
    }
}
