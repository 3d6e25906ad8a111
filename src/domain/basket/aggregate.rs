use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::shared::{check_rule, check_rules, ConditionMustBeTrueRule, MoneyValue};
use crate::event_sourcing::core::Aggregate;
use super::commands::BasketCommand;
use super::errors::BasketError;
use super::events::*;
use super::value_objects::{BasketItem, BasketStatus, DeliveryAddress};

// ============================================================================
// Basket Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone)]
pub struct BasketAggregate {
    // Identity
    pub id: Uuid,
    pub version: i64,

    // Current State (derived from events)
    pub customer_id: Uuid,
    pub restaurant_id: Option<Uuid>,
    pub items: Vec<BasketItem>,
    pub delivery_address: Option<DeliveryAddress>,
    pub status: BasketStatus,

    // Audit Trail
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BasketAggregate {
    pub fn item(&self, item_id: Uuid) -> Option<&BasketItem> {
        self.items.iter().find(|i| i.item_id == item_id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subtotal(&self) -> MoneyValue {
        let total: Decimal = self.items.iter().map(|i| i.line_total().value()).sum();
        MoneyValue::of(total)
    }

    fn ensure_active(&self) -> Result<(), BasketError> {
        match self.status {
            BasketStatus::Active => Ok(()),
            BasketStatus::CheckedOut => Err(BasketError::AlreadyCheckedOut),
        }
    }

    fn require_item(&self, item_id: Uuid) -> Result<&BasketItem, BasketError> {
        self.item(item_id).ok_or(BasketError::ItemNotFound(item_id))
    }

    fn validate_lines(items: &[BasketItem]) -> Result<(), BasketError> {
        let quantities = ConditionMustBeTrueRule::new(
            items.iter().all(|i| i.quantity > 0),
            "quantity must be greater than zero",
        );
        let prices = ConditionMustBeTrueRule::new(
            items.iter().all(|i| i.unit_price > Decimal::ZERO),
            "unit price must be greater than zero",
        );
        check_rules(&[&quantities, &prices])?;
        Ok(())
    }

    fn remove_line(&mut self, item_id: Uuid) {
        self.items.retain(|i| i.item_id != item_id);
        if self.items.is_empty() {
            self.restaurant_id = None;
        }
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for BasketAggregate {
    type Event = BasketEvent;
    type Command = BasketCommand;
    type Error = BasketError;

    const AGGREGATE_TYPE: &'static str = "Basket";

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            BasketEvent::Created(e) => Ok(Self {
                id: aggregate_id,
                version: 0,
                customer_id: e.customer_id,
                restaurant_id: None,
                items: Vec::new(),
                delivery_address: None,
                status: BasketStatus::Active,
                created_at: e.created_at,
                updated_at: e.created_at,
            }),
            _ => Err(BasketError::NotCreated),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        self.updated_at = Utc::now();

        match event {
            BasketEvent::Created(_) => Err(BasketError::AlreadyCreated),
            BasketEvent::ItemAdded(e) => {
                self.restaurant_id = Some(e.restaurant_id);
                self.items.push(e.item.clone());
                Ok(())
            }
            BasketEvent::ItemRemoved(e) => {
                self.remove_line(e.item_id);
                Ok(())
            }
            BasketEvent::QuantityChanged(e) => {
                let line = self
                    .items
                    .iter_mut()
                    .find(|i| i.item_id == e.item_id)
                    .ok_or(BasketError::ItemNotFound(e.item_id))?;
                line.quantity = e.quantity;
                Ok(())
            }
            BasketEvent::DeliveryAddressProvided(e) => {
                self.delivery_address = Some(DeliveryAddress {
                    address: e.address.clone(),
                    location: e.location,
                });
                Ok(())
            }
            BasketEvent::CheckedOut(_) => {
                self.status = BasketStatus::CheckedOut;
                Ok(())
            }
            BasketEvent::Refilled(e) => {
                self.restaurant_id = Some(e.restaurant_id);
                self.items = e.items.clone();
                Ok(())
            }
        }
    }

    fn handle_creation(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        match command {
            BasketCommand::CreateBasket { customer_id } => Ok(BasketEvent::Created(BasketCreated {
                customer_id: *customer_id,
                created_at: Utc::now(),
            })),
            _ => Err(BasketError::NotCreated),
        }
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BasketCommand::CreateBasket { .. } => Err(BasketError::AlreadyCreated),

            BasketCommand::AddItem { restaurant_id, item } => {
                self.ensure_active()?;
                Self::validate_lines(std::slice::from_ref(item))?;
                check_rule(&ConditionMustBeTrueRule::new(
                    self.restaurant_id.map_or(true, |current| current == *restaurant_id),
                    "basket can only contain food from one restaurant",
                ))?;

                // Picking the same selection again grows the existing line
                if let Some(existing) = self.items.iter().find(|i| i.same_selection(item)) {
                    let merged = existing.quantity.checked_add(item.quantity);
                    check_rule(&ConditionMustBeTrueRule::new(
                        merged.is_some(),
                        "quantity is too large",
                    ))?;
                    return Ok(vec![BasketEvent::QuantityChanged(QuantityChanged {
                        item_id: existing.item_id,
                        quantity: merged.unwrap_or(existing.quantity),
                    })]);
                }

                Ok(vec![BasketEvent::ItemAdded(ItemAdded {
                    restaurant_id: *restaurant_id,
                    item: item.clone(),
                })])
            }

            BasketCommand::RemoveItem { item_id } => {
                self.ensure_active()?;
                self.require_item(*item_id)?;

                Ok(vec![BasketEvent::ItemRemoved(ItemRemoved { item_id: *item_id })])
            }

            BasketCommand::ChangeQuantity { item_id, quantity } => {
                self.ensure_active()?;
                let line = self.require_item(*item_id)?;
                check_rule(&ConditionMustBeTrueRule::new(
                    *quantity >= 0,
                    "quantity cannot be negative",
                ))?;

                if *quantity == 0 {
                    return Ok(vec![BasketEvent::ItemRemoved(ItemRemoved { item_id: *item_id })]);
                }
                if line.quantity == *quantity {
                    return Ok(vec![]);
                }

                Ok(vec![BasketEvent::QuantityChanged(QuantityChanged {
                    item_id: *item_id,
                    quantity: *quantity,
                })])
            }

            BasketCommand::ProvideDeliveryAddress { address, location } => {
                self.ensure_active()?;
                check_rule(&ConditionMustBeTrueRule::new(
                    !address.trim().is_empty(),
                    "delivery address is required",
                ))?;

                Ok(vec![BasketEvent::DeliveryAddressProvided(DeliveryAddressProvided {
                    address: address.trim().to_string(),
                    location: *location,
                })])
            }

            BasketCommand::Checkout => {
                self.ensure_active()?;
                check_rule(&ConditionMustBeTrueRule::new(
                    !self.items.is_empty() && self.restaurant_id.is_some(),
                    "cannot check out an empty basket",
                ))?;
                let restaurant_id = self.restaurant_id.unwrap_or_default();

                Ok(vec![BasketEvent::CheckedOut(BasketCheckedOut {
                    restaurant_id,
                    items: self.items.clone(),
                    subtotal: self.subtotal().value(),
                    checked_out_at: Utc::now(),
                })])
            }

            BasketCommand::Refill { restaurant_id, items } => {
                self.ensure_active()?;
                check_rule(&ConditionMustBeTrueRule::new(
                    !items.is_empty(),
                    "nothing to refill the basket with",
                ))?;
                Self::validate_lines(items)?;

                Ok(vec![BasketEvent::Refilled(BasketRefilled {
                    restaurant_id: *restaurant_id,
                    items: items.clone(),
                })])
            }
        }
    }

    fn aggregate_id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
