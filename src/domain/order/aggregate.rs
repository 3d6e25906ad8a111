use uuid::Uuid;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::restaurant::PricingPolicy;
use crate::domain::shared::{check_rules, ConditionMustBeTrueRule, MoneyValue};
use crate::event_sourcing::core::Aggregate;
use super::value_objects::{OrderDetail, OrderItem, OrderState, OrderType, PaymentType};
use super::events::*;
use super::commands::OrderCommand;
use super::errors::OrderError;

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================

#[derive(Debug, Clone)]
pub struct OrderAggregate {
    // Identity
    pub id: Uuid,
    pub version: i64,

    // Current State (derived from events)
    pub customer_id: Uuid,
    pub restaurant_id: Uuid,
    pub basket_id: Option<Uuid>,
    pub items: Vec<OrderItem>,
    pub detail: OrderDetail,
    pub order_type: OrderType,
    pub payment_type: PaymentType,
    pub state: OrderState,

    // Amounts
    pub total_amount: MoneyValue,
    pub delivery_charge: MoneyValue,
    pub payable_amount: MoneyValue,

    // Audit Trail
    pub placed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Optional fields
    pub closing_reason: Option<String>,
}

/// Amounts computed at placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub total_amount: MoneyValue,
    pub delivery_charge: MoneyValue,
    pub payable_amount: MoneyValue,
}

impl OrderTotals {
    /// Sum of net line totals, plus the delivery charge for delivery orders.
    /// Amounts are added as decimals and re-classified, so a cent line next
    /// to a euro line does not trip the currency check.
    pub fn compute(items: &[OrderItem], order_type: OrderType, policy: &PricingPolicy) -> Self {
        let total: Decimal = items.iter().map(|i| i.net_total().value()).sum();
        let delivery = match order_type {
            OrderType::Delivery => policy.delivery_charge(),
            OrderType::TakeAway => Decimal::ZERO,
        };

        Self {
            total_amount: MoneyValue::of(total),
            delivery_charge: MoneyValue::of(delivery),
            payable_amount: MoneyValue::of(total + delivery),
        }
    }
}

impl OrderAggregate {
    /// Validate business rules before emitting events
    fn validate_placement(
        items: &[OrderItem],
        detail: &OrderDetail,
        order_type: OrderType,
        policy: &PricingPolicy,
    ) -> Result<(), OrderError> {
        let has_items = ConditionMustBeTrueRule::new(!items.is_empty(), "order items cannot be empty");
        let quantities = ConditionMustBeTrueRule::new(
            items.iter().all(|i| i.quantity > 0),
            "quantity must be greater than zero",
        );
        let prices = ConditionMustBeTrueRule::new(
            items.iter().all(|i| i.unit_price > Decimal::ZERO),
            "unit price must be greater than zero",
        );
        let discounts = ConditionMustBeTrueRule::new(
            items.iter().all(|i| {
                i.discount
                    .map_or(true, |d| d >= Decimal::ZERO && d <= i.total().value())
            }),
            "discount must be between zero and the line total",
        );
        let customer = ConditionMustBeTrueRule::new(
            !detail.customer_name.trim().is_empty(),
            "customer name is required",
        );
        let deliverable = ConditionMustBeTrueRule::new(
            order_type == OrderType::TakeAway
                || (!detail.address.trim().is_empty() && detail.delivery_location.is_some()),
            "delivery orders need an address and a delivery location",
        );

        let subtotal = OrderTotals::compute(items, OrderType::TakeAway, policy).total_amount;
        let minimum = ConditionMustBeTrueRule::new(
            policy.minimum_charge_reached(&subtotal),
            format!(
                "order total {} is below the minimum charge of {}",
                subtotal,
                MoneyValue::of(policy.minimum_charge)
            ),
        );

        check_rules(&[&has_items, &quantities, &prices, &discounts, &customer, &deliverable, &minimum])?;
        Ok(())
    }

    fn transition(&self, next: OrderState) -> Result<(), OrderError> {
        if self.state.can_transition_to(next) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from: self.state,
                to: next,
            })
        }
    }
}

// ============================================================================
// Aggregate Trait Implementation
// ============================================================================

impl Aggregate for OrderAggregate {
    type Event = OrderEvent;
    type Command = OrderCommand;
    type Error = OrderError;

    const AGGREGATE_TYPE: &'static str = "Order";

    fn apply_first_event(aggregate_id: Uuid, event: &Self::Event) -> Result<Self, Self::Error> {
        match event {
            OrderEvent::Placed(e) => Ok(Self {
                id: aggregate_id,
                version: 0,
                customer_id: e.customer_id,
                restaurant_id: e.restaurant_id,
                basket_id: e.basket_id,
                items: e.items.clone(),
                detail: e.detail.clone(),
                order_type: e.order_type,
                payment_type: e.payment_type,
                state: OrderState::Placed,
                total_amount: MoneyValue::of(e.total_amount),
                delivery_charge: MoneyValue::of(e.delivery_charge),
                payable_amount: MoneyValue::of(e.payable_amount),
                placed_at: e.placed_at,
                updated_at: e.placed_at,
                closing_reason: None,
            }),
            _ => Err(OrderError::NotPlaced),
        }
    }

    fn apply_event(&mut self, event: &Self::Event) -> Result<(), Self::Error> {
        self.updated_at = Utc::now();

        match event {
            OrderEvent::Placed(_) => Err(OrderError::AlreadyPlaced),
            OrderEvent::Confirmed(_) => {
                self.state = OrderState::Confirmed;
                Ok(())
            }
            OrderEvent::PreparationStarted(_) => {
                self.state = OrderState::Preparing;
                Ok(())
            }
            OrderEvent::Dispatched(_) => {
                self.state = OrderState::OutForDelivery;
                Ok(())
            }
            OrderEvent::Delivered(_) => {
                self.state = OrderState::Delivered;
                Ok(())
            }
            OrderEvent::Cancelled(e) => {
                self.state = OrderState::Cancelled;
                self.closing_reason = e.reason.clone();
                Ok(())
            }
            OrderEvent::Rejected(e) => {
                self.state = OrderState::Rejected;
                self.closing_reason = e.reason.clone();
                Ok(())
            }
        }
    }

    fn handle_creation(command: &Self::Command) -> Result<Self::Event, Self::Error> {
        let OrderCommand::PlaceOrder {
            customer_id,
            restaurant_id,
            basket_id,
            items,
            detail,
            order_type,
            payment_type,
            pricing_policy,
        } = command
        else {
            return Err(OrderError::NotPlaced);
        };

        Self::validate_placement(items, detail, *order_type, pricing_policy)?;

        let totals = OrderTotals::compute(items, *order_type, pricing_policy);

        Ok(OrderEvent::Placed(OrderPlaced {
            customer_id: *customer_id,
            restaurant_id: *restaurant_id,
            basket_id: *basket_id,
            items: items.clone(),
            detail: detail.clone(),
            order_type: *order_type,
            payment_type: *payment_type,
            total_amount: totals.total_amount.value(),
            delivery_charge: totals.delivery_charge.value(),
            payable_amount: totals.payable_amount.value(),
            placed_at: Utc::now(),
        }))
    }

    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            OrderCommand::PlaceOrder { .. } => Err(OrderError::AlreadyPlaced),

            OrderCommand::Confirm => {
                self.transition(OrderState::Confirmed)?;

                Ok(vec![OrderEvent::Confirmed(OrderConfirmed {
                    confirmed_at: Utc::now(),
                })])
            }

            OrderCommand::StartPreparing => {
                self.transition(OrderState::Preparing)?;

                Ok(vec![OrderEvent::PreparationStarted(OrderPreparationStarted {
                    started_at: Utc::now(),
                })])
            }

            OrderCommand::Dispatch => {
                if self.order_type != OrderType::Delivery {
                    return Err(OrderError::NotADeliveryOrder);
                }
                self.transition(OrderState::OutForDelivery)?;

                Ok(vec![OrderEvent::Dispatched(OrderDispatched {
                    dispatched_at: Utc::now(),
                })])
            }

            OrderCommand::Deliver => {
                self.transition(OrderState::Delivered)?;

                // Delivery orders must go out with a rider first
                if self.order_type == OrderType::Delivery && self.state != OrderState::OutForDelivery {
                    return Err(OrderError::InvalidStateTransition {
                        from: self.state,
                        to: OrderState::Delivered,
                    });
                }

                Ok(vec![OrderEvent::Delivered(OrderDelivered {
                    delivered_at: Utc::now(),
                })])
            }

            OrderCommand::Cancel { reason } => {
                self.transition(OrderState::Cancelled)?;

                Ok(vec![OrderEvent::Cancelled(OrderCancelled {
                    reason: reason.clone(),
                    cancelled_at: Utc::now(),
                })])
            }

            OrderCommand::Reject { reason } => {
                self.transition(OrderState::Rejected)?;

                Ok(vec![OrderEvent::Rejected(OrderRejected {
                    reason: reason.clone(),
                    rejected_at: Utc::now(),
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
