use std::sync::Arc;
use uuid::Uuid;
use anyhow::Result;

use crate::event_sourcing::{CommandHandler, EventRepository, Executed};
use super::aggregate::OrderAggregate;
use super::commands::OrderCommand;
use super::events::OrderEvent;

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// ============================================================================

#[derive(Clone)]
pub struct OrderCommandHandler {
    inner: CommandHandler<OrderAggregate>,
}

impl OrderCommandHandler {
    pub fn new(event_store: Arc<dyn EventRepository<OrderEvent>>) -> Self {
        Self {
            inner: CommandHandler::new(event_store),
        }
    }

    /// Handle a command and persist resulting events.
    /// `causation_id` links a placement to the basket event that triggered it.
    pub async fn handle(
        &self,
        order_id: Uuid,
        command: OrderCommand,
        correlation_id: Uuid,
        causation_id: Option<Uuid>,
    ) -> Result<Executed<OrderAggregate>> {
        let executed = match &command {
            OrderCommand::PlaceOrder { .. } => {
                self.inner.create(order_id, &command, correlation_id, causation_id).await?
            }
            _ => self.inner.execute(order_id, &command, correlation_id, causation_id).await?,
        };

        tracing::info!(
            order_id = %order_id,
            state = executed.aggregate.state.as_str(),
            version = executed.aggregate.version,
            "Order command handled"
        );

        Ok(executed)
    }

    pub async fn load(&self, order_id: Uuid) -> Result<OrderAggregate> {
        self.inner.load(order_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{OrderDetail, OrderError, OrderItem, OrderState, OrderType, PaymentType};
    use crate::domain::restaurant::PricingPolicy;
    use crate::domain::shared::{PhoneNumber, SupportedCountryCode};
    use crate::event_sourcing::InMemoryEventStore;
    use rust_decimal_macros::dec;

    fn handler() -> OrderCommandHandler {
        OrderCommandHandler::new(Arc::new(InMemoryEventStore::<OrderEvent>::standalone("Order")))
    }

    fn place_take_away() -> OrderCommand {
        OrderCommand::PlaceOrder {
            customer_id: Uuid::new_v4(),
            restaurant_id: Uuid::new_v4(),
            basket_id: None,
            items: vec![OrderItem {
                food_id: Uuid::new_v4(),
                food_name: "Tiramisù".to_string(),
                quantity: 2,
                unit_price: dec!(5.50),
                discount: None,
            }],
            detail: OrderDetail {
                customer_name: "Luca".to_string(),
                contact_number: PhoneNumber::of(SupportedCountryCode::Italy, "3471234567").unwrap(),
                address: String::new(),
                delivery_location: None,
            },
            order_type: OrderType::TakeAway,
            payment_type: PaymentType::Card,
            pricing_policy: PricingPolicy::default(),
        }
    }

    #[tokio::test]
    async fn test_place_and_progress_order() {
        let handler = handler();
        let order_id = Uuid::new_v4();
        let correlation_id = Uuid::new_v4();
        let cause = Uuid::new_v4();

        let placed = handler
            .handle(order_id, place_take_away(), correlation_id, Some(cause))
            .await
            .unwrap();
        assert_eq!(placed.envelopes[0].causation_id, Some(cause));
        assert_eq!(placed.aggregate.total_amount.value(), dec!(11.00));

        handler.handle(order_id, OrderCommand::Confirm, correlation_id, None).await.unwrap();

        let order = handler.load(order_id).await.unwrap();
        assert_eq!(order.state, OrderState::Confirmed);
        assert_eq!(order.version, 2);
        assert_eq!(order.payable_amount.value(), dec!(11.00));
    }

    #[tokio::test]
    async fn test_invalid_transition_not_persisted() {
        let handler = handler();
        let order_id = Uuid::new_v4();

        handler.handle(order_id, place_take_away(), order_id, None).await.unwrap();
        let err = handler
            .handle(order_id, OrderCommand::Deliver, order_id, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<OrderError>(),
            Some(OrderError::InvalidStateTransition { .. })
        ));
        assert_eq!(handler.load(order_id).await.unwrap().version, 1);
    }
}
