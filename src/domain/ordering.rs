use std::sync::Arc;
use uuid::Uuid;
use anyhow::{Result, anyhow, bail};

use crate::domain::basket::{
    BasketAddOn, BasketAggregate, BasketCommand, BasketCommandHandler, BasketEvent, BasketItem, DeliveryAddress,
};
use crate::domain::order::{
    OrderAggregate, OrderCommand, OrderCommandHandler, OrderDetail, OrderItem, OrderType, PaymentType,
};
use crate::domain::restaurant::{PricingPolicy, RestaurantCommandHandler};
use crate::domain::shared::{PhoneNumber, SupportedCountryCode};
use crate::event_sourcing::core::Aggregate;
use crate::event_sourcing::Executed;
use crate::metrics::Metrics;

// ============================================================================
// Ordering Service - Basket → Order flow across aggregates
// ============================================================================
//
// 1. Price basket lines from the restaurant's current catalog
// 2. Check out the basket and place the order in one call
// 3. Refill a basket from a previous order
//
// The order is validated before the basket is frozen, so a rejected
// placement leaves the basket editable. The placed order is then built
// from the frozen lines, not from the basket as first loaded.
//
// ============================================================================

#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub contact_number: String,
    pub order_type: OrderType,
    pub payment_type: PaymentType,
}

/// Everything an order needs besides the basket lines and delivery address
struct OrderDraft<'a> {
    customer_id: Uuid,
    restaurant_id: Uuid,
    basket_id: Uuid,
    contact_number: PhoneNumber,
    pricing_policy: PricingPolicy,
    request: &'a CheckoutRequest,
}

impl OrderDraft<'_> {
    fn place_order(&self, items: &[BasketItem], delivery: Option<&DeliveryAddress>) -> OrderCommand {
        let (address, delivery_location) = match delivery {
            Some(delivery) => (delivery.address.clone(), Some(delivery.location)),
            None => (String::new(), None),
        };

        OrderCommand::PlaceOrder {
            customer_id: self.customer_id,
            restaurant_id: self.restaurant_id,
            basket_id: Some(self.basket_id),
            items: items.iter().map(OrderItem::from_basket_item).collect(),
            detail: OrderDetail {
                customer_name: self.request.customer_name.clone(),
                contact_number: self.contact_number.clone(),
                address,
                delivery_location,
            },
            order_type: self.request.order_type,
            payment_type: self.request.payment_type,
            pricing_policy: self.pricing_policy.clone(),
        }
    }
}

pub struct OrderingService {
    restaurants: RestaurantCommandHandler,
    baskets: BasketCommandHandler,
    orders: OrderCommandHandler,
    metrics: Option<Arc<Metrics>>,
}

impl OrderingService {
    pub fn new(
        restaurants: RestaurantCommandHandler,
        baskets: BasketCommandHandler,
        orders: OrderCommandHandler,
    ) -> Self {
        Self {
            restaurants,
            baskets,
            orders,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn orders(&self) -> &OrderCommandHandler {
        &self.orders
    }

    /// Add a food (optionally a variant and add-ons) to a basket at the
    /// restaurant's current prices
    #[allow(clippy::too_many_arguments)]
    pub async fn add_to_basket(
        &self,
        basket_id: Uuid,
        restaurant_id: Uuid,
        food_id: Uuid,
        variant_id: Option<Uuid>,
        add_on_ids: &[Uuid],
        quantity: i32,
        correlation_id: Uuid,
    ) -> Result<BasketItem> {
        let restaurant = self.restaurants.load(restaurant_id).await?;

        let food = restaurant
            .food(food_id)
            .ok_or_else(|| anyhow!("Food {} not found in restaurant {}", food_id, restaurant_id))?;

        if !food.is_available() {
            bail!("{} is out of stock", food.name);
        }

        let (unit_price, variant_name) = match variant_id {
            Some(id) => {
                let variant = food
                    .variant(id)
                    .ok_or_else(|| anyhow!("Variant {} not found for {}", id, food.name))?;
                (variant.price.value(), Some(variant.name.clone()))
            }
            None => (food.unit_price.value(), None),
        };

        let mut add_ons = Vec::with_capacity(add_on_ids.len());
        for id in add_on_ids {
            let add_on = food
                .add_on(*id)
                .ok_or_else(|| anyhow!("Add-on {} not found for {}", id, food.name))?;
            add_ons.push(BasketAddOn {
                add_on_id: add_on.add_on_id,
                name: add_on.name.clone(),
                price: add_on.price.value(),
            });
        }

        let item = BasketItem {
            item_id: Uuid::now_v7(),
            food_id,
            food_name: food.name.clone(),
            variant_id,
            variant_name,
            add_ons,
            unit_price,
            quantity,
        };

        self.baskets
            .handle(
                basket_id,
                BasketCommand::AddItem { restaurant_id, item: item.clone() },
                correlation_id,
            )
            .await?;

        tracing::debug!(
            basket_id = %basket_id,
            food = %item.food_name,
            price = %item.unit_price_with_add_ons(),
            quantity = quantity,
            "Food added to basket"
        );

        Ok(item)
    }

    /// Check the basket out and place the order built from the lines it
    /// was frozen with
    pub async fn checkout(
        &self,
        basket_id: Uuid,
        request: CheckoutRequest,
        correlation_id: Uuid,
    ) -> Result<OrderAggregate> {
        let basket = self.baskets.load(basket_id).await?;

        let Some(restaurant_id) = basket.restaurant_id else {
            bail!("Basket {} is empty", basket_id);
        };

        let restaurant = self.restaurants.load(restaurant_id).await?;
        if !restaurant.accepts_orders() {
            bail!("Restaurant {} is not accepting orders", restaurant.name);
        }

        let draft = OrderDraft {
            customer_id: basket.customer_id,
            restaurant_id,
            basket_id,
            contact_number: PhoneNumber::of(SupportedCountryCode::Italy, &request.contact_number)?,
            pricing_policy: restaurant.pricing_policy.clone().unwrap_or_default(),
            request: &request,
        };

        // Dry run: nothing is stored if the order would be refused
        OrderAggregate::handle_creation(&draft.place_order(&basket.items, basket.delivery_address.as_ref()))?;

        let checked_out = self
            .baskets
            .handle(basket_id, BasketCommand::Checkout, correlation_id)
            .await?;

        let order_id = Uuid::now_v7();
        let placed = match self.place_checked_out(order_id, &draft, &checked_out, correlation_id).await {
            Ok(placed) => placed,
            Err(e) => {
                tracing::error!(
                    basket_id = %basket_id,
                    order_id = %order_id,
                    error = %e,
                    "Basket checked out but no order was placed"
                );
                return Err(e);
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_basket_checkout();
            metrics.record_order_placed(request.order_type, placed.aggregate.payable_amount.value());
        }

        tracing::info!(
            order_id = %order_id,
            basket_id = %basket_id,
            restaurant_id = %restaurant_id,
            payable = %placed.aggregate.payable_amount,
            "Order placed from basket"
        );

        Ok(placed.aggregate)
    }

    /// Place the order from the `CheckedOut` event, which holds the lines
    /// the basket was actually frozen with
    async fn place_checked_out(
        &self,
        order_id: Uuid,
        draft: &OrderDraft<'_>,
        checked_out: &Executed<BasketAggregate>,
        correlation_id: Uuid,
    ) -> Result<Executed<OrderAggregate>> {
        let (checkout_event_id, frozen) = checked_out
            .envelopes
            .iter()
            .find_map(|e| match &e.event_data {
                BasketEvent::CheckedOut(frozen) => Some((e.event_id, frozen)),
                _ => None,
            })
            .ok_or_else(|| anyhow!("Basket {} stored no checkout event", draft.basket_id))?;

        if frozen.restaurant_id != draft.restaurant_id {
            bail!(
                "Basket {} moved to restaurant {} during checkout",
                draft.basket_id,
                frozen.restaurant_id
            );
        }

        let place_order = draft.place_order(&frozen.items, checked_out.aggregate.delivery_address.as_ref());
        OrderAggregate::handle_creation(&place_order)?;

        self.orders
            .handle(order_id, place_order, correlation_id, Some(checkout_event_id))
            .await
    }

    /// Replace a basket's contents with the lines of a previous order.
    /// Foods that are gone or out of stock are skipped; prices are current.
    pub async fn refill_basket(
        &self,
        basket_id: Uuid,
        previous_order_id: Uuid,
        correlation_id: Uuid,
    ) -> Result<usize> {
        let order = self.orders.load(previous_order_id).await?;
        let restaurant = self.restaurants.load(order.restaurant_id).await?;

        let items: Vec<BasketItem> = order
            .items
            .iter()
            .filter_map(|line| {
                let food = restaurant.food(line.food_id).filter(|f| f.is_available())?;
                Some(BasketItem {
                    item_id: Uuid::now_v7(),
                    food_id: food.food_id,
                    food_name: food.name.clone(),
                    variant_id: None,
                    variant_name: None,
                    add_ons: Vec::new(),
                    unit_price: food.unit_price.value(),
                    quantity: line.quantity,
                })
            })
            .collect();

        let refilled = items.len();
        if refilled < order.items.len() {
            tracing::warn!(
                order_id = %previous_order_id,
                skipped = order.items.len() - refilled,
                "Some order lines are no longer available"
            );
        }

        self.baskets
            .handle(
                basket_id,
                BasketCommand::Refill {
                    restaurant_id: order.restaurant_id,
                    items,
                },
                correlation_id,
            )
            .await?;

        Ok(refilled)
    }

    /// Move an existing order through its lifecycle
    pub async fn update_order(
        &self,
        order_id: Uuid,
        command: OrderCommand,
        correlation_id: Uuid,
    ) -> Result<OrderAggregate> {
        let executed = self.orders.handle(order_id, command, correlation_id, None).await?;

        if let Some(metrics) = &self.metrics {
            metrics.record_order_transition(executed.aggregate.state.as_str());
        }

        Ok(executed.aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::basket::BasketStatus;
    use crate::domain::order::OrderState;
    use crate::domain::restaurant::{
        FoodStatus, FoodType, PricingPolicy, RestaurantCommand, RestaurantEvent, SubscriptionType,
    };
    use crate::domain::shared::Location;
    use crate::domain::basket::{ItemAdded, ItemRemoved};
    use crate::event_sourcing::{EventEnvelope, EventRepository, InMemoryEventStore};
    use async_trait::async_trait;
    use tokio::sync::Mutex;
    use crate::domain::order::OrderEvent;
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;

    struct Fixture {
        service: OrderingService,
        restaurant_id: Uuid,
        pizza_id: Uuid,
        maxi_id: Uuid,
        bufala_id: Uuid,
        tiramisu_id: Uuid,
        order_store: Arc<InMemoryEventStore<OrderEvent>>,
    }

    /// Basket store that slips one extra event into the stream right after
    /// the next load, as a concurrent request would
    struct ConcurrentEdit {
        inner: InMemoryEventStore<BasketEvent>,
        edit: Mutex<Option<BasketEvent>>,
    }

    impl ConcurrentEdit {
        fn new() -> Self {
            Self {
                inner: InMemoryEventStore::standalone("Basket"),
                edit: Mutex::new(None),
            }
        }

        async fn after_next_load(&self, event: BasketEvent) {
            *self.edit.lock().await = Some(event);
        }
    }

    #[async_trait]
    impl EventRepository<BasketEvent> for ConcurrentEdit {
        async fn append_events(
            &self,
            aggregate_id: Uuid,
            expected_version: i64,
            events: Vec<EventEnvelope<BasketEvent>>,
        ) -> Result<i64> {
            self.inner.append_events(aggregate_id, expected_version, events).await
        }

        async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<BasketEvent>>> {
            let events = self.inner.load_events(aggregate_id).await?;
            if let Some(edit) = self.edit.lock().await.take() {
                let version = events.len() as i64;
                let envelope = EventEnvelope::new(aggregate_id, version + 1, edit, Uuid::new_v4());
                self.inner.append_events(aggregate_id, version, vec![envelope]).await?;
            }
            Ok(events)
        }

        async fn get_current_version(&self, aggregate_id: Uuid) -> Result<i64> {
            self.inner.get_current_version(aggregate_id).await
        }
    }

    async fn fixture() -> Fixture {
        fixture_with_baskets(Arc::new(InMemoryEventStore::<BasketEvent>::standalone("Basket"))).await
    }

    async fn fixture_with_baskets(basket_store: Arc<dyn EventRepository<BasketEvent>>) -> Fixture {
        let restaurants = RestaurantCommandHandler::new(Arc::new(
            InMemoryEventStore::<RestaurantEvent>::standalone("Restaurant"),
        ));
        let baskets = BasketCommandHandler::new(basket_store);
        let order_store = Arc::new(InMemoryEventStore::<OrderEvent>::standalone("Order"));
        let orders = OrderCommandHandler::new(order_store.clone());

        let restaurant_id = Uuid::new_v4();
        let menu_id = Uuid::new_v4();
        let pizza_id = Uuid::new_v4();
        let maxi_id = Uuid::new_v4();
        let bufala_id = Uuid::new_v4();
        let tiramisu_id = Uuid::new_v4();
        let c = Uuid::new_v4();

        let commands = vec![
            RestaurantCommand::RegisterRestaurant {
                name: "Pizzeria Napoli".to_string(),
                description: String::new(),
                phone_number: "0212345678".to_string(),
                locality_id: Uuid::new_v4(),
                category_id: Uuid::new_v4(),
                opening_hour: 23,
                closing_hour: 11,
                subscription: SubscriptionType::Premium,
                image_url: String::new(),
                manager_id: Uuid::new_v4(),
            },
            RestaurantCommand::SignContract { expiration_date: Utc::now() + Duration::days(30) },
            RestaurantCommand::Open,
            RestaurantCommand::SetPricingPolicy {
                policy: PricingPolicy {
                    minimum_charge: dec!(12),
                    maximum_charge: None,
                    fixed_charge: dec!(2),
                    additional_price: None,
                },
            },
            RestaurantCommand::AddMenu {
                menu_id,
                name: "Menu".to_string(),
                name_eng: "Menu".to_string(),
                image_url: String::new(),
            },
            RestaurantCommand::AddFood {
                food_id: pizza_id,
                menu_id,
                name: "Margherita".to_string(),
                description: String::new(),
                unit_price: dec!(6),
                is_veg: true,
                is_non_veg: false,
                is_gluten_free: false,
                image_url: String::new(),
                food_type: FoodType::Pizza,
            },
            RestaurantCommand::AddVariant {
                food_id: pizza_id,
                variant_id: maxi_id,
                name: "Maxi".to_string(),
                name_eng: "Large".to_string(),
                price: dec!(9),
            },
            RestaurantCommand::AddAddOn {
                food_id: pizza_id,
                add_on_id: bufala_id,
                name: "Bufala".to_string(),
                name_eng: "Buffalo mozzarella".to_string(),
                description: String::new(),
                price: dec!(1.50),
            },
            RestaurantCommand::AddFood {
                food_id: tiramisu_id,
                menu_id,
                name: "Tiramisù".to_string(),
                description: String::new(),
                unit_price: dec!(4),
                is_veg: true,
                is_non_veg: false,
                is_gluten_free: false,
                image_url: String::new(),
                food_type: FoodType::Dessert,
            },
        ];

        for command in commands {
            restaurants.handle(restaurant_id, command, c).await.unwrap();
        }

        Fixture {
            service: OrderingService::new(restaurants, baskets, orders),
            restaurant_id,
            pizza_id,
            maxi_id,
            bufala_id,
            tiramisu_id,
            order_store,
        }
    }

    async fn new_basket(f: &Fixture) -> Uuid {
        let basket_id = Uuid::new_v4();
        f.service
            .baskets
            .handle(basket_id, BasketCommand::CreateBasket { customer_id: Uuid::new_v4() }, basket_id)
            .await
            .unwrap();
        basket_id
    }

    fn take_away() -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Sara".to_string(),
            contact_number: "3331112233".to_string(),
            order_type: OrderType::TakeAway,
            payment_type: PaymentType::CashOnDelivery,
        }
    }

    #[tokio::test]
    async fn test_add_to_basket_prices_variant_and_add_ons() {
        let f = fixture().await;
        let basket_id = new_basket(&f).await;

        let item = f
            .service
            .add_to_basket(basket_id, f.restaurant_id, f.pizza_id, Some(f.maxi_id), &[f.bufala_id], 2, basket_id)
            .await
            .unwrap();

        assert_eq!(item.unit_price, dec!(9));
        assert_eq!(item.line_total().value(), dec!(21.00));
        assert_eq!(item.display_name(), "Margherita (Maxi)");
    }

    #[tokio::test]
    async fn test_out_of_stock_food_cannot_be_added() {
        let f = fixture().await;
        let basket_id = new_basket(&f).await;

        f.service
            .restaurants
            .handle(
                f.restaurant_id,
                RestaurantCommand::ChangeFoodStatus { food_id: f.tiramisu_id, status: FoodStatus::OutOfStock },
                basket_id,
            )
            .await
            .unwrap();

        let result = f
            .service
            .add_to_basket(basket_id, f.restaurant_id, f.tiramisu_id, None, &[], 1, basket_id)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_checkout_places_order() {
        let f = fixture().await;
        let basket_id = new_basket(&f).await;
        let correlation_id = Uuid::new_v4();

        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.pizza_id, None, &[], 2, correlation_id)
            .await
            .unwrap();
        f.service
            .baskets
            .handle(
                basket_id,
                BasketCommand::ProvideDeliveryAddress {
                    address: "Corso Buenos Aires 3".to_string(),
                    location: Location::new(45.48, 9.21).unwrap(),
                },
                correlation_id,
            )
            .await
            .unwrap();

        let order = f
            .service
            .checkout(
                basket_id,
                CheckoutRequest { order_type: OrderType::Delivery, ..take_away() },
                correlation_id,
            )
            .await
            .unwrap();

        assert_eq!(order.state, OrderState::Placed);
        assert_eq!(order.basket_id, Some(basket_id));
        assert_eq!(order.total_amount.value(), dec!(12));
        assert_eq!(order.payable_amount.value(), dec!(14));

        let basket = f.service.baskets.load(basket_id).await.unwrap();
        assert_eq!(basket.status, BasketStatus::CheckedOut);

        let envelopes = f.order_store.load_events(order.id).await.unwrap();
        assert_eq!(envelopes[0].correlation_id, correlation_id);
        assert!(envelopes[0].causation_id.is_some());
    }

    #[tokio::test]
    async fn test_refused_order_leaves_basket_open() {
        let f = fixture().await;
        let basket_id = new_basket(&f).await;

        // €4 is under the €12 minimum charge
        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.tiramisu_id, None, &[], 1, basket_id)
            .await
            .unwrap();

        assert!(f.service.checkout(basket_id, take_away(), basket_id).await.is_err());

        let basket = f.service.baskets.load(basket_id).await.unwrap();
        assert_eq!(basket.status, BasketStatus::Active);
    }

    #[tokio::test]
    async fn test_order_matches_frozen_basket() {
        let store = Arc::new(ConcurrentEdit::new());
        let f = fixture_with_baskets(store.clone()).await;
        let basket_id = new_basket(&f).await;

        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.pizza_id, None, &[], 2, basket_id)
            .await
            .unwrap();

        // A tiramisù lands between the first read and the checkout
        store
            .after_next_load(BasketEvent::ItemAdded(ItemAdded {
                restaurant_id: f.restaurant_id,
                item: BasketItem {
                    item_id: Uuid::new_v4(),
                    food_id: f.tiramisu_id,
                    food_name: "Tiramisù".to_string(),
                    variant_id: None,
                    variant_name: None,
                    add_ons: vec![],
                    unit_price: dec!(4),
                    quantity: 1,
                },
            }))
            .await;

        let order = f.service.checkout(basket_id, take_away(), basket_id).await.unwrap();

        let basket = f.service.baskets.load(basket_id).await.unwrap();
        assert_eq!(basket.status, BasketStatus::CheckedOut);
        assert_eq!(basket.items.len(), 2);
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount.value(), dec!(16));
    }

    #[tokio::test]
    async fn test_frozen_basket_refused_after_checkout() {
        let store = Arc::new(ConcurrentEdit::new());
        let f = fixture_with_baskets(store.clone()).await;
        let basket_id = new_basket(&f).await;

        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.pizza_id, None, &[], 2, basket_id)
            .await
            .unwrap();
        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.tiramisu_id, None, &[], 1, basket_id)
            .await
            .unwrap();

        // Pizzas removed concurrently: the frozen €4 basket is under the minimum charge
        let pizza_line = f.service.baskets.load(basket_id).await.unwrap().items[0].item_id;
        store
            .after_next_load(BasketEvent::ItemRemoved(ItemRemoved { item_id: pizza_line }))
            .await;

        assert!(f.service.checkout(basket_id, take_away(), basket_id).await.is_err());

        let basket = f.service.baskets.load(basket_id).await.unwrap();
        assert_eq!(basket.status, BasketStatus::CheckedOut);
        assert_eq!(basket.items.len(), 1);
    }

    #[tokio::test]
    async fn test_closed_restaurant_refuses_checkout() {
        let f = fixture().await;
        let basket_id = new_basket(&f).await;

        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.pizza_id, None, &[], 3, basket_id)
            .await
            .unwrap();
        f.service
            .restaurants
            .handle(f.restaurant_id, RestaurantCommand::Close, basket_id)
            .await
            .unwrap();

        assert!(f.service.checkout(basket_id, take_away(), basket_id).await.is_err());
    }

    #[tokio::test]
    async fn test_refill_from_previous_order() {
        let f = fixture().await;
        let first_basket = new_basket(&f).await;

        f.service
            .add_to_basket(first_basket, f.restaurant_id, f.pizza_id, None, &[], 2, first_basket)
            .await
            .unwrap();
        f.service
            .add_to_basket(first_basket, f.restaurant_id, f.tiramisu_id, None, &[], 1, first_basket)
            .await
            .unwrap();
        let order = f.service.checkout(first_basket, take_away(), first_basket).await.unwrap();

        f.service
            .restaurants
            .handle(
                f.restaurant_id,
                RestaurantCommand::ChangeFoodStatus { food_id: f.tiramisu_id, status: FoodStatus::OutOfStock },
                first_basket,
            )
            .await
            .unwrap();

        let second_basket = new_basket(&f).await;
        let refilled = f.service.refill_basket(second_basket, order.id, second_basket).await.unwrap();
        assert_eq!(refilled, 1);

        let basket = f.service.baskets.load(second_basket).await.unwrap();
        assert_eq!(basket.items.len(), 1);
        assert_eq!(basket.items[0].quantity, 2);
        assert_eq!(basket.restaurant_id, Some(f.restaurant_id));
    }

    #[tokio::test]
    async fn test_update_order() {
        let f = fixture().await;
        let basket_id = new_basket(&f).await;

        f.service
            .add_to_basket(basket_id, f.restaurant_id, f.pizza_id, None, &[], 2, basket_id)
            .await
            .unwrap();
        let order = f.service.checkout(basket_id, take_away(), basket_id).await.unwrap();

        let confirmed = f.service.update_order(order.id, OrderCommand::Confirm, basket_id).await.unwrap();
        assert_eq!(confirmed.state, OrderState::Confirmed);

        assert!(f
            .service
            .update_order(order.id, OrderCommand::Reject { reason: None }, basket_id)
            .await
            .is_err());
    }
}
