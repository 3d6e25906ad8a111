use actix::prelude::*;
use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

use multivendor_ordering::actors::{CoordinatorActor, DrainCatalog, GetDeadLetterStats, Shutdown};
use multivendor_ordering::catalog::{CatalogProjection, CatalogStore, RedisCatalogStore, RestaurantQuery};
use multivendor_ordering::config::Settings;
use multivendor_ordering::domain::basket::{BasketCommand, BasketCommandHandler, BasketEvent};
use multivendor_ordering::domain::order::{OrderCommand, OrderCommandHandler, OrderEvent, OrderType, PaymentType};
use multivendor_ordering::domain::restaurant::{
    FoodType, PricingPolicy, RestaurantCommand, RestaurantCommandHandler, RestaurantEvent, SubscriptionType,
};
use multivendor_ordering::domain::{CheckoutRequest, OrderingService};
use multivendor_ordering::event_sourcing::{PgEventStore, PgOutboxStore};
use multivendor_ordering::metrics::{self, Metrics};
use multivendor_ordering::utils::{retry_with_backoff, CircuitBreaker, RetryConfig};

#[actix::main]
async fn main() -> anyhow::Result<()> {
    // .env may carry RUST_LOG, so load it before the subscriber
    dotenvy::dotenv().ok();

    // Default to INFO level, can be overridden with RUST_LOG
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,multivendor_ordering=debug")),
        )
        .init();

    tracing::info!("Starting multi-vendor ordering service");

    let settings = Settings::from_env()?;

    // === 1. PostgreSQL event store ===
    tracing::info!("Connecting to PostgreSQL...");
    let pool = retry_with_backoff("postgres_connect", RetryConfig::startup(), |_attempt| {
        let url = settings.database_url.clone();
        async move {
            PgPoolOptions::new()
                .max_connections(10)
                .connect(&url)
                .await
                .map_err(anyhow::Error::from)
        }
    })
    .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Event store migrations applied");

    let restaurant_store = Arc::new(PgEventStore::<RestaurantEvent>::new(pool.clone(), "Restaurant"));
    let basket_store = Arc::new(PgEventStore::<BasketEvent>::new(pool.clone(), "Basket"));
    let order_store = Arc::new(PgEventStore::<OrderEvent>::new(pool.clone(), "Order"));
    let outbox = Arc::new(PgOutboxStore::new(pool.clone()));

    // === 2. Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    let metrics_registry = Arc::new(metrics.registry().clone());
    let metrics_port = settings.metrics_port;
    std::thread::spawn(move || {
        actix_web::rt::System::new().block_on(async move {
            if let Err(e) = metrics::start_metrics_server(metrics_registry, metrics_port).await {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    });

    // === 3. Redis catalog behind a circuit breaker ===
    let breaker = CircuitBreaker::new("catalog_store", settings.circuit_breaker.clone())
        .with_metrics(Some(metrics.clone()));
    let catalog = {
        let url = settings.redis_url.clone();
        let breaker = breaker.clone();
        Arc::new(
            retry_with_backoff("redis_connect", RetryConfig::startup(), |_attempt| {
                let url = url.clone();
                let breaker = breaker.clone();
                async move { RedisCatalogStore::connect(&url, breaker).await }
            })
            .await?,
        )
    };

    // === 4. Coordinator: health monitor, DLQ, catalog projector ===
    let coordinator = CoordinatorActor::new(
        outbox,
        CatalogProjection::new(catalog.clone()),
        settings.projector.clone(),
    )
    .with_catalog_breaker(breaker)
    .with_metrics(metrics.clone())
    .start();

    // === 5. Demonstrate a basket → order flow ===
    let restaurants = RestaurantCommandHandler::new(restaurant_store);
    let baskets = BasketCommandHandler::new(basket_store);
    let orders = OrderCommandHandler::new(order_store);
    let service = OrderingService::new(restaurants.clone(), baskets.clone(), orders).with_metrics(metrics.clone());

    let restaurant_id = Uuid::now_v7();
    let menu_id = Uuid::now_v7();
    let food_id = Uuid::now_v7();
    let correlation = Uuid::now_v7();

    for command in [
        RestaurantCommand::RegisterRestaurant {
            name: "Pizzeria da Gino".to_string(),
            description: "Wood-fired pizza".to_string(),
            phone_number: "0298765432".to_string(),
            locality_id: Uuid::now_v7(),
            category_id: Uuid::now_v7(),
            opening_hour: 22,
            closing_hour: 10,
            subscription: SubscriptionType::Premium,
            image_url: String::new(),
            manager_id: Uuid::now_v7(),
        },
        RestaurantCommand::SignContract { expiration_date: Utc::now() + Duration::days(365) },
        RestaurantCommand::Open,
        RestaurantCommand::SetPricingPolicy {
            policy: PricingPolicy {
                minimum_charge: dec!(10),
                maximum_charge: Some(dec!(5)),
                fixed_charge: dec!(2),
                additional_price: Some(dec!(0.50)),
            },
        },
        RestaurantCommand::AddMenu {
            menu_id,
            name: "Pizze".to_string(),
            name_eng: "Pizzas".to_string(),
            image_url: String::new(),
        },
        RestaurantCommand::AddFood {
            food_id,
            menu_id,
            name: "Diavola".to_string(),
            description: "Spicy salami".to_string(),
            unit_price: dec!(7.50),
            is_veg: false,
            is_non_veg: true,
            is_gluten_free: false,
            image_url: String::new(),
            food_type: FoodType::Pizza,
        },
    ] {
        restaurants.handle(restaurant_id, command, correlation).await?;
    }
    tracing::info!(%restaurant_id, "Restaurant registered and open for orders");

    let basket_id = Uuid::now_v7();
    baskets
        .handle(basket_id, BasketCommand::CreateBasket { customer_id: Uuid::now_v7() }, correlation)
        .await?;
    let item = service
        .add_to_basket(basket_id, restaurant_id, food_id, None, &[], 2, correlation)
        .await?;
    tracing::info!(%basket_id, line_total = %item.line_total(), "Basket line added");

    let order = service
        .checkout(
            basket_id,
            CheckoutRequest {
                customer_name: "Giulia".to_string(),
                contact_number: "3471234567".to_string(),
                order_type: OrderType::TakeAway,
                payment_type: PaymentType::CashOnDelivery,
            },
            correlation,
        )
        .await?;
    tracing::info!(order_id = %order.id, payable = %order.payable_amount, "Order placed");

    let order = service.update_order(order.id, OrderCommand::Confirm, correlation).await?;
    tracing::info!(order_id = %order.id, state = ?order.state, "Order confirmed");

    // === 6. Project the catalog and read it back ===
    match coordinator.send(DrainCatalog).await? {
        Ok(report) => tracing::info!(?report, "Catalog drained"),
        Err(e) => tracing::warn!("Catalog drain failed: {}", e),
    }

    let page = catalog.list_restaurants(&RestaurantQuery::default()).await?;
    for doc in &page.items {
        tracing::info!(name = %doc.name, state = ?doc.get_state(), menus = doc.menus.len(), "Catalog entry");
    }

    if let Ok(stats) = coordinator.send(GetDeadLetterStats).await? {
        tracing::info!(dead_letters = stats.total_messages, "Dead letter queue");
    }

    coordinator.send(Shutdown).await?;
    tracing::info!("Shutdown complete");

    Ok(())
}
