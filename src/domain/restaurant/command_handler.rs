use std::sync::Arc;
use uuid::Uuid;
use anyhow::Result;

use crate::event_sourcing::{CommandHandler, EventRepository};
use super::aggregate::RestaurantAggregate;
use super::commands::RestaurantCommand;
use super::events::RestaurantEvent;

// ============================================================================
// Restaurant Command Handler
// ============================================================================
//
// Orchestrates: Command → Aggregate → Events → Event Store
//
// ============================================================================

#[derive(Clone)]
pub struct RestaurantCommandHandler {
    inner: CommandHandler<RestaurantAggregate>,
}

impl RestaurantCommandHandler {
    pub fn new(event_store: Arc<dyn EventRepository<RestaurantEvent>>) -> Self {
        Self {
            inner: CommandHandler::new(event_store),
        }
    }

    /// Handle a command and persist resulting events
    pub async fn handle(
        &self,
        restaurant_id: Uuid,
        command: RestaurantCommand,
        correlation_id: Uuid,
    ) -> Result<RestaurantAggregate> {
        let executed = match &command {
            RestaurantCommand::RegisterRestaurant { .. } => {
                self.inner.create(restaurant_id, &command, correlation_id, None).await?
            }
            _ => self.inner.execute(restaurant_id, &command, correlation_id, None).await?,
        };

        tracing::info!(
            restaurant_id = %restaurant_id,
            version = executed.aggregate.version,
            events = executed.envelopes.len(),
            "Restaurant command handled"
        );

        Ok(executed.aggregate)
    }

    pub async fn load(&self, restaurant_id: Uuid) -> Result<RestaurantAggregate> {
        self.inner.load(restaurant_id).await
    }
}
