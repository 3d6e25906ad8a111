use std::sync::Arc;
use uuid::Uuid;
use anyhow::Result;

use crate::event_sourcing::{CommandHandler, EventRepository, Executed};
use super::aggregate::BasketAggregate;
use super::commands::BasketCommand;
use super::events::BasketEvent;

// ============================================================================
// Basket Command Handler
// ============================================================================

#[derive(Clone)]
pub struct BasketCommandHandler {
    inner: CommandHandler<BasketAggregate>,
}

impl BasketCommandHandler {
    pub fn new(event_store: Arc<dyn EventRepository<BasketEvent>>) -> Self {
        Self {
            inner: CommandHandler::new(event_store),
        }
    }

    /// Handle a command and persist resulting events.
    /// Returns the stored envelopes so checkout can chain the order placement.
    pub async fn handle(
        &self,
        basket_id: Uuid,
        command: BasketCommand,
        correlation_id: Uuid,
    ) -> Result<Executed<BasketAggregate>> {
        let executed = match &command {
            BasketCommand::CreateBasket { .. } => {
                self.inner.create(basket_id, &command, correlation_id, None).await?
            }
            _ => self.inner.execute(basket_id, &command, correlation_id, None).await?,
        };

        tracing::debug!(
            basket_id = %basket_id,
            version = executed.aggregate.version,
            items = executed.aggregate.items.len(),
            "Basket command handled"
        );

        Ok(executed)
    }

    pub async fn load(&self, basket_id: Uuid) -> Result<BasketAggregate> {
        self.inner.load(basket_id).await
    }
}
