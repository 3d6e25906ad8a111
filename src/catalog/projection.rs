use std::sync::Arc;
use uuid::Uuid;

use super::documents::{MenuRecord, RestaurantDocument};
use super::store::{CatalogError, CatalogStore};
use crate::domain::restaurant::{
    ContractStatus, RestaurantAggregate, RestaurantEvent, RestaurantState,
};
use crate::event_sourcing::core::Aggregate;
use crate::event_sourcing::OutboxMessage;

// ============================================================================
// Catalog Projection - Restaurant events → RestaurantDocument
// ============================================================================
//
// Registration creates the document; every later event loads it, changes
// it and writes it back whole. Events of other aggregates are skipped.
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionOutcome {
    Projected,
    Skipped,
}

#[derive(Clone)]
pub struct CatalogProjection {
    store: Arc<dyn CatalogStore>,
}

impl CatalogProjection {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn project_message(&self, message: &OutboxMessage) -> Result<ProjectionOutcome, CatalogError> {
        if message.aggregate_type != RestaurantAggregate::AGGREGATE_TYPE {
            return Ok(ProjectionOutcome::Skipped);
        }

        let event: RestaurantEvent = serde_json::from_str(&message.payload)?;

        self.apply(message.aggregate_id, message.event_id, &event).await
    }

    /// Fold one event into the restaurant's document. Redelivered events
    /// (an id already on the document, or a second registration) are skipped.
    pub async fn apply(
        &self,
        restaurant_id: Uuid,
        event_id: Uuid,
        event: &RestaurantEvent,
    ) -> Result<ProjectionOutcome, CatalogError> {
        let existing = self.store.get_restaurant(restaurant_id).await?;

        let mut document = match (event, existing) {
            (RestaurantEvent::Registered(_), Some(_)) => {
                tracing::debug!(%restaurant_id, %event_id, "Restaurant already projected, registration skipped");
                return Ok(ProjectionOutcome::Skipped);
            }
            (RestaurantEvent::Registered(registered), None) => {
                let category_name = self.category_name(registered.category_id).await?;
                RestaurantDocument::registered(restaurant_id, registered, category_name)
            }
            (_, None) => return Err(CatalogError::MissingDocument(restaurant_id)),
            (_, Some(document)) if document.has_applied(event_id) => {
                tracing::debug!(%restaurant_id, %event_id, "Event already projected, skipped");
                return Ok(ProjectionOutcome::Skipped);
            }
            (_, Some(mut document)) => {
                if let RestaurantEvent::CategoryChanged(changed) = event {
                    document.category_id = changed.category_id;
                    document.category_name = self.category_name(changed.category_id).await?;
                } else {
                    apply_event(&mut document, event);
                }
                document.updated_at = chrono::Utc::now();
                document
            }
        };
        document.mark_applied(event_id);

        self.store.upsert_restaurant(&document).await?;

        tracing::debug!(
            restaurant_id = %restaurant_id,
            menus = document.menus.len(),
            "Catalog document updated"
        );

        Ok(ProjectionOutcome::Projected)
    }

    async fn category_name(&self, category_id: Uuid) -> Result<Option<String>, CatalogError> {
        Ok(self.store.get_category(category_id).await?.map(|c| c.name))
    }
}

/// Document changes that need no lookups
fn apply_event(document: &mut RestaurantDocument, event: &RestaurantEvent) {
    match event {
        RestaurantEvent::HoursUpdated(hours) => {
            document.opening_hour = hours.opening_hour;
            document.closing_hour = hours.closing_hour;
        }
        RestaurantEvent::Opened(_) => document.state = RestaurantState::Open,
        RestaurantEvent::Closed(_) => document.state = RestaurantState::Closed,
        RestaurantEvent::SubscriptionChanged(changed) => document.subscription = changed.subscription,
        RestaurantEvent::ContractSigned(signed) => {
            document.contract_status = ContractStatus::Active;
            document.expiration_date = Some(signed.expiration_date);
        }
        RestaurantEvent::PricingPolicySet(set) => document.pricing_policy = Some(set.policy.clone()),
        RestaurantEvent::MenuAdded(added) => {
            if !document.menus.iter().any(|m| m.menu_id == added.menu.menu_id) {
                document.menus.push(MenuRecord::from(&added.menu));
            }
        }
        RestaurantEvent::Reviewed(review) => document.add_rating(review.star_rate),
        // Food level changes are not part of the restaurant document
        RestaurantEvent::FoodAdded(_)
        | RestaurantEvent::VariantAdded(_)
        | RestaurantEvent::AddOnAdded(_)
        | RestaurantEvent::FoodPriceChanged(_)
        | RestaurantEvent::FoodStatusChanged(_) => {}
        RestaurantEvent::Registered(_) | RestaurantEvent::CategoryChanged(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::documents::tests::registered_event;
    use crate::catalog::documents::CategoryDocument;
    use crate::catalog::store::InMemoryCatalogStore;
    use crate::domain::restaurant::{
        CategoryChanged, ContractSigned, Menu, MenuAdded, RestaurantOpened, RestaurantReviewed,
    };
    use crate::event_sourcing::core::serialize_event;
    use chrono::{Duration, Utc};

    fn projection() -> (CatalogProjection, Arc<InMemoryCatalogStore>) {
        let store = Arc::new(InMemoryCatalogStore::new());
        (CatalogProjection::new(store.clone()), store)
    }

    fn menu_added(name: &str) -> RestaurantEvent {
        RestaurantEvent::MenuAdded(MenuAdded {
            menu: Menu {
                menu_id: Uuid::new_v4(),
                name: name.to_string(),
                name_eng: name.to_string(),
                image_url: String::new(),
            },
        })
    }

    fn outbox_message(aggregate_type: &str, aggregate_id: Uuid, payload: String) -> OutboxMessage {
        OutboxMessage {
            id: Uuid::new_v4(),
            aggregate_id,
            aggregate_type: aggregate_type.to_string(),
            event_id: Uuid::new_v4(),
            event_type: "RestaurantRegistered".to_string(),
            payload,
            created_at: Utc::now(),
            attempts: 0,
        }
    }

    #[tokio::test]
    async fn test_registration_resolves_category_name() {
        let (projection, store) = projection();
        let event = registered_event("Da Gino");
        store
            .upsert_category(&CategoryDocument::new(event.category_id, "Pizzeria", "Pizza place", "cuisine", ""))
            .await
            .unwrap();

        let restaurant_id = Uuid::new_v4();
        projection.apply(restaurant_id, Uuid::new_v4(), &RestaurantEvent::Registered(event)).await.unwrap();

        let doc = store.get_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(doc.category_name.as_deref(), Some("Pizzeria"));
        assert_eq!(doc.name, "Da Gino");
    }

    #[tokio::test]
    async fn test_menus_appended_in_order() {
        let (projection, store) = projection();
        let restaurant_id = Uuid::new_v4();

        projection
            .apply(restaurant_id, Uuid::new_v4(), &RestaurantEvent::Registered(registered_event("Da Gino")))
            .await
            .unwrap();
        projection.apply(restaurant_id, Uuid::new_v4(), &menu_added("Pranzo")).await.unwrap();
        projection.apply(restaurant_id, Uuid::new_v4(), &menu_added("Cena")).await.unwrap();

        let doc = store.get_restaurant(restaurant_id).await.unwrap().unwrap();
        let names: Vec<&str> = doc.menus.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Pranzo", "Cena"]);
    }

    #[tokio::test]
    async fn test_state_contract_rating_and_category() {
        let (projection, store) = projection();
        let restaurant_id = Uuid::new_v4();
        let expires = Utc::now() + Duration::days(90);
        let sushi = CategoryDocument::new(Uuid::new_v4(), "Sushi", "Sushi", "cuisine", "");
        store.upsert_category(&sushi).await.unwrap();

        let events = vec![
            RestaurantEvent::Registered(registered_event("Da Gino")),
            RestaurantEvent::ContractSigned(ContractSigned { expiration_date: expires }),
            RestaurantEvent::Opened(RestaurantOpened { opened_at: Utc::now() }),
            RestaurantEvent::CategoryChanged(CategoryChanged { category_id: sushi.category_id }),
            RestaurantEvent::Reviewed(RestaurantReviewed { customer_id: Uuid::new_v4(), star_rate: 5, comment: None }),
            RestaurantEvent::Reviewed(RestaurantReviewed { customer_id: Uuid::new_v4(), star_rate: 2, comment: None }),
        ];
        for event in &events {
            projection.apply(restaurant_id, Uuid::new_v4(), event).await.unwrap();
        }

        let doc = store.get_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(doc.state, RestaurantState::Open);
        assert_eq!(doc.contract_status, ContractStatus::Active);
        assert_eq!(doc.expiration_date, Some(expires));
        assert_eq!(doc.category_name.as_deref(), Some("Sushi"));
        assert_eq!(doc.total_ratings_count, 2);
        assert!((doc.rating - 3.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_event_before_registration_is_missing_document() {
        let (projection, _) = projection();
        let restaurant_id = Uuid::new_v4();

        let result = projection.apply(restaurant_id, Uuid::new_v4(), &menu_added("Pranzo")).await;
        assert!(matches!(result, Err(CatalogError::MissingDocument(id)) if id == restaurant_id));
    }

    #[tokio::test]
    async fn test_project_outbox_message() {
        let (projection, store) = projection();
        let restaurant_id = Uuid::new_v4();
        let payload = serialize_event(&RestaurantEvent::Registered(registered_event("Da Gino"))).unwrap();

        let outcome = projection
            .project_message(&outbox_message("Restaurant", restaurant_id, payload))
            .await
            .unwrap();
        assert_eq!(outcome, ProjectionOutcome::Projected);
        assert!(store.get_restaurant(restaurant_id).await.unwrap().is_some());

        let skipped = projection
            .project_message(&outbox_message("Order", Uuid::new_v4(), "{}".to_string()))
            .await
            .unwrap();
        assert_eq!(skipped, ProjectionOutcome::Skipped);

        let malformed = projection
            .project_message(&outbox_message("Restaurant", restaurant_id, "not json".to_string()))
            .await;
        assert!(matches!(malformed, Err(CatalogError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_redelivered_registration_keeps_document() {
        let (projection, store) = projection();
        let restaurant_id = Uuid::new_v4();
        let payload = serialize_event(&RestaurantEvent::Registered(registered_event("Da Gino"))).unwrap();
        let registration = outbox_message("Restaurant", restaurant_id, payload);

        projection.project_message(&registration).await.unwrap();
        projection.apply(restaurant_id, Uuid::new_v4(), &menu_added("Pranzo")).await.unwrap();
        let before = store.get_restaurant(restaurant_id).await.unwrap().unwrap();

        let outcome = projection.project_message(&registration).await.unwrap();
        assert_eq!(outcome, ProjectionOutcome::Skipped);

        let after = store.get_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(after.document_id, before.document_id);
        assert_eq!(after.menus.len(), 1);
    }

    #[tokio::test]
    async fn test_redelivered_review_counted_once() {
        let (projection, store) = projection();
        let restaurant_id = Uuid::new_v4();
        projection
            .apply(restaurant_id, Uuid::new_v4(), &RestaurantEvent::Registered(registered_event("Da Gino")))
            .await
            .unwrap();

        let review = RestaurantEvent::Reviewed(RestaurantReviewed { customer_id: Uuid::new_v4(), star_rate: 5, comment: None });
        let message = outbox_message("Restaurant", restaurant_id, serialize_event(&review).unwrap());

        assert_eq!(projection.project_message(&message).await.unwrap(), ProjectionOutcome::Projected);
        assert_eq!(projection.project_message(&message).await.unwrap(), ProjectionOutcome::Skipped);

        let doc = store.get_restaurant(restaurant_id).await.unwrap().unwrap();
        assert_eq!(doc.total_ratings_count, 1);
        assert!((doc.rating - 5.0).abs() < f64::EPSILON);
    }
}
