use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::documents::{CategoryDocument, RestaurantDocument};
use super::query::{Page, RestaurantQuery};
use crate::utils::IsTransient;

// ============================================================================
// Catalog Store - document storage for the read model
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Document store error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Document store unavailable (circuit open)")]
    Unavailable,

    #[error("Malformed document: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No catalog document for restaurant {0}")]
    MissingDocument(Uuid),
}

impl IsTransient for CatalogError {
    fn is_transient(&self) -> bool {
        matches!(self, CatalogError::Redis(_) | CatalogError::Unavailable)
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert_restaurant(&self, document: &RestaurantDocument) -> Result<(), CatalogError>;

    async fn get_restaurant(&self, restaurant_id: Uuid) -> Result<Option<RestaurantDocument>, CatalogError>;

    /// Returns whether a document was removed
    async fn delete_restaurant(&self, restaurant_id: Uuid) -> Result<bool, CatalogError>;

    async fn list_restaurants(&self, query: &RestaurantQuery) -> Result<Page<RestaurantDocument>, CatalogError>;

    /// `phone_number` is the complete number, country prefix included
    async fn find_restaurant_by_phone(&self, phone_number: &str) -> Result<Option<RestaurantDocument>, CatalogError>;

    async fn upsert_category(&self, category: &CategoryDocument) -> Result<(), CatalogError>;

    async fn get_category(&self, category_id: Uuid) -> Result<Option<CategoryDocument>, CatalogError>;

    /// Case-insensitive match on the category name
    async fn find_category_by_name(&self, name: &str) -> Result<Option<CategoryDocument>, CatalogError>;
}

// ============================================================================
// In-memory implementation
// ============================================================================

#[derive(Default)]
pub struct InMemoryCatalogStore {
    restaurants: RwLock<HashMap<Uuid, RestaurantDocument>>,
    categories: RwLock<HashMap<Uuid, CategoryDocument>>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn upsert_restaurant(&self, document: &RestaurantDocument) -> Result<(), CatalogError> {
        self.restaurants
            .write()
            .await
            .insert(document.restaurant_id, document.clone());
        Ok(())
    }

    async fn get_restaurant(&self, restaurant_id: Uuid) -> Result<Option<RestaurantDocument>, CatalogError> {
        Ok(self.restaurants.read().await.get(&restaurant_id).cloned())
    }

    async fn delete_restaurant(&self, restaurant_id: Uuid) -> Result<bool, CatalogError> {
        Ok(self.restaurants.write().await.remove(&restaurant_id).is_some())
    }

    async fn list_restaurants(&self, query: &RestaurantQuery) -> Result<Page<RestaurantDocument>, CatalogError> {
        let documents: Vec<RestaurantDocument> = self.restaurants.read().await.values().cloned().collect();
        Ok(query.apply(documents))
    }

    async fn find_restaurant_by_phone(&self, phone_number: &str) -> Result<Option<RestaurantDocument>, CatalogError> {
        Ok(self
            .restaurants
            .read()
            .await
            .values()
            .find(|d| d.phone_number == phone_number)
            .cloned())
    }

    async fn upsert_category(&self, category: &CategoryDocument) -> Result<(), CatalogError> {
        self.categories
            .write()
            .await
            .insert(category.category_id, category.clone());
        Ok(())
    }

    async fn get_category(&self, category_id: Uuid) -> Result<Option<CategoryDocument>, CatalogError> {
        Ok(self.categories.read().await.get(&category_id).cloned())
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<CategoryDocument>, CatalogError> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .cloned())
    }
}
