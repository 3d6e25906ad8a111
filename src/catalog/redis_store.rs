use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use uuid::Uuid;

use super::documents::{CategoryDocument, RestaurantDocument};
use super::query::{Page, RestaurantQuery};
use super::store::{CatalogError, CatalogStore};
use crate::utils::{CircuitBreaker, CircuitBreakerError};

// ============================================================================
// Redis Catalog Store
// ============================================================================
//
// Keys:
//   catalog:restaurant:{restaurant_id}   JSON RestaurantDocument
//   catalog:restaurants                  set of restaurant ids
//   catalog:restaurant_phone:{phone}     restaurant id
//   catalog:category:{category_id}       JSON CategoryDocument
//   catalog:category_name:{lower name}   category id
//
// Listing loads every document and filters in process; the catalog is
// small next to the order volume.
//
// ============================================================================

const RESTAURANT_SET: &str = "catalog:restaurants";

fn restaurant_key(restaurant_id: Uuid) -> String {
    format!("catalog:restaurant:{}", restaurant_id)
}

fn phone_key(phone_number: &str) -> String {
    format!("catalog:restaurant_phone:{}", phone_number)
}

fn category_key(category_id: Uuid) -> String {
    format!("catalog:category:{}", category_id)
}

fn category_name_key(name: &str) -> String {
    format!("catalog:category_name:{}", name.to_lowercase())
}

/// Index key left behind when a document's indexed value changed
fn stale_index_key(previous: Option<String>, current: &str) -> Option<String> {
    previous.filter(|key| key != current)
}

#[derive(Clone)]
pub struct RedisCatalogStore {
    connection: MultiplexedConnection,
    breaker: CircuitBreaker,
}

impl RedisCatalogStore {
    pub async fn connect(redis_url: &str, breaker: CircuitBreaker) -> anyhow::Result<Self> {
        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        tracing::info!(url = %redis_url, "Connected to catalog document store");

        Ok(Self { connection, breaker })
    }

    async fn guarded<T, F>(&self, operation: F) -> Result<T, CatalogError>
    where
        F: std::future::Future<Output = Result<T, CatalogError>>,
    {
        self.breaker.call(operation).await.map_err(|e| match e {
            CircuitBreakerError::CircuitOpen => CatalogError::Unavailable,
            CircuitBreakerError::OperationFailed(inner) => inner,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, key: String) -> Result<Option<T>, CatalogError> {
        let mut conn = self.connection.clone();
        self.guarded(async move {
            let raw: Option<String> = conn.get(&key).await?;
            let document: Option<T> = raw.map(|json| serde_json::from_str(&json)).transpose()?;
            Ok::<_, CatalogError>(document)
        })
        .await
    }

    async fn lookup_id(&self, index_key: String) -> Result<Option<Uuid>, CatalogError> {
        let mut conn = self.connection.clone();
        let raw = self
            .guarded(async move {
                let id: Option<String> = conn.get(&index_key).await?;
                Ok::<_, CatalogError>(id)
            })
            .await?;
        // A malformed index entry reads as a miss
        Ok(raw.and_then(|id| Uuid::parse_str(&id).ok()))
    }
}

#[async_trait]
impl CatalogStore for RedisCatalogStore {
    async fn upsert_restaurant(&self, document: &RestaurantDocument) -> Result<(), CatalogError> {
        let json = serde_json::to_string(document)?;
        let previous: Option<RestaurantDocument> = self.get_json(restaurant_key(document.restaurant_id)).await?;
        let stale_phone = stale_index_key(
            previous.map(|p| phone_key(&p.phone_number)),
            &phone_key(&document.phone_number),
        );
        let mut conn = self.connection.clone();

        self.guarded(async move {
            let mut pipe = redis::pipe();
            pipe.atomic();
            if let Some(stale) = stale_phone {
                pipe.del(stale).ignore();
            }
            pipe.set(restaurant_key(document.restaurant_id), json)
                .ignore()
                .sadd(RESTAURANT_SET, document.restaurant_id.to_string())
                .ignore()
                .set(phone_key(&document.phone_number), document.restaurant_id.to_string())
                .ignore();
            pipe.query_async::<()>(&mut conn).await?;
            Ok::<_, CatalogError>(())
        })
        .await
    }

    async fn get_restaurant(&self, restaurant_id: Uuid) -> Result<Option<RestaurantDocument>, CatalogError> {
        self.get_json(restaurant_key(restaurant_id)).await
    }

    async fn delete_restaurant(&self, restaurant_id: Uuid) -> Result<bool, CatalogError> {
        let Some(document) = self.get_restaurant(restaurant_id).await? else {
            return Ok(false);
        };
        let mut conn = self.connection.clone();

        self.guarded(async move {
            redis::pipe()
                .atomic()
                .del(restaurant_key(restaurant_id))
                .ignore()
                .srem(RESTAURANT_SET, restaurant_id.to_string())
                .ignore()
                .del(phone_key(&document.phone_number))
                .ignore()
                .query_async::<()>(&mut conn)
                .await?;
            Ok::<_, CatalogError>(true)
        })
        .await
    }

    async fn list_restaurants(&self, query: &RestaurantQuery) -> Result<Page<RestaurantDocument>, CatalogError> {
        let mut conn = self.connection.clone();

        let raw: Vec<Option<String>> = self
            .guarded(async move {
                let ids: Vec<String> = conn.smembers(RESTAURANT_SET).await?;
                if ids.is_empty() {
                    return Ok::<_, CatalogError>(Vec::new());
                }
                let keys: Vec<String> = ids
                    .iter()
                    .map(|id| format!("catalog:restaurant:{}", id))
                    .collect();
                let documents: Vec<Option<String>> = conn.mget(keys).await?;
                Ok::<_, CatalogError>(documents)
            })
            .await?;

        let documents = raw
            .into_iter()
            .flatten()
            .map(|json| serde_json::from_str::<RestaurantDocument>(&json))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(query.apply(documents))
    }

    async fn find_restaurant_by_phone(&self, phone_number: &str) -> Result<Option<RestaurantDocument>, CatalogError> {
        match self.lookup_id(phone_key(phone_number)).await? {
            Some(restaurant_id) => self.get_restaurant(restaurant_id).await,
            None => Ok(None),
        }
    }

    async fn upsert_category(&self, category: &CategoryDocument) -> Result<(), CatalogError> {
        let json = serde_json::to_string(category)?;
        let previous = self.get_category(category.category_id).await?;
        let stale_name = stale_index_key(
            previous.map(|p| category_name_key(&p.name)),
            &category_name_key(&category.name),
        );
        let mut conn = self.connection.clone();

        self.guarded(async move {
            let mut pipe = redis::pipe();
            pipe.atomic();
            if let Some(stale) = stale_name {
                pipe.del(stale).ignore();
            }
            pipe.set(category_key(category.category_id), json)
                .ignore()
                .set(category_name_key(&category.name), category.category_id.to_string())
                .ignore();
            pipe.query_async::<()>(&mut conn).await?;
            Ok::<_, CatalogError>(())
        })
        .await
    }

    async fn get_category(&self, category_id: Uuid) -> Result<Option<CategoryDocument>, CatalogError> {
        self.get_json(category_key(category_id)).await
    }

    async fn find_category_by_name(&self, name: &str) -> Result<Option<CategoryDocument>, CatalogError> {
        match self.lookup_id(category_name_key(name)).await? {
            Some(category_id) => self.get_category(category_id).await,
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        let id = Uuid::nil();
        assert_eq!(restaurant_key(id), "catalog:restaurant:00000000-0000-0000-0000-000000000000");
        assert_eq!(phone_key("+390212345678"), "catalog:restaurant_phone:+390212345678");
        assert_eq!(category_name_key("Pizzeria"), "catalog:category_name:pizzeria");
    }

    #[test]
    fn test_renamed_category_drops_old_name_key() {
        let stale = stale_index_key(Some(category_name_key("Pizzeria")), &category_name_key("Trattoria"));
        assert_eq!(stale.as_deref(), Some("catalog:category_name:pizzeria"));

        // Case-only renames map to the same key
        assert_eq!(stale_index_key(Some(category_name_key("Pizzeria")), &category_name_key("PIZZERIA")), None);
        assert_eq!(stale_index_key(None, &category_name_key("Pizzeria")), None);
    }

    #[test]
    fn test_changed_phone_drops_old_phone_key() {
        let stale = stale_index_key(Some(phone_key("+390212345678")), &phone_key("+390298765432"));
        assert_eq!(stale.as_deref(), Some("catalog:restaurant_phone:+390212345678"));
        assert_eq!(stale_index_key(Some(phone_key("+390212345678")), &phone_key("+390212345678")), None);
    }
}
