// ============================================================================
// Catalog - restaurant and category read model
// ============================================================================
//
// - Documents (RestaurantDocument, MenuRecord, CategoryDocument)
// - Query (filtering, order_by sort keys, paging)
// - Stores (Redis and in-memory)
// - Projection from restaurant events
//
// ============================================================================

pub mod documents;
pub mod query;
pub mod store;
pub mod redis_store;
pub mod projection;

pub use documents::*;
pub use query::*;
pub use store::*;
pub use redis_store::RedisCatalogStore;
pub use projection::{CatalogProjection, ProjectionOutcome};
