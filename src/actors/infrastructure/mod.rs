// ============================================================================
// Infrastructure Actors
// ============================================================================
//
// - Catalog projection (outbox drain)
// - Dead letter queue
// - Health monitoring
// - Coordination and supervision
//
// ============================================================================

mod catalog_projector;
mod dlq;
mod health_monitor;
mod coordinator;

pub use catalog_projector::{CatalogProjector, DrainNow, DrainReport, OutboxDrainer, ProjectorConfig};
pub use dlq::{DlqActor, DlqStats, GetDlqMessages, GetDlqStats};
pub use health_monitor::{HealthMonitorActor, UpdateHealth, GetSystemHealth, SystemHealth};
pub use coordinator::{CoordinatorActor, DrainCatalog, GetDeadLetterStats, GetHealth, Shutdown};
