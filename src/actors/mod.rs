// ============================================================================
// Actors Module
// ============================================================================
//
// Actor-based infrastructure for background work.
//
// Structure:
// - core/           - Health abstractions (HealthStatus, HealthCheckable)
// - infrastructure/ - Projector, DLQ, health monitor, coordinator
//
// Note: Domain logic (restaurant, basket, order) uses CommandHandlers, NOT
//       actors. Actors are reserved for infrastructure concerns only.
//
// ============================================================================

mod core;
mod infrastructure;

pub use self::core::{ComponentHealth, HealthCheckable, HealthStatus};
pub use infrastructure::{
    CatalogProjector,
    CoordinatorActor,
    DlqActor,
    DlqStats,
    DrainCatalog,
    DrainNow,
    DrainReport,
    GetDeadLetterStats,
    GetDlqMessages,
    GetDlqStats,
    GetHealth,
    GetSystemHealth,
    HealthMonitorActor,
    OutboxDrainer,
    ProjectorConfig,
    Shutdown,
    SystemHealth,
    UpdateHealth,
};
