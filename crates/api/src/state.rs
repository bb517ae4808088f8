use std::sync::Arc;

use meal_core::snapshot::SnapshotProvider;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for the registry endpoints.
    pub pool: meal_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Source of report snapshots. Production wires
    /// [`meal_db::snapshot::PgSnapshotProvider`]; tests inject fixed data.
    pub snapshots: Arc<dyn SnapshotProvider>,
}
