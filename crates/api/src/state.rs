use std::sync::Arc;

use classtrack_engine::channel::NotificationChannel;
use classtrack_engine::EngineConfig;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: classtrack_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Engine configuration, used by the manual trigger endpoints and
    /// for deriving ad hoc notification deadlines.
    pub engine: Arc<EngineConfig>,
    /// Notification channel for manual dispatch triggers.
    pub channel: Arc<dyn NotificationChannel>,
}
