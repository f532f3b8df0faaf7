use std::sync::Arc;

use hostwatch_pipeline::{MetricsSampler, Pipeline};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hostwatch_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Runs on-demand and scheduled alert cycles.
    pub pipeline: Arc<Pipeline>,
    /// Live readings for the dashboard, outside any cycle.
    pub sampler: Arc<dyn MetricsSampler>,
}
