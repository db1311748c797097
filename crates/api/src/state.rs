use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::GenerationService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). The generation
/// service is constructed once at process start; there are no ambient
/// globals.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Request lifecycle engine: store, staging, executor, broadcaster.
    pub engine: Arc<GenerationService>,
}
