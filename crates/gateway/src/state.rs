//! Shared application state.

use std::sync::Arc;

use cadence_domain::config::Config;

use crate::runtime::dags::DagService;

/// Shared application state passed to all API handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    /// DAG lifecycle (validation, templating, file store).
    pub dags: Arc<DagService>,
}
