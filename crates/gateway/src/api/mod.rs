pub mod events;
pub mod health;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the full API router.
///
/// Everything is public: the service runs cluster-internal and upstream
/// callers are other backend services, not browsers.
pub fn router() -> Router<AppState> {
    Router::new()
        // Liveness
        .route("/health", get(health::health))
        // Cadence event DAGs
        .route("/api/cadence-event", post(events::create))
        .route(
            "/api/cadence-event/:contract_uuid/:request_type",
            get(events::get),
        )
        .route(
            "/api/cadence-event/:contract_uuid/:request_type",
            put(events::update),
        )
        .route(
            "/api/cadence-event/:contract_uuid/:request_type",
            delete(events::delete),
        )
}
