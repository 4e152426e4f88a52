//! Router configuration for the storefront.

use super::health::health_check;
use super::orders;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// - `GET /health`
/// - `GET /api/event`
/// - `POST /api/orders`
/// - `GET /api/orders/:tracking_id/status`
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/event", get(orders::get_event))
        .route("/orders", post(orders::create_order))
        .route("/orders/:tracking_id/status", get(orders::order_status));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
