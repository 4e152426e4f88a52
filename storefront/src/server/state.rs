//! Application state for the storefront HTTP server.

use crate::orchestrator::OrderOrchestrator;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Order orchestrator; owns the catalog and the payment client
    pub orchestrator: Arc<OrderOrchestrator>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(orchestrator: OrderOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
        }
    }
}
