//! HTTP server for the storefront.
//!
//! This module provides the Axum-based HTTP surface:
//! - Application state shared by handlers
//! - Health check endpoint
//! - Event and order endpoints
//! - Error responses

pub mod error;
pub mod health;
pub mod orders;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use health::health_check;
pub use routes::build_router;
pub use state::AppState;
