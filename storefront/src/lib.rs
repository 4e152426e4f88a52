//! # Box Office Storefront
//!
//! Backend for a single-event ticket storefront. Buyers pick ticket types,
//! enter contact details and are sent to a Pesapal hosted-checkout page.
//!
//! ## Modules
//!
//! - [`catalog`]: the event and its ticket types
//! - [`validation`]: buyer and selection checks, run before any provider call
//! - [`orchestrator`]: builds the provider order and classifies the outcome
//! - [`tickets`]: pending ticket records returned with a placed order
//! - [`config`]: environment configuration
//! - [`server`]: Axum HTTP surface
//!
//! ## Example
//!
//! ```ignore
//! let config = Config::from_env();
//! let orchestrator = OrderOrchestrator::new(
//!     config.payment_client()?,
//!     Arc::new(EnvCredentials),
//!     Arc::new(config.load_catalog()?),
//!     config.order.clone(),
//! );
//! let app = build_router(AppState::new(orchestrator));
//! ```

#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod ids;
pub mod orchestrator;
pub mod server;
pub mod tickets;
pub mod validation;

pub use catalog::{Catalog, EventInfo, SelectionRequest, TicketSelection, TicketType};
pub use config::{Config, ConfigError};
pub use orchestrator::{
    split_name, FailureKind, OrderFailure, OrderOrchestrator, OrderOutcome, OrderSettings,
    PlacedOrder,
};
pub use server::{build_router, AppError, AppState};
pub use tickets::{issue_pending_tickets, PaymentStatus, TicketRecord};
pub use validation::{BuyerInfo, ValidBuyer, ValidationError};
