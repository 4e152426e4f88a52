//! Event and order endpoints.
//!
//! - GET /api/event - The event on sale and its ticket types
//! - POST /api/orders - Validate a selection, submit it, issue pending tickets
//! - GET /api/orders/:tracking_id/status - Payment status from the provider
//!
//! # Order Flow
//!
//! 1. **Validate**: buyer details and selection are checked locally (422)
//! 2. **Submit**: the orchestrator creates a hosted-checkout order
//! 3. **Issue**: one pending ticket per unit is returned with the checkout URL

#![allow(clippy::missing_errors_doc)] // Handlers return AppError

use crate::catalog::{Catalog, SelectionRequest};
use crate::orchestrator::OrderOutcome;
use crate::server::error::AppError;
use crate::server::state::AppState;
use crate::tickets::{issue_pending_tickets, TicketRecord};
use crate::validation::BuyerInfo;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use boxoffice_gateway::OrderStatus;
use serde::{Deserialize, Serialize};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to place an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Requested ticket lines
    pub selection: Vec<SelectionRequest>,
    /// Buyer contact details
    pub buyer: BuyerInfo,
}

/// Response after placing an order.
#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    /// Always `true`
    pub success: bool,
    /// Merchant order reference
    pub order_id: String,
    /// Hosted checkout page
    pub redirect_url: String,
    /// Provider tracking id, used for status lookups
    pub order_tracking_id: Option<String>,
    /// Merchant reference echoed by the provider
    pub merchant_reference: Option<String>,
    /// Total charged, in the order currency
    pub amount: f64,
    /// Order currency
    pub currency: String,
    /// Pending tickets, one per unit
    pub tickets: Vec<TicketRecord>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get the event and its ticket types.
pub async fn get_event(State(state): State<AppState>) -> Json<Catalog> {
    Json(state.orchestrator.catalog().clone())
}

/// Place an order.
///
/// # Errors
///
/// - 422 for a malformed body, invalid buyer details or selection (no
///   provider call is made)
/// - 401 / 408 / 5xx for classified payment failures
/// - 503 when payment credentials are not configured
pub async fn create_order(
    State(state): State<AppState>,
    request: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateOrderResponse>), AppError> {
    let Json(request) = request?;
    let orchestrator = &state.orchestrator;

    let buyer = request.buyer.validate()?;
    let selection = orchestrator.catalog().resolve(&request.selection)?;

    let order = match orchestrator.place_order(&selection, &buyer).await {
        OrderOutcome::Placed(order) => order,
        OrderOutcome::Failed(failure) => return Err(failure.into()),
    };

    let tickets = issue_pending_tickets(&orchestrator.catalog().event, &order, &selection, &buyer);
    tracing::info!(
        order_id = %order.order_id,
        tickets = tickets.len(),
        "Pending tickets issued"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateOrderResponse {
            success: true,
            order_id: order.order_id,
            redirect_url: order.redirect_url,
            order_tracking_id: order.tracking_id,
            merchant_reference: order.merchant_reference,
            amount: selection.total_price(),
            currency: orchestrator.settings().currency.clone(),
            tickets,
        }),
    ))
}

/// Get the provider's payment status for an order.
pub async fn order_status(
    State(state): State<AppState>,
    Path(tracking_id): Path<String>,
) -> Result<Json<OrderStatus>, AppError> {
    let status = state.orchestrator.order_status(&tracking_id).await?;
    Ok(Json(status))
}
