//! Order orchestration: turns a ticket selection and buyer details into a
//! hosted-checkout order and normalizes the provider's answer.
//!
//! # Flow
//!
//! ```text
//! 1. Load credentials      → missing? Failed(Configuration), no network call
//! 2. Build OrderRequest    → ORD-… id, "Title - 2x Regular, 1x VIP", name split
//! 3. submit_order          → client authenticates first if needed
//! 4. redirect_url present  → Placed
//! 5. redirect_url missing  → Failed(Processing)
//! 6. GatewayError          → Failed(Authentication | Timeout | Processing)
//! ```
//!
//! The orchestrator keeps no state between calls. Ticket records are
//! materialized by the caller once an order is `Placed`.

use crate::catalog::{Catalog, TicketSelection};
use crate::ids;
use crate::validation::ValidBuyer;
use boxoffice_gateway::{
    BillingAddress, Credentials, CredentialsSource, GatewayError, IpnNotificationType,
    IpnRegistration, IpnResponse, OrderRequest, OrderStatus, PesapalClient,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const MISSING_CREDENTIALS: &str = "Payment configuration error: Missing credentials";
const AUTHENTICATION_FAILED: &str =
    "Payment authentication failed. Please check your payment configuration.";
const TIMED_OUT: &str = "Payment request timed out. Please try again.";
const PROCESSING_FAILED: &str = "Payment processing failed. Please try again.";

/// Deployment defaults applied to every order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSettings {
    /// ISO 4217 currency code
    pub currency: String,
    /// Billing country code
    pub country_code: String,
    /// Merchant branch label
    pub branch: String,
    /// Where the provider returns the buyer after checkout
    pub callback_url: String,
    /// Registered IPN identifier
    pub notification_id: String,
    /// `line_1` used when the buyer gives no address
    pub default_address: String,
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            currency: "UGX".to_string(),
            country_code: "UG".to_string(),
            branch: "Concert Tickets".to_string(),
            callback_url: "http://localhost:8080/payment/callback".to_string(),
            notification_id: String::new(),
            default_address: "Kampala, Uganda".to_string(),
        }
    }
}

/// Why an order could not be placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Credentials are not configured
    Configuration,
    /// The provider rejected our credentials or token
    Authentication,
    /// The provider did not answer in time
    Timeout,
    /// Any other provider or transport failure
    Processing,
}

/// User-facing failure. Never carries provider detail or secrets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderFailure {
    /// Failure category
    pub kind: FailureKind,
    /// Message safe to show the buyer
    pub error: String,
    /// HTTP-ish status code for the caller, when meaningful
    pub status_code: Option<u16>,
}

impl OrderFailure {
    fn missing_credentials() -> Self {
        Self {
            kind: FailureKind::Configuration,
            error: MISSING_CREDENTIALS.to_string(),
            status_code: None,
        }
    }

    fn processing(status_code: Option<u16>) -> Self {
        Self {
            kind: FailureKind::Processing,
            error: PROCESSING_FAILED.to_string(),
            status_code: Some(status_code.unwrap_or(500)),
        }
    }
}

impl From<&GatewayError> for OrderFailure {
    fn from(err: &GatewayError) -> Self {
        match err {
            GatewayError::MissingCredentials => Self::missing_credentials(),
            err if err.is_auth_failure() => Self {
                kind: FailureKind::Authentication,
                error: AUTHENTICATION_FAILED.to_string(),
                status_code: Some(401),
            },
            GatewayError::Timeout => Self {
                kind: FailureKind::Timeout,
                error: TIMED_OUT.to_string(),
                status_code: Some(408),
            },
            err => Self::processing(err.status()),
        }
    }
}

impl std::fmt::Display for OrderFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.error)
    }
}

/// A submitted order awaiting payment on the hosted checkout page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    /// Our merchant reference
    pub order_id: String,
    /// Hosted checkout page
    pub redirect_url: String,
    /// Provider-assigned tracking id
    pub tracking_id: Option<String>,
    /// Merchant reference echoed by the provider
    pub merchant_reference: Option<String>,
}

/// Result of `place_order`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderOutcome {
    /// Buyer should be sent to `redirect_url`
    Placed(PlacedOrder),
    /// Nothing was charged; show `error` to the buyer
    Failed(OrderFailure),
}

/// Split a full name into billing first/last name.
///
/// First name is the first word; last name is the remaining words. A single
/// word is used for both, which is what the provider has always received.
#[must_use]
pub fn split_name(full_name: &str) -> (String, String) {
    let mut words = full_name.split_whitespace();
    let first = words.next().unwrap_or(full_name).to_string();
    let rest = words.collect::<Vec<_>>().join(" ");

    if rest.is_empty() {
        (first, full_name.trim().to_string())
    } else {
        (first, rest)
    }
}

/// Mediates between the storefront and the payment gateway
pub struct OrderOrchestrator {
    client: PesapalClient,
    credentials: Arc<dyn CredentialsSource>,
    catalog: Arc<Catalog>,
    settings: OrderSettings,
}

impl OrderOrchestrator {
    /// Create an orchestrator
    #[must_use]
    pub fn new(
        client: PesapalClient,
        credentials: Arc<dyn CredentialsSource>,
        catalog: Arc<Catalog>,
        settings: OrderSettings,
    ) -> Self {
        Self {
            client,
            credentials,
            catalog,
            settings,
        }
    }

    /// Use `notification_id` on subsequent orders
    #[must_use]
    pub fn with_notification_id(mut self, notification_id: impl Into<String>) -> Self {
        self.settings.notification_id = notification_id.into();
        self
    }

    /// Current order defaults
    #[must_use]
    pub const fn settings(&self) -> &OrderSettings {
        &self.settings
    }

    /// The catalog orders are described against
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Submit an order for the selection and return where to send the buyer.
    ///
    /// Never returns a raw gateway error: every failure is classified into an
    /// [`OrderFailure`] with a buyer-safe message.
    pub async fn place_order(&self, selection: &TicketSelection, buyer: &ValidBuyer) -> OrderOutcome {
        let Some(credentials) = self.load_credentials() else {
            return OrderOutcome::Failed(OrderFailure::missing_credentials());
        };

        let order = self.build_order_request(selection, buyer);
        tracing::info!(
            order_id = %order.id,
            amount = order.amount,
            currency = %order.currency,
            tickets = selection.total_tickets(),
            "Submitting payment order"
        );

        let response = match self.client.submit_order(&order, &credentials).await {
            Ok(response) => response,
            Err(err) => {
                let failure = OrderFailure::from(&err);
                tracing::error!(
                    order_id = %order.id,
                    kind = ?failure.kind,
                    error = %err,
                    "Payment order failed"
                );
                return OrderOutcome::Failed(failure);
            }
        };

        let Some(redirect_url) = response.usable_redirect_url() else {
            tracing::error!(
                order_id = %order.id,
                status = ?response.status,
                provider_error = ?response.error,
                "Payment order accepted without a redirect URL"
            );
            return OrderOutcome::Failed(OrderFailure::processing(None));
        };

        tracing::info!(
            order_id = %order.id,
            tracking_id = ?response.order_tracking_id,
            "Payment order placed"
        );

        OrderOutcome::Placed(PlacedOrder {
            order_id: order.id,
            redirect_url: redirect_url.to_string(),
            tracking_id: response.order_tracking_id,
            merchant_reference: response.merchant_reference,
        })
    }

    /// Look up the payment status of a placed order
    ///
    /// # Errors
    ///
    /// Returns a classified `OrderFailure` when credentials are missing or the
    /// provider call fails
    pub async fn order_status(&self, tracking_id: &str) -> Result<OrderStatus, OrderFailure> {
        let credentials = self
            .load_credentials()
            .ok_or_else(OrderFailure::missing_credentials)?;

        self.client
            .get_order_status(tracking_id, &credentials)
            .await
            .map_err(|err| {
                tracing::warn!(tracking_id, error = %err, "Order status lookup failed");
                OrderFailure::from(&err)
            })
    }

    /// Register the URL the provider notifies on payment changes
    ///
    /// # Errors
    ///
    /// Returns a classified `OrderFailure` when credentials are missing or the
    /// provider call fails
    pub async fn register_ipn(
        &self,
        url: &str,
        notification_type: IpnNotificationType,
    ) -> Result<IpnResponse, OrderFailure> {
        let credentials = self
            .load_credentials()
            .ok_or_else(OrderFailure::missing_credentials)?;

        let registration = IpnRegistration {
            url: url.to_string(),
            ipn_notification_type: notification_type,
        };

        self.client
            .register_ipn(&registration, &credentials)
            .await
            .map_err(|err| {
                tracing::warn!(url, error = %err, "IPN registration failed");
                OrderFailure::from(&err)
            })
    }

    /// Build the provider request for one checkout attempt.
    ///
    /// Every call mints a new order id.
    #[must_use]
    pub fn build_order_request(&self, selection: &TicketSelection, buyer: &ValidBuyer) -> OrderRequest {
        let (first_name, last_name) = split_name(buyer.name());

        OrderRequest {
            id: ids::reference("ORD"),
            currency: self.settings.currency.clone(),
            amount: selection.total_price(),
            description: format!("{} - {}", self.catalog.event.title, selection.summary()),
            callback_url: self.settings.callback_url.clone(),
            notification_id: self.settings.notification_id.clone(),
            branch: self.settings.branch.clone(),
            billing_address: BillingAddress {
                email_address: buyer.email().to_string(),
                phone_number: buyer.phone().to_string(),
                country_code: self.settings.country_code.clone(),
                first_name,
                last_name,
                line_1: buyer
                    .address()
                    .unwrap_or(self.settings.default_address.as_str())
                    .to_string(),
            },
        }
    }

    fn load_credentials(&self) -> Option<Credentials> {
        let credentials = self.credentials.load().filter(Credentials::is_complete);
        tracing::debug!(
            has_credentials = credentials.is_some(),
            key_len = credentials.as_ref().map_or(0, |c| c.consumer_key().len()),
            "Payment credentials check"
        );
        if credentials.is_none() {
            tracing::error!("Missing payment credentials");
        }
        credentials
    }
}
