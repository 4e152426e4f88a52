//! Request and response bodies for the Pesapal v3 API

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Billing details attached to an order
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BillingAddress {
    /// Buyer email
    pub email_address: String,
    /// Buyer phone number
    pub phone_number: String,
    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Street address
    pub line_1: String,
}

/// Body of `api/Transactions/SubmitOrderRequest`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct OrderRequest {
    /// Merchant reference, unique per checkout attempt
    pub id: String,
    /// ISO 4217 currency code
    pub currency: String,
    /// Amount in display units of `currency`
    pub amount: f64,
    /// Human readable order summary
    pub description: String,
    /// Where the provider sends the buyer after checkout
    pub callback_url: String,
    /// Registered IPN identifier
    pub notification_id: String,
    /// Merchant branch label
    pub branch: String,
    /// Buyer details
    pub billing_address: BillingAddress,
}

/// Error object the provider embeds in otherwise successful bodies
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderError {
    /// Error category
    #[serde(default, deserialize_with = "lenient_string")]
    pub error_type: Option<String>,
    /// Provider error code
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,
    /// Human readable message
    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,
}

/// Response of `api/Auth/RequestToken`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token, absent when the request was rejected
    #[serde(default)]
    pub token: Option<String>,
    /// Token expiry as sent by the provider
    #[serde(default)]
    pub expiry_date: Option<String>,
    /// Provider status string
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// Provider message
    #[serde(default)]
    pub message: Option<String>,
    /// Embedded error
    #[serde(default, deserialize_with = "lenient_error")]
    pub error: Option<ProviderError>,
}

/// Response of `api/Transactions/SubmitOrderRequest`
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderResponse {
    /// Provider-assigned order identifier
    #[serde(default)]
    pub order_tracking_id: Option<String>,
    /// Echo of our order id
    #[serde(default)]
    pub merchant_reference: Option<String>,
    /// Hosted checkout page
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// Provider status string
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// Embedded error
    #[serde(default, deserialize_with = "lenient_error")]
    pub error: Option<ProviderError>,
}

impl OrderResponse {
    /// The redirect URL when present and non-blank
    #[must_use]
    pub fn usable_redirect_url(&self) -> Option<&str> {
        self.redirect_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

/// How the provider delivers instant payment notifications
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum IpnNotificationType {
    /// Query string on a GET request
    #[default]
    Get,
    /// JSON body on a POST request
    Post,
}

/// Body of `api/URLSetup/RegisterIPN`
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IpnRegistration {
    /// Endpoint the provider will call
    pub url: String,
    /// Delivery method
    #[serde(rename = "ipnNotificationType")]
    pub ipn_notification_type: IpnNotificationType,
}

/// Response of `api/URLSetup/RegisterIPN`
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct IpnResponse {
    /// Provider status string
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
    /// Free text description
    #[serde(default)]
    pub description: Option<String>,
    /// Identifier to send as `notification_id` on orders
    #[serde(default)]
    pub ipn_id: Option<String>,
    /// Registered URL
    #[serde(default)]
    pub url: Option<String>,
    /// Registration timestamp
    #[serde(default)]
    pub created_date: Option<String>,
    /// Numeric IPN status
    #[serde(default)]
    pub ipn_status: Option<i64>,
    /// Embedded error
    #[serde(default, deserialize_with = "lenient_error")]
    pub error: Option<ProviderError>,
}

/// Response of `api/Transactions/GetTransactionStatus`
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct OrderStatus {
    /// Payment channel used by the buyer
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Amount paid
    #[serde(default)]
    pub amount: Option<f64>,
    /// When the transaction was created
    #[serde(default)]
    pub created_date: Option<String>,
    /// Provider confirmation code
    #[serde(default)]
    pub confirmation_code: Option<String>,
    /// Provider-assigned order identifier
    #[serde(default)]
    pub order_tracking_id: Option<String>,
    /// `COMPLETED`, `FAILED`, `INVALID` or `REVERSED`
    #[serde(default)]
    pub payment_status_description: Option<String>,
    /// Free text description
    #[serde(default)]
    pub description: Option<String>,
    /// Provider message
    #[serde(default)]
    pub message: Option<String>,
    /// Masked payer account
    #[serde(default)]
    pub payment_account: Option<String>,
    /// Callback URL from the order
    #[serde(default)]
    pub call_back_url: Option<String>,
    /// Numeric payment status
    #[serde(default)]
    pub status_code: Option<i64>,
    /// Echo of our order id
    #[serde(default)]
    pub merchant_reference: Option<String>,
    /// Account number, when applicable
    #[serde(default)]
    pub account_number: Option<String>,
    /// Provider payment status code
    #[serde(default)]
    pub payment_status_code: Option<String>,
    /// ISO 4217 currency code
    #[serde(default)]
    pub currency: Option<String>,
    /// Embedded error
    #[serde(default, deserialize_with = "lenient_error")]
    pub error: Option<ProviderError>,
    /// Provider status string
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: Option<String>,
}

/// Provider status and error strings arrive as strings, numbers or null
/// depending on the endpoint. Anything else is treated as absent.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// The embedded error is an object on v3 endpoints but a bare string on
/// some responses. A bare string becomes the error message.
fn lenient_error<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<ProviderError>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(message) => Some(ProviderError {
            message: Some(message),
            ..ProviderError::default()
        }),
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        other => Some(ProviderError {
            message: Some(other.to_string()),
            ..ProviderError::default()
        }),
    })
}
