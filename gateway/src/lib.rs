//! # Pesapal Gateway Client
//!
//! Rust client for the Pesapal v3 hosted-checkout API: token requests,
//! order submission, IPN registration and transaction status queries.
//!
//! ## Example
//!
//! ```no_run
//! use boxoffice_gateway::{Credentials, PesapalClient};
//! use boxoffice_gateway::types::{BillingAddress, OrderRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::from_env().ok_or("missing credentials")?;
//!     let client = PesapalClient::builder().sandbox().build()?;
//!
//!     let order = OrderRequest {
//!         id: "ORD-1".to_string(),
//!         currency: "UGX".to_string(),
//!         amount: 10_000.0,
//!         description: "1x Regular".to_string(),
//!         callback_url: "https://shop.example/payment/callback".to_string(),
//!         notification_id: String::new(),
//!         branch: "Concert Tickets".to_string(),
//!         billing_address: BillingAddress {
//!             email_address: "jane@example.com".to_string(),
//!             phone_number: "+256700000000".to_string(),
//!             country_code: "UG".to_string(),
//!             first_name: "Jane".to_string(),
//!             last_name: "Doe".to_string(),
//!             line_1: "Kampala, Uganda".to_string(),
//!         },
//!     };
//!
//!     // Authenticates on first use, then reuses the cached token
//!     let response = client.submit_order(&order, &credentials).await?;
//!     println!("Checkout at {:?}", response.redirect_url);
//!     Ok(())
//! }
//! ```
//!
//! ## Behavior
//!
//! - Every call is a single attempt bounded by a 10 second timeout
//! - Bearer tokens are cached and reused until five minutes before expiry
//! - Failures come back as a tagged [`GatewayError`]

pub mod client;
pub mod credentials;
pub mod error;
pub mod token;
pub mod types;

// Re-export main types for convenience
pub use client::{PesapalClient, PesapalClientBuilder, DEFAULT_TIMEOUT, LIVE_BASE_URL, SANDBOX_BASE_URL};
pub use credentials::{Credentials, CredentialsSource, EnvCredentials};
pub use error::GatewayError;
pub use token::{Clock, FixedClock, SystemClock, Token, TokenCache};
pub use types::{
    BillingAddress, IpnNotificationType, IpnRegistration, IpnResponse, OrderRequest,
    OrderResponse, OrderStatus, ProviderError,
};
