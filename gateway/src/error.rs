//! Error types for the Pesapal gateway client

use thiserror::Error;

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Errors that can occur when talking to the payment provider.
///
/// Each variant is produced at the point of failure (missing configuration,
/// token request, timer, transport, HTTP status, body decoding) so callers
/// can classify failures without inspecting message text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Consumer key or secret is not configured
    #[error("Missing payment gateway credentials")]
    MissingCredentials,

    /// Token request was rejected or could not be completed
    #[error("Authentication failed: {message}")]
    Auth {
        /// HTTP status code, when the provider answered at all
        status: Option<u16>,
        /// Provider message or transport failure description
        message: String,
    },

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Provider answered with a non-2xx status
    #[error("Gateway error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Message extracted from the error body
        message: String,
        /// Raw response body, kept for logs
        raw_body: String,
    },

    /// Connection-level failure (DNS, reset, abort)
    #[error("Request failed: {message}")]
    Network {
        /// Transport error description
        message: String,
    },

    /// A 2xx body could not be decoded
    #[error("Response parsing failed: {0}")]
    ResponseParse(String),
}

impl GatewayError {
    /// HTTP status code associated with the failure, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } => *status,
            Self::Api { status, .. } => Some(*status),
            Self::MissingCredentials
            | Self::Timeout
            | Self::Network { .. }
            | Self::ResponseParse(_) => None,
        }
    }

    /// Whether the provider refused our identity, either while requesting a
    /// token or on an authenticated call.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Auth { .. } | Self::Api { status: 401 | 403, .. }
        )
    }

    /// Map a reqwest transport error into a timeout or network failure.
    pub(crate) fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network {
                message: err.to_string(),
            }
        }
    }

    /// Wrap any failure that happened while obtaining a token.
    pub(crate) fn into_auth(self) -> Self {
        match self {
            Self::Auth { .. } => self,
            other => Self::Auth {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}
