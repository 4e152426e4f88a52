//! Consumer key/secret pair supplied to every authenticated call.

use serde::Serialize;
use std::fmt;

/// Environment variable holding the consumer key
pub const CONSUMER_KEY_VAR: &str = "PESAPAL_CONSUMER_KEY";

/// Environment variable holding the consumer secret
pub const CONSUMER_SECRET_VAR: &str = "PESAPAL_CONSUMER_SECRET";

/// Merchant credentials for the token endpoint.
///
/// Serializes to the exact body expected by `api/Auth/RequestToken`.
/// The `Debug` output never includes the secret.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    consumer_key: String,
    consumer_secret: String,
}

impl Credentials {
    /// Create a credentials pair
    #[must_use]
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    /// Read credentials from `PESAPAL_CONSUMER_KEY` / `PESAPAL_CONSUMER_SECRET`.
    ///
    /// Returns `None` unless both variables are set and non-blank.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let key = std::env::var(CONSUMER_KEY_VAR).ok()?;
        let secret = std::env::var(CONSUMER_SECRET_VAR).ok()?;
        let credentials = Self::new(key, secret);
        credentials.is_complete().then_some(credentials)
    }

    /// Both fields are present and non-blank
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.consumer_key.trim().is_empty() && !self.consumer_secret.trim().is_empty()
    }

    /// The consumer key
    #[must_use]
    pub fn consumer_key(&self) -> &str {
        &self.consumer_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key_len", &self.consumer_key.len())
            .field("consumer_secret", &"<redacted>")
            .finish()
    }
}

/// Where credentials come from at call time.
///
/// The orchestrator asks on every order so a missing secret is reported as a
/// configuration error rather than captured once at start-up.
pub trait CredentialsSource: Send + Sync {
    /// Current credentials, or `None` when not configured
    fn load(&self) -> Option<Credentials>;
}

/// Reads credentials from the process environment on each call
#[derive(Clone, Copy, Debug, Default)]
pub struct EnvCredentials;

impl CredentialsSource for EnvCredentials {
    fn load(&self) -> Option<Credentials> {
        Credentials::from_env()
    }
}

impl CredentialsSource for Credentials {
    fn load(&self) -> Option<Credentials> {
        self.is_complete().then(|| self.clone())
    }
}
