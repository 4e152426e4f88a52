//! Buyer input validation.
//!
//! Everything here runs before the orchestrator, so malformed input never
//! reaches the payment provider.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;

#[allow(clippy::expect_used)] // Pattern is a literal
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern compiles"));

#[allow(clippy::expect_used)] // Pattern is a literal
static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[\d\s\-()]{10,}$").expect("phone pattern compiles"));

/// Rejected buyer input or ticket selection
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Name is blank
    #[error("Name is required")]
    EmptyName,

    /// Email does not look like an address
    #[error("Please enter a valid email")]
    InvalidEmail,

    /// Phone has fewer than ten digits/separators or stray characters
    #[error("Please enter a valid phone number")]
    InvalidPhone,

    /// No tickets selected
    #[error("Select at least one ticket")]
    EmptySelection,

    /// Ticket type id not in the catalog
    #[error("Unknown ticket type: {0}")]
    UnknownTicketType(String),

    /// More tickets requested than offered
    #[error("Only {available} {ticket_type} tickets available, {requested} requested")]
    QuantityUnavailable {
        /// Ticket type id
        ticket_type: String,
        /// Requested quantity
        requested: u32,
        /// Available quantity
        available: u32,
    },
}

/// Buyer contact details as submitted
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyerInfo {
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
    /// Street address, optional
    #[serde(default)]
    pub address: Option<String>,
}

impl BuyerInfo {
    /// Validate and normalize (trimmed fields, blank address dropped)
    ///
    /// # Errors
    ///
    /// Returns the first failing field as a `ValidationError`
    pub fn validate(self) -> Result<ValidBuyer, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let email = self.email.trim();
        if !EMAIL.is_match(email) {
            return Err(ValidationError::InvalidEmail);
        }

        let phone = self.phone.trim();
        if !PHONE.is_match(phone) {
            return Err(ValidationError::InvalidPhone);
        }

        let address = self
            .address
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty());

        Ok(ValidBuyer {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            address,
        })
    }
}

/// Buyer details that passed validation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidBuyer {
    name: String,
    email: String,
    phone: String,
    address: Option<String>,
}

impl ValidBuyer {
    /// Full name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Email address
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Phone number
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Street address, if given
    #[must_use]
    pub fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}
