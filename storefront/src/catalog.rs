//! The event on sale and its ticket types.
//!
//! Ticket counts are informational only: there is no reservation, so
//! `available` bounds a single order but is never decremented.

use crate::validation::ValidationError;
use serde::{Deserialize, Serialize};

/// Event metadata shown to buyers and printed on tickets
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    /// Event title
    pub title: String,
    /// Headline artist
    pub artist: String,
    /// Display date
    pub date: String,
    /// Display time range
    pub time: String,
    /// Venue name
    pub venue: String,
    /// City / region
    pub location: String,
    /// Marketing blurb
    pub description: String,
}

/// A purchasable ticket category
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketType {
    /// Stable identifier used in selections (`regular`, `vip`, ...)
    pub id: String,
    /// Display name used in order descriptions
    pub name: String,
    /// Unit price in the order currency
    pub price: f64,
    /// What the ticket includes
    pub description: String,
    /// Upper bound for a single order
    pub available: u32,
}

/// Event plus ticket types, in display order
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// The event
    pub event: EventInfo,
    /// Ticket types on offer
    pub ticket_types: Vec<TicketType>,
}

impl Catalog {
    /// Look up a ticket type by id
    #[must_use]
    pub fn ticket_type(&self, id: &str) -> Option<&TicketType> {
        self.ticket_types.iter().find(|t| t.id == id)
    }

    /// Resolve raw selection lines against the catalog.
    ///
    /// Zero quantities are dropped, repeated ids are merged into their first
    /// occurrence, and the caller's order is preserved.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for unknown ids, quantities above the
    /// available count, or a selection with no tickets left.
    pub fn resolve(&self, lines: &[SelectionRequest]) -> Result<TicketSelection, ValidationError> {
        let mut resolved: Vec<SelectionLine> = Vec::new();

        for line in lines.iter().filter(|l| l.quantity > 0) {
            let ticket_type = self
                .ticket_type(&line.ticket_type)
                .ok_or_else(|| ValidationError::UnknownTicketType(line.ticket_type.clone()))?;

            match resolved.iter_mut().find(|r| r.ticket_type.id == ticket_type.id) {
                Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
                None => resolved.push(SelectionLine {
                    ticket_type: ticket_type.clone(),
                    quantity: line.quantity,
                }),
            }
        }

        if resolved.is_empty() {
            return Err(ValidationError::EmptySelection);
        }

        if let Some(line) = resolved.iter().find(|l| l.quantity > l.ticket_type.available) {
            return Err(ValidationError::QuantityUnavailable {
                ticket_type: line.ticket_type.id.clone(),
                requested: line.quantity,
                available: line.ticket_type.available,
            });
        }

        Ok(TicketSelection { lines: resolved })
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            event: EventInfo {
                title: "Summer Music Festival 2024".to_string(),
                artist: "The Electric Waves".to_string(),
                date: "Saturday, July 20, 2024".to_string(),
                time: "7:00 PM - 11:00 PM".to_string(),
                venue: "Madison Square Garden".to_string(),
                location: "New York, NY".to_string(),
                description: "Join us for an unforgettable night of music featuring The Electric \
                              Waves with special guests."
                    .to_string(),
            },
            ticket_types: vec![
                TicketType {
                    id: "regular".to_string(),
                    name: "Regular".to_string(),
                    price: 10_000.0,
                    description: "General admission with standard seating".to_string(),
                    available: 500,
                },
                TicketType {
                    id: "vip".to_string(),
                    name: "VIP".to_string(),
                    price: 100_000.0,
                    description: "Premium seating, meet & greet, exclusive merchandise".to_string(),
                    available: 100,
                },
                TicketType {
                    id: "gate".to_string(),
                    name: "At Gate".to_string(),
                    price: 15_000.0,
                    description: "Purchase at venue entrance (subject to availability)".to_string(),
                    available: 50,
                },
            ],
        }
    }
}

/// One requested line, as sent by the buyer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Ticket type id
    pub ticket_type: String,
    /// Number of tickets
    pub quantity: u32,
}

/// A resolved selection line
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionLine {
    /// Ticket type snapshot
    pub ticket_type: TicketType,
    /// Number of tickets, always > 0
    pub quantity: u32,
}

/// Validated, non-empty ticket selection in the buyer's order
#[derive(Clone, Debug, PartialEq)]
pub struct TicketSelection {
    lines: Vec<SelectionLine>,
}

impl TicketSelection {
    /// Selected lines, in selection order
    #[must_use]
    pub fn lines(&self) -> &[SelectionLine] {
        &self.lines
    }

    /// Total number of tickets
    #[must_use]
    pub fn total_tickets(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Sum of price x quantity
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.ticket_type.price * f64::from(l.quantity))
            .sum()
    }

    /// `"2x Regular, 1x VIP"`
    #[must_use]
    pub fn summary(&self) -> String {
        self.lines
            .iter()
            .map(|l| format!("{}x {}", l.quantity, l.ticket_type.name))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
