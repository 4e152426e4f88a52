//! Local ticket records handed to the buyer after an order is placed.
//!
//! Records live only in the response; nothing observes the actual payment,
//! so every ticket stays `pending`.

use crate::catalog::{EventInfo, TicketSelection};
use crate::ids;
use crate::orchestrator::PlacedOrder;
use crate::validation::ValidBuyer;
use serde::{Deserialize, Serialize};

/// Payment state printed on a ticket
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Order submitted, payment not confirmed
    #[default]
    Pending,
}

/// One admission, one per purchased unit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TicketRecord {
    /// `TKT-…` ticket number
    pub id: String,
    /// Merchant order reference
    pub order_id: String,
    /// Event title
    pub event_title: String,
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
    /// Ticket type display name
    pub ticket_type: String,
    /// Unit price
    pub price: f64,
    /// Buyer name
    pub holder_name: String,
    /// Buyer email
    pub holder_email: String,
    /// Buyer phone
    pub holder_phone: String,
    /// Payment state
    pub payment_status: PaymentStatus,
    /// Hosted checkout page for completing payment
    pub payment_link: String,
    /// Payload for the ticket's QR code
    pub qr_code: String,
}

/// Materialize one pending ticket per purchased unit, in selection order
#[must_use]
pub fn issue_pending_tickets(
    event: &EventInfo,
    order: &PlacedOrder,
    selection: &TicketSelection,
    buyer: &ValidBuyer,
) -> Vec<TicketRecord> {
    selection
        .lines()
        .iter()
        .flat_map(|line| std::iter::repeat(&line.ticket_type).take(line.quantity as usize))
        .map(|ticket_type| TicketRecord {
            id: ids::reference("TKT"),
            order_id: order.order_id.clone(),
            event_title: event.title.clone(),
            artist: event.artist.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            venue: event.venue.clone(),
            location: event.location.clone(),
            ticket_type: ticket_type.name.clone(),
            price: ticket_type.price,
            holder_name: buyer.name().to_string(),
            holder_email: buyer.email().to_string(),
            holder_phone: buyer.phone().to_string(),
            payment_status: PaymentStatus::Pending,
            payment_link: order.redirect_url.clone(),
            qr_code: ids::reference("QR"),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, SelectionRequest};
    use crate::validation::BuyerInfo;
    use std::collections::HashSet;

    #[test]
    fn test_one_pending_ticket_per_unit() {
        let catalog = Catalog::default();
        let selection = catalog
            .resolve(&[
                SelectionRequest {
                    ticket_type: "regular".to_string(),
                    quantity: 2,
                },
                SelectionRequest {
                    ticket_type: "vip".to_string(),
                    quantity: 1,
                },
            ])
            .unwrap();
        let buyer = BuyerInfo {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "0700123456".to_string(),
            address: None,
        }
        .validate()
        .unwrap();
        let order = PlacedOrder {
            order_id: "ORD-1".to_string(),
            redirect_url: "https://pay.example/abc".to_string(),
            tracking_id: Some("T1".to_string()),
            merchant_reference: Some("ORD-1".to_string()),
        };

        let tickets = issue_pending_tickets(&catalog.event, &order, &selection, &buyer);

        let types: Vec<&str> = tickets.iter().map(|t| t.ticket_type.as_str()).collect();
        assert_eq!(types, ["Regular", "Regular", "VIP"]);
        assert!(tickets.iter().all(|t| t.payment_status == PaymentStatus::Pending));
        assert!(tickets.iter().all(|t| t.payment_link == "https://pay.example/abc"));
        assert!(tickets.iter().all(|t| t.order_id == "ORD-1"));

        let ids: HashSet<&str> = tickets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), 3);
        assert!(tickets.iter().all(|t| t.id.starts_with("TKT-")));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(PaymentStatus::Pending).unwrap(),
            serde_json::json!("pending")
        );
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
        assert!(serde_json::from_value::<PaymentStatus>(serde_json::json!("confirmed")).is_err());
    }
}
