use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
    Voided,
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
            TicketStatus::Voided => "voided",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Other => "other",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
    AutoApproved,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
            ApprovalStatus::AutoApproved => "auto_approved",
        }
    }
}

/// One customer visit. Totals are frozen at close; only the approval
/// columns may change afterwards.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SaleTicket {
    #[schema(example = 501)]
    pub id: u64,

    #[schema(example = 1)]
    pub store_id: u64,

    #[schema(example = "T-20260101-0042")]
    pub ticket_number: String,

    #[schema(example = "Walk-in", nullable = true)]
    pub customer_name: Option<String>,

    /// Primary technician shown on the ticket card.
    #[schema(example = 7)]
    pub technician_id: u64,

    /// open | closed | voided
    #[schema(example = "open")]
    pub status: String,

    #[schema(example = 85.0)]
    pub subtotal: f64,

    #[schema(example = 10.0)]
    pub discount: f64,

    #[schema(example = 75.0)]
    pub total: f64,

    /// cash | card | other, set at close
    #[schema(example = "card", nullable = true)]
    pub payment_method: Option<String>,

    #[schema(example = 15.0)]
    pub tip_customer: f64,

    #[schema(example = 5.0)]
    pub tip_receptionist: f64,

    /// pending | approved | rejected | auto_approved, set at close
    #[schema(example = "pending", nullable = true)]
    pub approval_status: Option<String>,

    #[schema(example = "2026-01-02T18:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub approval_deadline: Option<DateTime<Utc>>,

    #[schema(example = 3, nullable = true)]
    pub approved_by: Option<u64>,

    #[schema(example = "2026-01-01T19:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub approved_at: Option<DateTime<Utc>>,

    #[schema(example = "Wrong tip amount", nullable = true)]
    pub rejection_reason: Option<String>,

    #[schema(example = "2026-01-01T17:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(example = "2026-01-01T18:00:00Z", format = "date-time", value_type = String, nullable = true)]
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct TicketItem {
    #[schema(example = 9001)]
    pub id: u64,

    #[schema(example = 501)]
    pub ticket_id: u64,

    #[schema(example = 12)]
    pub service_id: u64,

    /// Technician who performed this line item.
    #[schema(example = 7)]
    pub technician_id: u64,

    #[schema(example = 1)]
    pub quantity: u32,

    #[schema(example = 45.0)]
    pub unit_price: f64,

    #[schema(example = 45.0)]
    pub line_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_to_their_column_values() {
        for status in [TicketStatus::Open, TicketStatus::Closed, TicketStatus::Voided] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
        for payment in [PaymentMethod::Cash, PaymentMethod::Card, PaymentMethod::Other] {
            let json = serde_json::to_string(&payment).unwrap();
            assert_eq!(json, format!("\"{}\"", payment.as_str()));
        }
        for approval in [
            ApprovalStatus::Pending,
            ApprovalStatus::Approved,
            ApprovalStatus::Rejected,
            ApprovalStatus::AutoApproved,
        ] {
            let json = serde_json::to_string(&approval).unwrap();
            assert_eq!(json, format!("\"{}\"", approval.as_str()));
        }
    }

    #[test]
    fn payment_method_parses_from_request_bodies() {
        let parsed: PaymentMethod = serde_json::from_str("\"card\"").unwrap();
        assert_eq!(parsed, PaymentMethod::Card);
        assert!(serde_json::from_str::<PaymentMethod>("\"check\"").is_err());
    }
}

