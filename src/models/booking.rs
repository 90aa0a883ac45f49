use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::participant::Participant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    Tour,
    Flight,
    Activity,
}

impl ProductKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductKind::Tour => "tour",
            ProductKind::Flight => "flight",
            ProductKind::Activity => "activity",
        }
    }

    pub fn from_path(segment: &str) -> Option<Self> {
        match segment {
            "tour" => Some(ProductKind::Tour),
            "flight" => Some(ProductKind::Flight),
            "activity" => Some(ProductKind::Activity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Momo,
    Zalopay,
}

impl PaymentMethod {
    /// Gateway methods leave the site for a hosted checkout page; everything
    /// else settles offline and books synchronously.
    pub fn is_gateway(&self) -> bool {
        matches!(self, PaymentMethod::Momo | PaymentMethod::Zalopay)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Momo => "momo",
            PaymentMethod::Zalopay => "zalopay",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub product: ProductKind,
    pub item_id: ObjectId,
    pub item_title: String,
    pub participants: Vec<Participant>,
    pub subtotal: i64,
    pub discount_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub idempotency_key: String,
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

/// Staged booking snapshot bridging the redirect to a hosted gateway page.
/// One slot per (user, product); deleted when the return flow resolves it or
/// by the TTL index once `expires_at` passes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PendingBooking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub product: ProductKind,
    pub item_id: ObjectId,
    pub item_title: String,
    pub participants: Vec<Participant>,
    pub subtotal: i64,
    pub discount_amount: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_code: Option<String>,
    pub total: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub payment_method: PaymentMethod,
    pub order_id: String,
    pub request_id: String,
    pub idempotency_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub travel_date: Option<String>,
    pub expires_at: DateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}

/// Money captured, booking not recorded. Escalated to support by hand; never
/// retried automatically.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReconciliationFailure {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub provider: PaymentMethod,
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub amount: i64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
}
