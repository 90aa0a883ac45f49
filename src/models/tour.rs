use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// Optional flat-fee extra (airport pickup, travel insurance, ...) charged
/// per selected quantity on top of the per-role fares.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddOn {
    pub name: String,
    pub fee: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tour {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<ObjectId>,
    pub description: String,
    pub duration_days: u16,
    pub adult_price: i64,
    pub child_price: i64,
    pub infant_price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub senior_price: Option<i64>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    #[serde(default)]
    pub departure_dates: Vec<DateTime>,
    pub available_seats: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
