use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::tour::AddOn;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TimeSlot {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Capacity {
    #[serde(deserialize_with = "deserialize_rounded_u16")]
    pub minimum: u16,
    #[serde(deserialize_with = "deserialize_rounded_u16")]
    pub maximum: u16,
}

// Seeded catalog data stores capacities as floats; round up on the way in.
fn deserialize_rounded_u16<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                Ok(f.ceil() as u16)
            } else if let Some(i) = n.as_u64() {
                Ok(i as u16)
            } else {
                Ok(0)
            }
        }
        _ => Ok(0),
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Activity {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_id: Option<ObjectId>,
    pub description: String,
    pub activity_types: Vec<String>,
    pub price_per_person: i64,
    pub duration_minutes: u16,
    #[serde(default)]
    pub daily_time_slots: Vec<TimeSlot>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    pub capacity: Capacity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
