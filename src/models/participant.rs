use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantRole {
    Adult,
    Child,
    Infant,
    Senior,
}

impl ParticipantRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantRole::Adult => "adult",
            ParticipantRole::Child => "child",
            ParticipantRole::Infant => "infant",
            ParticipantRole::Senior => "senior",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// One traveller on a booking. The first participant in a list is the
/// designated contact and must carry phone/email.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Participant {
    pub full_name: String,
    pub role: ParticipantRole,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub national_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub is_contact: bool,
}

impl Participant {
    pub fn blank(role: ParticipantRole) -> Self {
        Self {
            full_name: String::new(),
            role,
            gender: None,
            date_of_birth: None,
            national_id: None,
            phone: None,
            email: None,
            is_contact: false,
        }
    }
}

/// Requested quantity per role, used to scaffold the participant form.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct RoleCounts {
    #[serde(default)]
    pub adults: u32,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub infants: u32,
    #[serde(default)]
    pub seniors: u32,
}

impl RoleCounts {
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants + self.seniors
    }
}
