use chrono::NaiveDate;

use crate::models::participant::{Gender, Participant, ParticipantRole, RoleCounts};

/// Which participants must carry a national ID. Varies by flow: airlines
/// require it for every adult passenger, tours and activities do not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdPolicy {
    pub contact: bool,
    pub adults: bool,
}

impl IdPolicy {
    pub fn flight() -> Self {
        Self {
            contact: true,
            adults: true,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticipantField {
    FullName,
    Gender,
    DateOfBirth,
    NationalId,
    Phone,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("at least one participant is required")]
    NoParticipants,
    #[error("missing contact info: {0}")]
    MissingContactInfo(&'static str),
    #[error("invalid contact info: {0}")]
    InvalidContactInfo(&'static str),
    #[error("participant {index} is missing {field}")]
    MissingParticipantField { index: usize, field: &'static str },
    #[error("participant {index} requires a national ID")]
    NationalIdRequired { index: usize },
}

pub struct ParticipantService;

impl ParticipantService {
    /// One blank entry per requested unit, grouped by role in a fixed order
    /// (adults, children, infants, seniors) so indexed updates stay stable.
    /// The first entry overall is the designated contact.
    pub fn initialize(counts: &RoleCounts) -> Vec<Participant> {
        let groups = [
            (ParticipantRole::Adult, counts.adults),
            (ParticipantRole::Child, counts.children),
            (ParticipantRole::Infant, counts.infants),
            (ParticipantRole::Senior, counts.seniors),
        ];
        let mut list = Vec::with_capacity(counts.total() as usize);
        for (role, quantity) in groups {
            for _ in 0..quantity {
                list.push(Participant::blank(role));
            }
        }
        if let Some(first) = list.first_mut() {
            first.is_contact = true;
        }
        list
    }

    /// Immutable positional field update. An out-of-range index returns the
    /// list unchanged.
    pub fn update(
        list: &[Participant],
        index: usize,
        field: ParticipantField,
        value: &str,
    ) -> Vec<Participant> {
        let mut next = list.to_vec();
        if let Some(participant) = next.get_mut(index) {
            match field {
                ParticipantField::FullName => participant.full_name = value.to_string(),
                ParticipantField::Gender => participant.gender = parse_gender(value),
                ParticipantField::DateOfBirth => {
                    participant.date_of_birth = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
                }
                ParticipantField::NationalId => participant.national_id = non_empty(value),
                ParticipantField::Phone => participant.phone = non_empty(value),
                ParticipantField::Email => participant.email = non_empty(value),
            }
        }
        next
    }

    /// The submission-blocking contract: the contact must carry name, phone,
    /// email, gender and date of birth; everyone else name, gender and date
    /// of birth; national IDs per the flow's `IdPolicy`.
    pub fn validate(list: &[Participant], policy: IdPolicy) -> Result<(), ValidationError> {
        if list.is_empty() {
            return Err(ValidationError::NoParticipants);
        }

        for (index, participant) in list.iter().enumerate() {
            let is_contact = index == 0;

            if participant.full_name.trim().is_empty() {
                return Err(if is_contact {
                    ValidationError::MissingContactInfo("full name")
                } else {
                    ValidationError::MissingParticipantField {
                        index,
                        field: "full name",
                    }
                });
            }
            if participant.gender.is_none() {
                return Err(if is_contact {
                    ValidationError::MissingContactInfo("gender")
                } else {
                    ValidationError::MissingParticipantField {
                        index,
                        field: "gender",
                    }
                });
            }
            if participant.date_of_birth.is_none() {
                return Err(if is_contact {
                    ValidationError::MissingContactInfo("date of birth")
                } else {
                    ValidationError::MissingParticipantField {
                        index,
                        field: "date of birth",
                    }
                });
            }

            if is_contact {
                let phone = participant.phone.as_deref().unwrap_or("");
                if phone.trim().is_empty() {
                    return Err(ValidationError::MissingContactInfo("phone"));
                }
                if !is_valid_phone(phone) {
                    return Err(ValidationError::InvalidContactInfo("phone"));
                }
                let email = participant.email.as_deref().unwrap_or("");
                if email.trim().is_empty() {
                    return Err(ValidationError::MissingContactInfo("email"));
                }
                if !is_valid_email(email) {
                    return Err(ValidationError::InvalidContactInfo("email"));
                }
            }

            let needs_id = (is_contact && policy.contact)
                || (policy.adults && participant.role == ParticipantRole::Adult);
            if needs_id && participant.national_id.as_deref().unwrap_or("").trim().is_empty() {
                return Err(ValidationError::NationalIdRequired { index });
            }
        }

        Ok(())
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_gender(value: &str) -> Option<Gender> {
    match value.to_ascii_lowercase().as_str() {
        "male" => Some(Gender::Male),
        "female" => Some(Gender::Female),
        "other" => Some(Gender::Other),
        _ => None,
    }
}

fn is_valid_email(email: &str) -> bool {
    let re = regex::Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    re.is_match(email)
}

fn is_valid_phone(phone: &str) -> bool {
    let re = regex::Regex::new(r"^\+?[0-9]{8,15}$").unwrap();
    re.is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(role: ParticipantRole) -> Participant {
        Participant {
            full_name: "Nguyen Van A".to_string(),
            role,
            gender: Some(Gender::Male),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 20),
            national_id: Some("079090001234".to_string()),
            phone: None,
            email: None,
            is_contact: false,
        }
    }

    fn contact() -> Participant {
        let mut p = filled(ParticipantRole::Adult);
        p.phone = Some("0912345678".to_string());
        p.email = Some("a.nguyen@example.com".to_string());
        p.is_contact = true;
        p
    }

    #[test]
    fn test_initialize_counts_and_contact_flag() {
        let list = ParticipantService::initialize(&RoleCounts {
            adults: 2,
            children: 1,
            ..Default::default()
        });
        assert_eq!(list.len(), 3);
        assert!(list[0].is_contact);
        assert!(!list[1].is_contact);
        assert_eq!(list[0].role, ParticipantRole::Adult);
        assert_eq!(list[2].role, ParticipantRole::Child);
    }

    #[test]
    fn test_initialize_role_grouped_order() {
        let list = ParticipantService::initialize(&RoleCounts {
            adults: 1,
            children: 1,
            infants: 1,
            seniors: 1,
        });
        let roles: Vec<_> = list.iter().map(|p| p.role).collect();
        assert_eq!(
            roles,
            vec![
                ParticipantRole::Adult,
                ParticipantRole::Child,
                ParticipantRole::Infant,
                ParticipantRole::Senior,
            ]
        );
    }

    #[test]
    fn test_update_is_positional_and_immutable() {
        let list = ParticipantService::initialize(&RoleCounts {
            adults: 2,
            ..Default::default()
        });
        let updated =
            ParticipantService::update(&list, 1, ParticipantField::FullName, "Tran Thi B");
        assert_eq!(list[1].full_name, "");
        assert_eq!(updated[1].full_name, "Tran Thi B");
        assert_eq!(updated[0].full_name, "");
    }

    #[test]
    fn test_update_parses_date_of_birth() {
        let list = ParticipantService::initialize(&RoleCounts {
            adults: 1,
            ..Default::default()
        });
        let updated =
            ParticipantService::update(&list, 0, ParticipantField::DateOfBirth, "1985-12-01");
        assert_eq!(
            updated[0].date_of_birth,
            NaiveDate::from_ymd_opt(1985, 12, 1)
        );
        let bad = ParticipantService::update(&list, 0, ParticipantField::DateOfBirth, "tomorrow");
        assert_eq!(bad[0].date_of_birth, None);
    }

    #[test]
    fn test_update_out_of_range_returns_unchanged() {
        let list = ParticipantService::initialize(&RoleCounts {
            adults: 1,
            ..Default::default()
        });
        let updated = ParticipantService::update(&list, 5, ParticipantField::FullName, "X");
        assert_eq!(updated.len(), 1);
        assert_eq!(updated[0].full_name, "");
    }

    #[test]
    fn test_contact_missing_phone_is_rejected() {
        let mut first = contact();
        first.phone = None;
        let result = ParticipantService::validate(&[first], IdPolicy::none());
        assert_eq!(result, Err(ValidationError::MissingContactInfo("phone")));
    }

    #[test]
    fn test_contact_invalid_email_is_rejected() {
        let mut first = contact();
        first.email = Some("not-an-email".to_string());
        let result = ParticipantService::validate(&[first], IdPolicy::none());
        assert_eq!(result, Err(ValidationError::InvalidContactInfo("email")));
    }

    #[test]
    fn test_non_contact_needs_only_name_gender_dob() {
        let mut second = filled(ParticipantRole::Child);
        second.national_id = None;
        let result = ParticipantService::validate(&[contact(), second], IdPolicy::none());
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn test_non_contact_missing_dob_is_rejected() {
        let mut second = filled(ParticipantRole::Child);
        second.date_of_birth = None;
        let result = ParticipantService::validate(&[contact(), second], IdPolicy::none());
        assert_eq!(
            result,
            Err(ValidationError::MissingParticipantField {
                index: 1,
                field: "date of birth",
            })
        );
    }

    #[test]
    fn test_flight_policy_requires_adult_national_id() {
        let mut second = filled(ParticipantRole::Adult);
        second.national_id = None;
        let result = ParticipantService::validate(&[contact(), second], IdPolicy::flight());
        assert_eq!(result, Err(ValidationError::NationalIdRequired { index: 1 }));

        // The same list passes under the tour policy.
        let mut relaxed = filled(ParticipantRole::Adult);
        relaxed.national_id = None;
        assert_eq!(
            ParticipantService::validate(&[contact(), relaxed], IdPolicy::none()),
            Ok(())
        );
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert_eq!(
            ParticipantService::validate(&[], IdPolicy::none()),
            Err(ValidationError::NoParticipants)
        );
    }
}
