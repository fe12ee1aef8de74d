use chrono::{DateTime, Utc};
use serde::Serialize;

use fitclub_club::{Trainer, TrainerInput};
use fitclub_core::{FieldErrors, TrainerId};

use crate::app::errors::ApiError;

use super::{FieldReader, UserPayload};

#[derive(Debug, Clone, Serialize)]
pub struct TrainerPayload {
    pub id: TrainerId,
    pub user: UserPayload,
    pub specialization: String,
    pub experience_years: i32,
    pub phone: String,
    pub bio: Option<String>,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Trainer> for TrainerPayload {
    fn from(trainer: &Trainer) -> Self {
        Self {
            id: trainer.id,
            user: UserPayload::from(&trainer.user),
            specialization: trainer.specialization.clone(),
            experience_years: trainer.experience_years,
            phone: trainer.phone.clone(),
            bio: trainer.bio.clone(),
            full_name: trainer.full_name(),
            created_at: trainer.created_at,
            updated_at: trainer.updated_at,
        }
    }
}

/// Read a trainer write payload; type errors are returned alongside the input.
pub fn read_trainer(body: &[u8]) -> Result<(TrainerInput, FieldErrors), ApiError> {
    let mut r = FieldReader::from_body(body)?;
    let user_id = r.pk("user_id");
    let specialization = r.string("specialization");
    let years = r.integer("experience_years");
    let phone = r.string("phone");
    let bio = r.nullable_string("bio");

    let mut errors = r.into_errors();
    let experience_years = years.and_then(|years| match i32::try_from(years) {
        Ok(v) => Some(v),
        Err(_) if years > 0 => {
            errors.add("experience_years", format!("Ensure this value is less than or equal to {}.", i32::MAX));
            None
        }
        Err(_) => {
            errors.add("experience_years", format!("Ensure this value is greater than or equal to {}.", i32::MIN));
            None
        }
    });

    let input = TrainerInput {
        user_id,
        specialization,
        experience_years,
        phone,
        bio,
    };
    Ok((input, errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitclub_core::{AccountProfile, UserId};

    #[test]
    fn payload_flattens_display_name() {
        let now = Utc::now();
        let trainer = Trainer {
            id: TrainerId::new(3),
            user: AccountProfile {
                id: UserId::new(9),
                username: "coach".to_string(),
                email: "coach@club.test".to_string(),
                first_name: String::new(),
                last_name: String::new(),
            },
            specialization: "Yoga Instructor".to_string(),
            experience_years: 6,
            phone: "+15550001".to_string(),
            bio: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(TrainerPayload::from(&trainer)).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["user"]["username"], "coach");
        assert_eq!(json["full_name"], "coach");
        assert!(json["bio"].is_null());
    }

    #[test]
    fn read_collects_inputs_and_type_errors() {
        let (input, errors) = read_trainer(
            br#"{"user_id": 4, "specialization": "Boxing", "experience_years": 99999999999, "bio": null}"#,
        )
        .unwrap();
        assert_eq!(input.user_id, Some(UserId::new(4)));
        assert_eq!(input.specialization.as_deref(), Some("Boxing"));
        assert_eq!(input.experience_years, None);
        assert_eq!(input.bio, Some(None));
        assert!(errors.contains("experience_years"));
    }
}
