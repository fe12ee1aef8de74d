use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fitclub_core::{AccountProfile, Entity, FieldErrors, TrainerId, UserId};

use crate::input::{self, WriteMode};

pub const SPECIALIZATION_MAX_LEN: usize = 200;
pub const PHONE_MAX_LEN: usize = 20;

/// A trainer profile joined with its user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    pub id: TrainerId,
    pub user: AccountProfile,
    pub specialization: String,
    pub experience_years: i32,
    pub phone: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trainer {
    /// Name shown for this trainer in listings.
    pub fn full_name(&self) -> String {
        self.user.display_name()
    }

    /// The writable columns of this record.
    pub fn fields(&self) -> TrainerFields {
        TrainerFields {
            user_id: self.user.id,
            specialization: self.specialization.clone(),
            experience_years: self.experience_years,
            phone: self.phone.clone(),
            bio: self.bio.clone(),
        }
    }
}

impl Entity for Trainer {
    type Id = TrainerId;

    fn id(&self) -> TrainerId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl core::fmt::Display for Trainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} - {}", self.full_name(), self.specialization)
    }
}

/// Validated column values for inserting or updating a trainer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerFields {
    pub user_id: UserId,
    pub specialization: String,
    pub experience_years: i32,
    pub phone: String,
    pub bio: Option<String>,
}

/// Trainer write payload as received; `None` means "field absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainerInput {
    pub user_id: Option<UserId>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub phone: Option<String>,
    pub bio: Option<Option<String>>,
}

impl TrainerInput {
    /// Validate the payload and merge it over `current` according to `mode`.
    pub fn resolve(
        self,
        current: Option<&TrainerFields>,
        mode: WriteMode,
    ) -> Result<TrainerFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let user_id = input::required_on_create(&mut errors, "user_id", self.user_id, current.map(|c| c.user_id));

        let specialization = input::required(
            &mut errors,
            "specialization",
            self.specialization,
            current.map(|c| c.specialization.clone()),
            mode,
        )
        .and_then(|s| input::text(&mut errors, "specialization", s, SPECIALIZATION_MAX_LEN));

        let experience_years = input::required(
            &mut errors,
            "experience_years",
            self.experience_years,
            current.map(|c| c.experience_years),
            mode,
        );

        let phone = input::required(&mut errors, "phone", self.phone, current.map(|c| c.phone.clone()), mode)
            .and_then(|p| input::text(&mut errors, "phone", p, PHONE_MAX_LEN));

        let bio = input::nullable(self.bio, current.map(|c| c.bio.clone()));
        let bio = input::optional_text(&mut errors, "bio", bio, None);

        let (Some(user_id), Some(specialization), Some(experience_years), Some(phone)) =
            (user_id, specialization, experience_years, phone)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(TrainerFields {
            user_id,
            specialization,
            experience_years,
            phone,
            bio,
        })
    }
}

/// Query parameters accepted by the trainer list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainerFilter {
    /// Case-insensitive substring of the specialization.
    pub specialization: Option<String>,
}

impl TrainerFilter {
    pub fn matches(&self, trainer: &Trainer) -> bool {
        match &self.specialization {
            Some(needle) => trainer
                .specialization
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitclub_core::validation::messages;

    fn full_input() -> TrainerInput {
        TrainerInput {
            user_id: Some(UserId::new(1)),
            specialization: Some("Yoga Instructor".to_string()),
            experience_years: Some(5),
            phone: Some("+15550001".to_string()),
            bio: None,
        }
    }

    fn sample_trainer() -> Trainer {
        Trainer {
            id: TrainerId::new(3),
            user: AccountProfile {
                id: UserId::new(1),
                username: "coach".to_string(),
                email: "coach@example.com".to_string(),
                first_name: "Anna".to_string(),
                last_name: "Petrova".to_string(),
            },
            specialization: "Yoga Instructor".to_string(),
            experience_years: 5,
            phone: "+15550001".to_string(),
            bio: Some("Certified".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn create_requires_all_mandatory_fields() {
        let errors = TrainerInput::default()
            .resolve(None, WriteMode::Create)
            .unwrap_err();

        for field in ["user_id", "specialization", "experience_years", "phone"] {
            assert_eq!(errors.messages(field), [messages::REQUIRED.to_string()], "{field}");
        }
        assert!(!errors.contains("bio"));
    }

    #[test]
    fn create_defaults_bio_to_none() {
        let fields = full_input().resolve(None, WriteMode::Create).unwrap();
        assert_eq!(fields.bio, None);
        assert_eq!(fields.specialization, "Yoga Instructor");
    }

    #[test]
    fn replace_keeps_user_and_bio_when_absent() {
        let current = sample_trainer().fields();
        let input = TrainerInput {
            user_id: None,
            ..full_input()
        };

        let fields = input.resolve(Some(&current), WriteMode::Replace).unwrap();

        assert_eq!(fields.user_id, current.user_id);
        assert_eq!(fields.bio.as_deref(), Some("Certified"));
    }

    #[test]
    fn replace_still_requires_mandatory_fields() {
        let current = sample_trainer().fields();
        let input = TrainerInput {
            phone: None,
            ..full_input()
        };

        let errors = input.resolve(Some(&current), WriteMode::Replace).unwrap_err();
        assert!(errors.contains("phone"));
    }

    #[test]
    fn patch_changes_only_given_fields_and_can_clear_bio() {
        let current = sample_trainer().fields();
        let input = TrainerInput {
            experience_years: Some(9),
            bio: Some(None),
            ..Default::default()
        };

        let fields = input.resolve(Some(&current), WriteMode::Patch).unwrap();

        assert_eq!(fields.experience_years, 9);
        assert_eq!(fields.bio, None);
        assert_eq!(fields.phone, current.phone);
    }

    #[test]
    fn overlong_specialization_is_rejected() {
        let input = TrainerInput {
            specialization: Some("x".repeat(SPECIALIZATION_MAX_LEN + 1)),
            ..full_input()
        };
        let errors = input.resolve(None, WriteMode::Create).unwrap_err();
        assert_eq!(errors.messages("specialization"), [messages::max_length(200)]);
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let trainer = sample_trainer();
        let filter = TrainerFilter {
            specialization: Some("yoga".to_string()),
        };
        assert!(filter.matches(&trainer));

        let filter = TrainerFilter {
            specialization: Some("boxing".to_string()),
        };
        assert!(!filter.matches(&trainer));
    }

    #[test]
    fn display_combines_name_and_specialization() {
        assert_eq!(sample_trainer().to_string(), "Anna Petrova - Yoga Instructor");
    }
}
