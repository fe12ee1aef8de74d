use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use fitclub_core::{AccountProfile, Entity, FieldErrors, MemberId, UserId};

use crate::input::{self, WriteMode};

pub const PHONE_MAX_LEN: usize = 20;
pub const EMERGENCY_CONTACT_MAX_LEN: usize = 200;

/// A club member profile joined with its user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub user: AccountProfile,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn full_name(&self) -> String {
        self.user.display_name()
    }

    pub fn fields(&self) -> MemberFields {
        MemberFields {
            user_id: self.user.id,
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth,
            address: self.address.clone(),
            emergency_contact: self.emergency_contact.clone(),
        }
    }
}

impl Entity for Member {
    type Id = MemberId;

    fn id(&self) -> MemberId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl core::fmt::Display for Member {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.full_name())
    }
}

/// Validated column values for inserting or updating a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberFields {
    pub user_id: UserId,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
}

/// Member write payload as received; `None` means "field absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberInput {
    pub user_id: Option<UserId>,
    pub phone: Option<String>,
    pub date_of_birth: Option<Option<NaiveDate>>,
    pub address: Option<Option<String>>,
    pub emergency_contact: Option<Option<String>>,
}

impl MemberInput {
    pub fn resolve(
        self,
        current: Option<&MemberFields>,
        mode: WriteMode,
    ) -> Result<MemberFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let user_id = input::required_on_create(&mut errors, "user_id", self.user_id, current.map(|c| c.user_id));

        let phone = input::required(&mut errors, "phone", self.phone, current.map(|c| c.phone.clone()), mode)
            .and_then(|p| input::text(&mut errors, "phone", p, PHONE_MAX_LEN));

        let date_of_birth = input::nullable(self.date_of_birth, current.map(|c| c.date_of_birth));

        let address = input::nullable(self.address, current.map(|c| c.address.clone()));
        let address = input::optional_text(&mut errors, "address", address, None);

        let emergency_contact = input::nullable(
            self.emergency_contact,
            current.map(|c| c.emergency_contact.clone()),
        );
        let emergency_contact = input::optional_text(
            &mut errors,
            "emergency_contact",
            emergency_contact,
            Some(EMERGENCY_CONTACT_MAX_LEN),
        );

        let (Some(user_id), Some(phone)) = (user_id, phone) else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(MemberFields {
            user_id,
            phone,
            date_of_birth,
            address,
            emergency_contact,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn current() -> MemberFields {
        MemberFields {
            user_id: UserId::new(4),
            phone: "+15550002".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 17),
            address: Some("1 Main St".to_string()),
            emergency_contact: None,
        }
    }

    #[test]
    fn create_needs_user_and_phone_only() {
        let errors = MemberInput::default()
            .resolve(None, WriteMode::Create)
            .unwrap_err();
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["phone", "user_id"]);
    }

    #[test]
    fn create_with_minimal_payload() {
        let input = MemberInput {
            user_id: Some(UserId::new(4)),
            phone: Some(" +15550002 ".to_string()),
            ..Default::default()
        };
        let fields = input.resolve(None, WriteMode::Create).unwrap();
        assert_eq!(fields.phone, "+15550002");
        assert_eq!(fields.date_of_birth, None);
        assert_eq!(fields.address, None);
    }

    #[test]
    fn patch_clears_date_of_birth_with_null() {
        let input = MemberInput {
            date_of_birth: Some(None),
            ..Default::default()
        };
        let fields = input.resolve(Some(&current()), WriteMode::Patch).unwrap();
        assert_eq!(fields.date_of_birth, None);
        assert_eq!(fields.address.as_deref(), Some("1 Main St"));
    }

    #[test]
    fn emergency_contact_length_is_bounded() {
        let input = MemberInput {
            emergency_contact: Some(Some("c".repeat(EMERGENCY_CONTACT_MAX_LEN + 1))),
            ..Default::default()
        };
        let errors = input.resolve(Some(&current()), WriteMode::Patch).unwrap_err();
        assert!(errors.contains("emergency_contact"));
    }
}
