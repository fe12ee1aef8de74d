use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use fitclub_club::{Member, MemberInput};
use fitclub_core::{FieldErrors, MemberId};

use crate::app::errors::ApiError;

use super::{FieldReader, UserPayload};

#[derive(Debug, Clone, Serialize)]
pub struct MemberPayload {
    pub id: MemberId,
    pub user: UserPayload,
    pub phone: String,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Member> for MemberPayload {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id,
            user: UserPayload::from(&member.user),
            phone: member.phone.clone(),
            date_of_birth: member.date_of_birth,
            address: member.address.clone(),
            emergency_contact: member.emergency_contact.clone(),
            full_name: member.full_name(),
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

pub fn read_member(body: &[u8]) -> Result<(MemberInput, FieldErrors), ApiError> {
    let mut r = FieldReader::from_body(body)?;
    let input = MemberInput {
        user_id: r.pk("user_id"),
        phone: r.string("phone"),
        date_of_birth: r.nullable_date("date_of_birth"),
        address: r.nullable_string("address"),
        emergency_contact: r.nullable_string("emergency_contact"),
    };
    Ok((input, r.into_errors()))
}
