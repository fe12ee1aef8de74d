use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use fitclub_club::{Membership, MembershipInput, MembershipStatus, MembershipType};
use fitclub_core::{FieldErrors, MembershipId};

use crate::app::errors::ApiError;

use super::{FieldReader, MemberPayload, TrainerPayload};

/// Full membership payload with nested member and trainer.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipPayload {
    pub id: MembershipId,
    pub member: MemberPayload,
    pub membership_type: MembershipType,
    pub membership_type_display: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: String,
    pub status: MembershipStatus,
    pub status_display: &'static str,
    pub trainer: Option<TrainerPayload>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Membership> for MembershipPayload {
    fn from(m: &Membership) -> Self {
        Self {
            id: m.id,
            member: MemberPayload::from(&m.member),
            membership_type: m.membership_type,
            membership_type_display: m.membership_type.label(),
            start_date: m.start_date,
            end_date: m.end_date,
            price: format_price(m),
            status: m.status,
            status_display: m.status.label(),
            trainer: m.trainer.as_ref().map(TrainerPayload::from),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Flat list row: relations appear only as display names.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipListItem {
    pub id: MembershipId,
    pub member_name: String,
    pub membership_type: MembershipType,
    pub membership_type_display: &'static str,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: String,
    pub status: MembershipStatus,
    pub status_display: &'static str,
    pub trainer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Membership> for MembershipListItem {
    fn from(m: &Membership) -> Self {
        Self {
            id: m.id,
            member_name: m.member.full_name(),
            membership_type: m.membership_type,
            membership_type_display: m.membership_type.label(),
            start_date: m.start_date,
            end_date: m.end_date,
            price: format_price(m),
            status: m.status,
            status_display: m.status.label(),
            trainer_name: m.trainer.as_ref().map(|t| t.full_name()),
            created_at: m.created_at,
        }
    }
}

fn format_price(m: &Membership) -> String {
    format!("{:.2}", m.price)
}

pub fn read_membership(body: &[u8]) -> Result<(MembershipInput, FieldErrors), ApiError> {
    let mut r = FieldReader::from_body(body)?;
    let input = MembershipInput {
        member_id: r.pk("member_id"),
        trainer_id: r.nullable_pk("trainer_id"),
        membership_type: r.choice("membership_type"),
        start_date: r.date("start_date"),
        end_date: r.date("end_date"),
        price: r.decimal("price"),
        status: r.choice("status"),
    };
    Ok((input, r.into_errors()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitclub_club::{Member, Trainer};
    use fitclub_core::{AccountProfile, MemberId, TrainerId, UserId};
    use rust_decimal::Decimal;

    fn profile(id: i64, username: &str, first: &str, last: &str) -> AccountProfile {
        AccountProfile {
            id: UserId::new(id),
            username: username.to_string(),
            email: String::new(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    fn membership(with_trainer: bool) -> Membership {
        let now = Utc::now();
        let member = Member {
            id: MemberId::new(1),
            user: profile(1, "jdoe", "Jane", "Doe"),
            phone: "+1".to_string(),
            date_of_birth: None,
            address: None,
            emergency_contact: None,
            created_at: now,
            updated_at: now,
        };
        let trainer = with_trainer.then(|| Trainer {
            id: TrainerId::new(2),
            user: profile(2, "coach", "", ""),
            specialization: "Boxing".to_string(),
            experience_years: 3,
            phone: "+2".to_string(),
            bio: None,
            created_at: now,
            updated_at: now,
        });
        Membership {
            id: MembershipId::new(5),
            member,
            trainer,
            membership_type: MembershipType::Vip,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            price: Decimal::new(120, 0),
            status: MembershipStatus::Suspended,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn list_item_is_flat() {
        let json = serde_json::to_value(MembershipListItem::from(&membership(true))).unwrap();
        assert_eq!(json["member_name"], "Jane Doe");
        assert_eq!(json["trainer_name"], "coach");
        assert_eq!(json["membership_type"], "vip");
        assert_eq!(json["membership_type_display"], "VIP");
        assert_eq!(json["status_display"], "Suspended");
        assert_eq!(json["price"], "120.00");
        assert!(json.get("member").is_none());
        assert!(json.get("trainer").is_none());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn list_item_without_trainer_has_null_name() {
        let json = serde_json::to_value(MembershipListItem::from(&membership(false))).unwrap();
        assert!(json["trainer_name"].is_null());
    }

    #[test]
    fn full_payload_nests_relations() {
        let json = serde_json::to_value(MembershipPayload::from(&membership(true))).unwrap();
        assert_eq!(json["member"]["user"]["username"], "jdoe");
        assert_eq!(json["trainer"]["specialization"], "Boxing");
        assert_eq!(json["start_date"], "2024-01-01");

        let json = serde_json::to_value(MembershipPayload::from(&membership(false))).unwrap();
        assert!(json["trainer"].is_null());
    }

    #[test]
    fn read_membership_fields() {
        let (input, errors) = read_membership(
            br#"{"member_id": 1, "trainer_id": null, "membership_type": "premium",
                "start_date": "2024-01-01", "end_date": "2024-12-31", "price": "49.99"}"#,
        )
        .unwrap();
        assert!(errors.is_empty());
        assert_eq!(input.member_id, Some(MemberId::new(1)));
        assert_eq!(input.trainer_id, Some(None));
        assert_eq!(input.membership_type, Some(MembershipType::Premium));
        assert_eq!(input.price, Some(Decimal::new(4999, 2)));
        assert_eq!(input.status, None);
    }
}
