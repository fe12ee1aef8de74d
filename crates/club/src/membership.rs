use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use fitclub_core::validation::messages;
use fitclub_core::{Entity, FieldErrors, MemberId, MembershipId, TrainerId};

use crate::input::{self, WriteMode};
use crate::{Member, Trainer};

pub const PRICE_MAX_DIGITS: u32 = 10;
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipType {
    Basic,
    Premium,
    Vip,
}

impl MembershipType {
    pub const ALL: [MembershipType; 3] = [Self::Basic, Self::Premium, Self::Vip];

    /// Stored/wire tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Vip => "vip",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Premium => "Premium",
            Self::Vip => "VIP",
        }
    }
}

impl FromStr for MembershipType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| messages::invalid_choice(s))
    }
}

/// Subscription lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    #[default]
    Active,
    Expired,
    Suspended,
}

impl MembershipStatus {
    pub const ALL: [MembershipStatus; 3] = [Self::Active, Self::Expired, Self::Suspended];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Suspended => "suspended",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Suspended => "Suspended",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| messages::invalid_choice(s))
    }
}

/// A membership joined with its member and (optional) personal trainer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub id: MembershipId,
    pub member: Member,
    pub trainer: Option<Trainer>,
    pub membership_type: MembershipType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: Decimal,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    pub fn fields(&self) -> MembershipFields {
        MembershipFields {
            member_id: self.member.id,
            trainer_id: self.trainer.as_ref().map(|t| t.id),
            membership_type: self.membership_type,
            start_date: self.start_date,
            end_date: self.end_date,
            price: self.price,
            status: self.status,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == MembershipStatus::Active
    }
}

impl Entity for Membership {
    type Id = MembershipId;

    fn id(&self) -> MembershipId {
        self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl core::fmt::Display for Membership {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} - {} ({})",
            self.member,
            self.membership_type.label(),
            self.status.as_str()
        )
    }
}

/// Validated column values for inserting or updating a membership.
///
/// `start_date` and `end_date` are independent: no ordering is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipFields {
    pub member_id: MemberId,
    pub trainer_id: Option<TrainerId>,
    pub membership_type: MembershipType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price: Decimal,
    pub status: MembershipStatus,
}

/// Membership write payload as received; `None` means "field absent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipInput {
    pub member_id: Option<MemberId>,
    pub trainer_id: Option<Option<TrainerId>>,
    pub membership_type: Option<MembershipType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub price: Option<Decimal>,
    pub status: Option<MembershipStatus>,
}

impl MembershipInput {
    pub fn resolve(
        self,
        current: Option<&MembershipFields>,
        mode: WriteMode,
    ) -> Result<MembershipFields, FieldErrors> {
        let mut errors = FieldErrors::new();

        let member_id = input::required(&mut errors, "member_id", self.member_id, current.map(|c| c.member_id), mode);
        let trainer_id = input::nullable(self.trainer_id, current.map(|c| c.trainer_id));
        let membership_type = input::required(
            &mut errors,
            "membership_type",
            self.membership_type,
            current.map(|c| c.membership_type),
            mode,
        );
        let start_date = input::required(&mut errors, "start_date", self.start_date, current.map(|c| c.start_date), mode);
        let end_date = input::required(&mut errors, "end_date", self.end_date, current.map(|c| c.end_date), mode);
        let price = input::required(&mut errors, "price", self.price, current.map(|c| c.price), mode)
            .and_then(|p| match validate_price(p) {
                Ok(p) => Some(p),
                Err(msg) => {
                    errors.add("price", msg);
                    None
                }
            });
        let status = self
            .status
            .or(current.map(|c| c.status))
            .unwrap_or_default();

        let (Some(member_id), Some(membership_type), Some(start_date), Some(end_date), Some(price)) =
            (member_id, membership_type, start_date, end_date, price)
        else {
            return Err(errors);
        };
        errors.into_result()?;

        Ok(MembershipFields {
            member_id,
            trainer_id,
            membership_type,
            start_date,
            end_date,
            price,
            status,
        })
    }
}

/// Check a price against `NUMERIC(10, 2)` and quantize it to two places.
///
/// Trailing zeros are ignored, so `"12.500"` is accepted as `12.50`.
pub fn validate_price(price: Decimal) -> Result<Decimal, String> {
    let normalized = price.normalize();
    let decimals = normalized.scale();
    let mantissa_digits = normalized.mantissa().unsigned_abs().to_string().len() as u32;
    let digits = mantissa_digits.max(decimals);
    let whole_digits = digits - decimals;
    let max_whole = PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES;

    if digits > PRICE_MAX_DIGITS {
        return Err(format!(
            "Ensure that there are no more than {PRICE_MAX_DIGITS} digits in total."
        ));
    }
    if decimals > PRICE_DECIMAL_PLACES {
        return Err(format!(
            "Ensure that there are no more than {PRICE_DECIMAL_PLACES} decimal places."
        ));
    }
    if whole_digits > max_whole {
        return Err(format!(
            "Ensure that there are no more than {max_whole} digits before the decimal point."
        ));
    }

    let mut quantized = normalized;
    quantized.rescale(PRICE_DECIMAL_PLACES);
    Ok(quantized)
}

/// Query parameters accepted by the membership lists.
///
/// Every populated criterion must hold (logical AND). `status` and
/// `membership_type` are compared verbatim, so unknown tags match nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipFilter {
    pub member_id: Option<MemberId>,
    pub trainer_id: Option<TrainerId>,
    pub status: Option<String>,
    pub membership_type: Option<String>,
    /// Additionally restrict to `status = active`.
    pub active_only: bool,
}

impl MembershipFilter {
    pub fn for_member(member_id: MemberId) -> Self {
        Self {
            member_id: Some(member_id),
            ..Self::default()
        }
    }

    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }

    pub fn matches(&self, membership: &Membership) -> bool {
        if let Some(member_id) = self.member_id {
            if membership.member.id != member_id {
                return false;
            }
        }
        if let Some(trainer_id) = self.trainer_id {
            if membership.trainer.as_ref().map(|t| t.id) != Some(trainer_id) {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if membership.status.as_str() != status {
                return false;
            }
        }
        if let Some(kind) = &self.membership_type {
            if membership.membership_type.as_str() != kind {
                return false;
            }
        }
        !self.active_only || membership.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitclub_core::{AccountProfile, UserId};

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn member(id: i64) -> Member {
        Member {
            id: MemberId::new(id),
            user: AccountProfile {
                id: UserId::new(id),
                username: format!("member{id}"),
                email: String::new(),
                first_name: String::new(),
                last_name: String::new(),
            },
            phone: "+1555".to_string(),
            date_of_birth: None,
            address: None,
            emergency_contact: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn membership(status: MembershipStatus, kind: MembershipType) -> Membership {
        Membership {
            id: MembershipId::new(1),
            member: member(1),
            trainer: None,
            membership_type: kind,
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
            price: dec("99.00"),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn full_input() -> MembershipInput {
        MembershipInput {
            member_id: Some(MemberId::new(1)),
            trainer_id: None,
            membership_type: Some(MembershipType::Premium),
            start_date: Some(date(2024, 1, 1)),
            end_date: Some(date(2024, 6, 30)),
            price: Some(dec("49.9")),
            status: None,
        }
    }

    #[test]
    fn status_defaults_to_active() {
        let fields = full_input().resolve(None, WriteMode::Create).unwrap();
        assert_eq!(fields.status, MembershipStatus::Active);
        assert_eq!(fields.trainer_id, None);
        assert_eq!(fields.price.to_string(), "49.90");
    }

    #[test]
    fn end_date_before_start_date_is_accepted() {
        let input = MembershipInput {
            start_date: Some(date(2024, 6, 1)),
            end_date: Some(date(2024, 1, 1)),
            ..full_input()
        };
        assert!(input.resolve(None, WriteMode::Create).is_ok());
    }

    #[test]
    fn replace_requires_member_id() {
        let current = full_input().resolve(None, WriteMode::Create).unwrap();
        let input = MembershipInput {
            member_id: None,
            ..full_input()
        };
        let errors = input.resolve(Some(&current), WriteMode::Replace).unwrap_err();
        assert!(errors.contains("member_id"));
    }

    #[test]
    fn patch_can_detach_trainer() {
        let mut current = full_input().resolve(None, WriteMode::Create).unwrap();
        current.trainer_id = Some(TrainerId::new(2));
        let input = MembershipInput {
            trainer_id: Some(None),
            ..Default::default()
        };
        let fields = input.resolve(Some(&current), WriteMode::Patch).unwrap();
        assert_eq!(fields.trainer_id, None);
        assert_eq!(fields.membership_type, MembershipType::Premium);
    }

    #[test]
    fn price_precision_rules() {
        assert_eq!(validate_price(dec("12.500")).unwrap().to_string(), "12.50");
        assert!(validate_price(dec("1.234")).unwrap_err().contains("2 decimal places"));
        assert!(validate_price(dec("123456789")).unwrap_err().contains("before the decimal point"));
        assert!(validate_price(dec("123456789.12")).unwrap_err().contains("10 digits"));
        assert_eq!(validate_price(dec("12345678.99")).unwrap().to_string(), "12345678.99");
        assert_eq!(validate_price(dec("0")).unwrap().to_string(), "0.00");
    }

    #[test]
    fn tags_round_trip_and_reject_unknown_values() {
        assert_eq!("vip".parse::<MembershipType>().unwrap(), MembershipType::Vip);
        assert_eq!(
            "gold".parse::<MembershipType>().unwrap_err(),
            "\"gold\" is not a valid choice."
        );
        assert_eq!("expired".parse::<MembershipStatus>().unwrap().label(), "Expired");
    }

    #[test]
    fn filters_combine_with_and() {
        let m = membership(MembershipStatus::Active, MembershipType::Premium);

        let filter = MembershipFilter {
            status: Some("active".to_string()),
            membership_type: Some("premium".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&m));

        let filter = MembershipFilter {
            status: Some("active".to_string()),
            membership_type: Some("basic".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&m));
    }

    #[test]
    fn active_only_intersects_with_status_filter() {
        let expired = membership(MembershipStatus::Expired, MembershipType::Basic);
        let filter = MembershipFilter {
            status: Some("expired".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&expired));
        assert!(!filter.active().matches(&expired));
    }

    #[test]
    fn trainer_filter_excludes_unassigned() {
        let m = membership(MembershipStatus::Active, MembershipType::Vip);
        let filter = MembershipFilter {
            trainer_id: Some(TrainerId::new(1)),
            ..Default::default()
        };
        assert!(!filter.matches(&m));
    }

    #[test]
    fn display_includes_member_type_and_status() {
        let m = membership(MembershipStatus::Suspended, MembershipType::Vip);
        assert_eq!(m.to_string(), "member1 - VIP (suspended)");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Any two-place amount that fits in NUMERIC(10, 2) is accepted unchanged.
            #[test]
            fn in_range_prices_are_accepted(cents in 0i64..10_000_000_000i64) {
                let price = Decimal::new(cents, 2);
                let validated = validate_price(price).unwrap();
                prop_assert_eq!(validated, price);
                prop_assert_eq!(validated.scale(), 2);
            }

            /// Three significant decimal places are always rejected.
            #[test]
            fn third_decimal_place_is_rejected(mills in 1i64..1_000_000i64) {
                prop_assume!(mills % 10 != 0);
                let price = Decimal::new(mills, 3);
                prop_assert!(validate_price(price).is_err());
            }
        }
    }
}
