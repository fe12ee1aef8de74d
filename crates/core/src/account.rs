//! Public profile of a user account.
//!
//! Trainers and members are one-to-one extensions of an account; the
//! account itself (credentials, activity flag) is owned by `fitclub-auth`.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// The account fields exposed alongside every trainer/member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl AccountProfile {
    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Full name, or the username when no name is recorded.
    pub fn display_name(&self) -> String {
        let full = self.full_name();
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: &str) -> AccountProfile {
        AccountProfile {
            id: UserId::new(1),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(profile("Jane", "Doe").display_name(), "Jane Doe");
    }

    #[test]
    fn display_name_handles_single_name() {
        assert_eq!(profile("Jane", "").display_name(), "Jane");
        assert_eq!(profile("", "Doe").display_name(), "Doe");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(profile("", "").display_name(), "jdoe");
    }
}
