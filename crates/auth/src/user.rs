//! User accounts: the credentials behind every trainer and member profile.

use chrono::{DateTime, Utc};
use serde::Serialize;

use fitclub_core::{AccountProfile, FieldErrors, UserId, validation::messages};

use crate::password::{self, PasswordError};

pub const USERNAME_MAX_LEN: usize = 150;
pub const NAME_MAX_LEN: usize = 150;
pub const EMAIL_MAX_LEN: usize = 254;

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserAccount {
    pub profile: AccountProfile,
    #[serde(skip)]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

impl UserAccount {
    pub fn id(&self) -> UserId {
        self.profile.id
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }

    /// True when the account may sign in with `password`.
    pub fn authenticate(&self, password: &str) -> bool {
        self.is_active && password::verify_password(password, &self.password_hash)
    }
}

/// A validated account ready to be inserted; the password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub is_active: bool,
}

/// Raw account details, e.g. from the admin CLI.
#[derive(Debug, Clone, Default)]
pub struct NewUserRequest {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NewUserError {
    #[error("invalid account: {0}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl NewUserRequest {
    /// Validate the request and hash its password.
    pub fn into_new_user(self) -> Result<NewUser, NewUserError> {
        let mut errors = FieldErrors::new();

        let username = self.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", messages::BLANK);
        } else if username.chars().count() > USERNAME_MAX_LEN {
            errors.add("username", messages::max_length(USERNAME_MAX_LEN));
        } else if !username.chars().all(is_username_char) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let email = self.email.trim().to_string();
        if email.chars().count() > EMAIL_MAX_LEN {
            errors.add("email", messages::max_length(EMAIL_MAX_LEN));
        } else if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if value.chars().count() > NAME_MAX_LEN {
                errors.add(field, messages::max_length(NAME_MAX_LEN));
            }
        }

        if self.password.is_empty() {
            errors.add("password", messages::BLANK);
        }

        if !errors.is_empty() {
            return Err(NewUserError::Invalid(errors));
        }

        Ok(NewUser {
            username,
            email,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            password_hash: password::hash_password(&self.password)?,
            is_active: true,
        })
    }
}

fn is_username_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_')
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}
