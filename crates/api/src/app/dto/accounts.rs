use serde::Serialize;

use fitclub_core::validation::messages;
use fitclub_core::{AccountProfile, FieldErrors, UserId};

use crate::app::errors::ApiError;

use super::FieldReader;

/// Public view of an account, nested in trainer/member payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPayload {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&AccountProfile> for UserPayload {
    fn from(profile: &AccountProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
        }
    }
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// `POST /auth/token/` body.
pub fn read_credentials(body: &[u8]) -> Result<Credentials, ApiError> {
    let mut reader = FieldReader::from_body(body)?;
    let username = reader.string("username");
    let password = reader.string("password");

    let mut errors = reader.into_errors();
    let username = non_blank(&mut errors, "username", username);
    let password = non_blank(&mut errors, "password", password);

    match (username, password) {
        (Some(username), Some(password)) if errors.is_empty() => Ok(Credentials { username, password }),
        _ => Err(ApiError::Validation(errors)),
    }
}

/// `POST /auth/token/refresh/` and `/verify/` bodies: a single token field.
pub fn read_token(body: &[u8], field: &str) -> Result<String, ApiError> {
    let mut reader = FieldReader::from_body(body)?;
    let token = reader.string(field);
    let mut errors = reader.into_errors();
    match non_blank(&mut errors, field, token) {
        Some(token) if errors.is_empty() => Ok(token),
        _ => Err(ApiError::Validation(errors)),
    }
}

fn non_blank(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    if errors.contains(field) {
        return None;
    }
    match value {
        None => {
            errors.add(field, messages::REQUIRED);
            None
        }
        Some(v) if v.trim().is_empty() => {
            errors.add(field, messages::BLANK);
            None
        }
        Some(v) => Some(v),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_need_both_fields() {
        let err = read_credentials(br#"{"username": "   "}"#).unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.messages("username"), [messages::BLANK]);
        assert_eq!(errors.messages("password"), [messages::REQUIRED]);
    }

    #[test]
    fn token_field_is_read() {
        assert_eq!(read_token(br#"{"refresh": "abc"}"#, "refresh").unwrap(), "abc");
        assert!(read_token(b"{}", "token").is_err());
    }
}
