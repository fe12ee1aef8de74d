use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use fitclub_core::{AccountProfile, UserId};

/// Which half of a token pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims carried by both access and refresh tokens.
///
/// `username` and `email` ride along with the standard subject so clients can
/// show who is signed in without another request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user id, as a decimal string.
    pub sub: String,
    pub username: String,
    pub email: String,
    pub token_type: TokenType,
    /// Unique token id.
    pub jti: Uuid,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn for_account(
        profile: &AccountProfile,
        token_type: TokenType,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: profile.id.to_string(),
            username: profile.username.clone(),
            email: profile.email.clone(),
            token_type,
            jti: Uuid::new_v4(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Parse the subject back into a user id.
    pub fn user_id(&self) -> Result<UserId, TokenValidationError> {
        self.sub
            .parse()
            .map_err(|_| TokenValidationError::InvalidSubject(self.sub.clone()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("invalid subject claim: {0}")]
    InvalidSubject(String),
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature verification happens before this, in [`crate::TokenService`].
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    claims.user_id()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn profile() -> AccountProfile {
        AccountProfile {
            id: UserId::new(12),
            username: "admin".to_string(),
            email: "admin@club.test".to_string(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn claims_carry_identity() {
        let now = Utc::now();
        let claims = TokenClaims::for_account(&profile(), TokenType::Access, now, now + Duration::minutes(5));
        assert_eq!(claims.sub, "12");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.email, "admin@club.test");
        assert_eq!(claims.user_id().unwrap(), UserId::new(12));
    }

    #[test]
    fn time_window_checks() {
        let now = Utc::now();
        let claims = TokenClaims::for_account(&profile(), TokenType::Access, now, now + Duration::minutes(5));

        assert!(validate_claims(&claims, now).is_ok());
        assert_eq!(
            validate_claims(&claims, now + Duration::minutes(5)),
            Err(TokenValidationError::Expired)
        );
        assert_eq!(
            validate_claims(&claims, now - Duration::minutes(1)),
            Err(TokenValidationError::NotYetValid)
        );

        let inverted = TokenClaims::for_account(&profile(), TokenType::Access, now, now);
        assert_eq!(
            validate_claims(&inverted, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn token_type_serializes_lowercase() {
        let json = serde_json::to_value(TokenType::Refresh).unwrap();
        assert_eq!(json, "refresh");
    }
}
