//! Signed token pairs (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use thiserror::Error;

use fitclub_core::AccountProfile;

use crate::claims::{TokenClaims, TokenType, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("expected a {expected} token, got {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error("failed to sign token: {0}")]
    Encode(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(value: TokenValidationError) -> Self {
        match value {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// An access token plus the refresh token that can mint new access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub refresh: String,
    pub access: String,
}

/// Issues, refreshes and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issue a fresh access/refresh pair for an authenticated account.
    pub fn issue_pair(&self, profile: &AccountProfile) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(profile, Utc::now())
    }

    pub fn issue_pair_at(
        &self,
        profile: &AccountProfile,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let refresh = TokenClaims::for_account(profile, TokenType::Refresh, now, expiry(now, self.refresh_ttl)?);
        let access = TokenClaims::for_account(profile, TokenType::Access, now, expiry(now, self.access_ttl)?);
        Ok(TokenPair {
            refresh: self.sign(&refresh)?,
            access: self.sign(&access)?,
        })
    }

    /// Mint a new access token from a valid refresh token.
    ///
    /// The identity claims are copied from the refresh token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.decode_typed(refresh_token, TokenType::Refresh)?;
        let now = Utc::now();
        let access = TokenClaims {
            token_type: TokenType::Access,
            jti: uuid::Uuid::new_v4(),
            iat: now.timestamp(),
            exp: expiry(now, self.access_ttl)?.timestamp(),
            ..claims
        };
        self.sign(&access)
    }

    /// Verify signature and expiry of a token of either type.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.decode(token)
    }

    /// Verify a token and require it to be an access token.
    pub fn validate_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.decode_typed(token, TokenType::Access)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType {
                expected: expected.as_str(),
                found: claims.token_type.as_str(),
            });
        }
        Ok(claims)
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e.to_string()),
            }
        })?;

        validate_claims(&data.claims, Utc::now())?;
        Ok(data.claims)
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> Result<DateTime<Utc>, TokenError> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| TokenError::Encode(format!("token lifetime {ttl} overflows the clock")))
}
