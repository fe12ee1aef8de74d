//! `fitclub-auth`: account credentials and signed tokens.
//!
//! This crate is decoupled from HTTP and storage: it hashes and verifies
//! passwords and issues/validates JWT pairs. Looking accounts up is the
//! store's job.

pub mod claims;
pub mod password;
pub mod token;
pub mod user;

pub use claims::{TokenClaims, TokenType, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use token::{TokenError, TokenPair, TokenService};
pub use user::{NewUser, NewUserError, NewUserRequest, UserAccount};
