use fitclub_core::AccountProfile;

/// The account behind a request's bearer token.
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    profile: AccountProfile,
}

impl AuthenticatedUser {
    pub fn new(profile: AccountProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &AccountProfile {
        &self.profile
    }
}
