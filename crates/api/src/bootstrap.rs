//! Startup seeding of the first login account.

use thiserror::Error;

use fitclub_auth::{NewUserError, NewUserRequest, UserAccount};
use fitclub_infra::{BootstrapAccount, ClubStore, StoreError};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("bootstrap account rejected: {0}")]
    Account(#[from] NewUserError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Create the configured account unless one with that username exists.
///
/// Returns the new account, or `None` when it was already there.
pub async fn seed_account(
    store: &dyn ClubStore,
    account: &BootstrapAccount,
) -> Result<Option<UserAccount>, BootstrapError> {
    if store.find_user_by_username(&account.username).await?.is_some() {
        tracing::debug!(username = %account.username, "bootstrap account already present");
        return Ok(None);
    }

    let new_user = NewUserRequest {
        username: account.username.clone(),
        password: account.password.clone(),
        ..Default::default()
    }
    .into_new_user()?;
    let created = store.create_user(new_user).await?;
    tracing::info!(user_id = %created.id(), username = created.username(), "bootstrap account created");
    Ok(Some(created))
}
