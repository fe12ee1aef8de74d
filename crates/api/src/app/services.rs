//! Application services: the operations behind each route.
//!
//! Handlers parse the request, call one of these, and serialize the result.
//! Services own referential checks ("does this user/member/trainer exist?")
//! so that a bad id is reported against the field that carried it.

use std::sync::Arc;

use fitclub_auth::{TokenClaims, TokenPair, TokenService, UserAccount};
use fitclub_club::{
    Member, MemberInput, Membership, MembershipFilter, MembershipInput, Trainer, TrainerFilter,
    TrainerInput, WriteMode,
};
use fitclub_core::validation::messages;
use fitclub_core::{FieldErrors, MemberId, MembershipId, TrainerId, UserId};
use fitclub_infra::{ClubStore, StoreError};

use crate::app::dto;
use crate::app::errors::ApiError;

/// Shared state handed to every handler via `Extension<Arc<AppServices>>`.
pub struct AppServices {
    pub store: Arc<dyn ClubStore>,
    pub tokens: Arc<TokenService>,
    /// Page size for list endpoints; `None` disables pagination.
    pub page_size: Option<usize>,
}

impl AppServices {
    pub fn new(store: Arc<dyn ClubStore>, tokens: TokenService, page_size: Option<usize>) -> Self {
        Self {
            store,
            tokens: Arc::new(tokens),
            page_size,
        }
    }

    // -------------------------
    // Tokens
    // -------------------------

    pub async fn obtain_token_pair(&self, username: &str, password: String) -> Result<TokenPair, ApiError> {
        let Some(account) = self.store.find_user_by_username(username).await? else {
            tracing::debug!(username, "token requested for unknown user");
            return Err(ApiError::bad_credentials());
        };

        if !check_password(account.clone(), password).await? {
            tracing::debug!(username, "token requested with bad credentials");
            return Err(ApiError::bad_credentials());
        }

        self.tokens
            .issue_pair(&account.profile)
            .map_err(|e| ApiError::Internal(e.to_string()))
    }

    pub fn refresh_access(&self, refresh: &str) -> Result<String, ApiError> {
        self.tokens.refresh(refresh).map_err(|e| {
            tracing::debug!(error = %e, "refresh rejected");
            ApiError::token_not_valid()
        })
    }

    pub fn verify_token(&self, token: &str) -> Result<TokenClaims, ApiError> {
        self.tokens.verify(token).map_err(|e| {
            tracing::debug!(error = %e, "verify rejected");
            ApiError::token_not_valid()
        })
    }

    // -------------------------
    // Trainers
    // -------------------------

    pub async fn list_trainers(&self, filter: &TrainerFilter) -> Result<Vec<Trainer>, ApiError> {
        Ok(self.store.list_trainers(filter).await?)
    }

    pub async fn get_trainer(&self, id: TrainerId) -> Result<Trainer, ApiError> {
        self.store.get_trainer(id).await?.ok_or_else(ApiError::not_found)
    }

    pub async fn create_trainer(&self, input: TrainerInput, read_errors: FieldErrors) -> Result<Trainer, ApiError> {
        let read_errors = self.check_user(input.user_id, read_errors).await?;
        let fields = dto::combine(read_errors, input.resolve(None, WriteMode::Create))?;
        let user_id = fields.user_id;
        self.store
            .insert_trainer(fields)
            .await
            .map_err(|e| reference_error(e, user_id.get()))
    }

    pub async fn update_trainer(
        &self,
        id: TrainerId,
        input: TrainerInput,
        read_errors: FieldErrors,
        mode: WriteMode,
    ) -> Result<Trainer, ApiError> {
        let current = self.get_trainer(id).await?.fields();
        let read_errors = self.check_user(input.user_id, read_errors).await?;
        let fields = dto::combine(read_errors, input.resolve(Some(&current), mode))?;
        let user_id = fields.user_id;
        self.store
            .update_trainer(id, fields)
            .await
            .map_err(|e| reference_error(e, user_id.get()))?
            .ok_or_else(ApiError::not_found)
    }

    pub async fn delete_trainer(&self, id: TrainerId) -> Result<(), ApiError> {
        if self.store.delete_trainer(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found())
        }
    }

    // -------------------------
    // Members
    // -------------------------

    pub async fn list_members(&self) -> Result<Vec<Member>, ApiError> {
        Ok(self.store.list_members().await?)
    }

    pub async fn get_member(&self, id: MemberId) -> Result<Member, ApiError> {
        self.store.get_member(id).await?.ok_or_else(ApiError::not_found)
    }

    pub async fn create_member(&self, input: MemberInput, read_errors: FieldErrors) -> Result<Member, ApiError> {
        let read_errors = self.check_user(input.user_id, read_errors).await?;
        let fields = dto::combine(read_errors, input.resolve(None, WriteMode::Create))?;
        let user_id = fields.user_id;
        self.store
            .insert_member(fields)
            .await
            .map_err(|e| reference_error(e, user_id.get()))
    }

    pub async fn update_member(
        &self,
        id: MemberId,
        input: MemberInput,
        read_errors: FieldErrors,
        mode: WriteMode,
    ) -> Result<Member, ApiError> {
        let current = self.get_member(id).await?.fields();
        let read_errors = self.check_user(input.user_id, read_errors).await?;
        let fields = dto::combine(read_errors, input.resolve(Some(&current), mode))?;
        let user_id = fields.user_id;
        self.store
            .update_member(id, fields)
            .await
            .map_err(|e| reference_error(e, user_id.get()))?
            .ok_or_else(ApiError::not_found)
    }

    pub async fn delete_member(&self, id: MemberId) -> Result<(), ApiError> {
        if self.store.delete_member(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found())
        }
    }

    /// Every membership of one member, newest first.
    pub async fn member_memberships(&self, id: MemberId) -> Result<Vec<Membership>, ApiError> {
        self.get_member(id).await?;
        Ok(self.store.list_member_memberships(id).await?)
    }

    // -------------------------
    // Memberships
    // -------------------------

    pub async fn list_memberships(&self, filter: &MembershipFilter) -> Result<Vec<Membership>, ApiError> {
        Ok(self.store.list_memberships(filter).await?)
    }

    pub async fn get_membership(&self, id: MembershipId) -> Result<Membership, ApiError> {
        self.store.get_membership(id).await?.ok_or_else(ApiError::not_found)
    }

    pub async fn create_membership(
        &self,
        input: MembershipInput,
        read_errors: FieldErrors,
    ) -> Result<Membership, ApiError> {
        let read_errors = self.check_membership_refs(&input, read_errors).await?;
        let fields = dto::combine(read_errors, input.resolve(None, WriteMode::Create))?;
        let (member_id, trainer_id) = (fields.member_id, fields.trainer_id);
        self.store
            .insert_membership(fields)
            .await
            .map_err(|e| membership_reference_error(e, member_id, trainer_id))
    }

    pub async fn update_membership(
        &self,
        id: MembershipId,
        input: MembershipInput,
        read_errors: FieldErrors,
        mode: WriteMode,
    ) -> Result<Membership, ApiError> {
        let current = self.get_membership(id).await?.fields();
        let read_errors = self.check_membership_refs(&input, read_errors).await?;
        let fields = dto::combine(read_errors, input.resolve(Some(&current), mode))?;
        let (member_id, trainer_id) = (fields.member_id, fields.trainer_id);
        self.store
            .update_membership(id, fields)
            .await
            .map_err(|e| membership_reference_error(e, member_id, trainer_id))?
            .ok_or_else(ApiError::not_found)
    }

    pub async fn delete_membership(&self, id: MembershipId) -> Result<(), ApiError> {
        if self.store.delete_membership(id).await? {
            Ok(())
        } else {
            Err(ApiError::not_found())
        }
    }

    // -------------------------
    // Reference checks
    // -------------------------

    async fn check_user(&self, user_id: Option<UserId>, mut errors: FieldErrors) -> Result<FieldErrors, ApiError> {
        if let Some(user_id) = user_id {
            if self.store.get_user(user_id).await?.is_none() {
                errors.add("user_id", messages::missing_object(user_id));
            }
        }
        Ok(errors)
    }

    async fn check_membership_refs(
        &self,
        input: &MembershipInput,
        mut errors: FieldErrors,
    ) -> Result<FieldErrors, ApiError> {
        if let Some(member_id) = input.member_id {
            if self.store.get_member(member_id).await?.is_none() {
                errors.add("member_id", messages::missing_object(member_id));
            }
        }
        if let Some(Some(trainer_id)) = input.trainer_id {
            if self.store.get_trainer(trainer_id).await?.is_none() {
                errors.add("trainer_id", messages::missing_object(trainer_id));
            }
        }
        Ok(errors)
    }
}

/// Verify a password off the async executor; argon2 is deliberately slow.
async fn check_password(account: UserAccount, password: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || account.authenticate(&password))
        .await
        .map_err(|e| ApiError::Internal(format!("password check panicked: {e}")))
}

/// A reference that vanished between the check and the write.
fn reference_error(err: StoreError, user_id: i64) -> ApiError {
    match err {
        StoreError::MissingReference { field } => ApiError::field(field, messages::missing_object(user_id)),
        other => other.into(),
    }
}

fn membership_reference_error(err: StoreError, member_id: MemberId, trainer_id: Option<TrainerId>) -> ApiError {
    match err {
        StoreError::MissingReference { field: "member_id" } => {
            ApiError::field("member_id", messages::missing_object(member_id))
        }
        StoreError::MissingReference { field: "trainer_id" } => match trainer_id {
            Some(trainer_id) => ApiError::field("trainer_id", messages::missing_object(trainer_id)),
            None => ApiError::Internal("trainer reference failed without a trainer".to_string()),
        },
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use fitclub_auth::NewUserRequest;
    use fitclub_infra::InMemoryClubStore;

    fn services() -> AppServices {
        AppServices::new(
            Arc::new(InMemoryClubStore::new()),
            TokenService::new(b"services-test", Duration::minutes(5), Duration::hours(1)),
            None,
        )
    }

    async fn user(svc: &AppServices, username: &str) -> UserAccount {
        let new_user = NewUserRequest {
            username: username.to_string(),
            password: "pw-123456".to_string(),
            ..Default::default()
        }
        .into_new_user()
        .unwrap();
        svc.store.create_user(new_user).await.unwrap()
    }

    #[tokio::test]
    async fn unknown_user_id_is_reported_on_the_field() {
        let svc = services();
        let input = TrainerInput {
            user_id: Some(UserId::new(42)),
            specialization: Some("Yoga".to_string()),
            experience_years: Some(2),
            phone: Some("+1".to_string()),
            bio: None,
        };
        let Err(ApiError::Validation(errors)) = svc.create_trainer(input, FieldErrors::new()).await else {
            panic!("expected validation error");
        };
        assert_eq!(errors.messages("user_id"), ["Invalid pk \"42\" - object does not exist."]);
    }

    #[tokio::test]
    async fn second_trainer_profile_for_account_is_rejected() {
        let svc = services();
        let account = user(&svc, "coach").await;
        let input = TrainerInput {
            user_id: Some(account.id()),
            specialization: Some("Yoga".to_string()),
            experience_years: Some(2),
            phone: Some("+1".to_string()),
            bio: None,
        };
        svc.create_trainer(input.clone(), FieldErrors::new()).await.unwrap();

        let Err(ApiError::Validation(errors)) = svc.create_trainer(input, FieldErrors::new()).await else {
            panic!("expected validation error");
        };
        assert_eq!(errors.messages("user_id"), ["trainer with this user already exists."]);
    }

    #[tokio::test]
    async fn credentials_are_checked() {
        let svc = services();
        user(&svc, "desk").await;

        assert!(svc.obtain_token_pair("desk", "pw-123456".to_string()).await.is_ok());
        assert!(matches!(
            svc.obtain_token_pair("desk", "wrong".to_string()).await,
            Err(ApiError::Unauthorized { .. })
        ));
        assert!(matches!(
            svc.obtain_token_pair("nobody", "pw-123456".to_string()).await,
            Err(ApiError::Unauthorized { .. })
        ));
    }

    #[tokio::test]
    async fn member_memberships_requires_member() {
        let svc = services();
        assert!(matches!(
            svc.member_memberships(MemberId::new(1)).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
