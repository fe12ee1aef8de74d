//! Club persistence: accounts, trainers, members and memberships.
//!
//! `ClubStore` is the seam between HTTP controllers and storage. Two
//! implementations exist:
//!
//! - [`PostgresClubStore`]: the production store (sqlx + PostgreSQL).
//! - [`InMemoryClubStore`]: a dev/test store enforcing the same uniqueness,
//!   cascade and set-null rules as the SQL schema.
//!
//! Every read returns fully hydrated records: trainers and members carry their
//! account profile, memberships carry their member and (optional) trainer.
//! Lists are ordered newest first.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use fitclub_auth::{NewUser, UserAccount};
use fitclub_club::{
    Member, MemberFields, Membership, MembershipFields, MembershipFilter, Trainer, TrainerFields,
    TrainerFilter,
};
use fitclub_core::{MemberId, MembershipId, TrainerId, UserId};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryClubStore;
pub use postgres::PostgresClubStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness rule rejected the write.
    #[error("conflict on {field}: {message}")]
    Conflict { field: &'static str, message: String },

    /// A write referenced a row that does not exist.
    #[error("{field} references a missing record")]
    MissingReference { field: &'static str },

    #[error("storage failure: {0}")]
    Database(String),
}

impl StoreError {
    pub(crate) fn user_taken(profile: &'static str) -> Self {
        StoreError::Conflict {
            field: "user_id",
            message: format!("{profile} with this user already exists."),
        }
    }

    pub(crate) fn username_taken() -> Self {
        StoreError::Conflict {
            field: "username",
            message: "A user with that username already exists.".to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage operations for the club.
///
/// `update_*` return `Ok(None)` and `delete_*` return `Ok(false)` when the id
/// does not exist.
#[async_trait]
pub trait ClubStore: Send + Sync {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserAccount>;
    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>>;

    async fn list_trainers(&self, filter: &TrainerFilter) -> StoreResult<Vec<Trainer>>;
    async fn get_trainer(&self, id: TrainerId) -> StoreResult<Option<Trainer>>;
    async fn insert_trainer(&self, fields: TrainerFields) -> StoreResult<Trainer>;
    async fn update_trainer(&self, id: TrainerId, fields: TrainerFields) -> StoreResult<Option<Trainer>>;
    /// Memberships coached by the trainer keep existing with no trainer.
    async fn delete_trainer(&self, id: TrainerId) -> StoreResult<bool>;

    async fn list_members(&self) -> StoreResult<Vec<Member>>;
    async fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>>;
    async fn insert_member(&self, fields: MemberFields) -> StoreResult<Member>;
    async fn update_member(&self, id: MemberId, fields: MemberFields) -> StoreResult<Option<Member>>;
    /// Deletes the member's memberships too.
    async fn delete_member(&self, id: MemberId) -> StoreResult<bool>;

    async fn list_member_memberships(&self, id: MemberId) -> StoreResult<Vec<Membership>> {
        self.list_memberships(&MembershipFilter::for_member(id)).await
    }

    async fn list_memberships(&self, filter: &MembershipFilter) -> StoreResult<Vec<Membership>>;
    async fn get_membership(&self, id: MembershipId) -> StoreResult<Option<Membership>>;
    async fn insert_membership(&self, fields: MembershipFields) -> StoreResult<Membership>;
    async fn update_membership(
        &self,
        id: MembershipId,
        fields: MembershipFields,
    ) -> StoreResult<Option<Membership>>;
    async fn delete_membership(&self, id: MembershipId) -> StoreResult<bool>;
}

#[async_trait]
impl<S> ClubStore for Arc<S>
where
    S: ClubStore + ?Sized,
{
    async fn create_user(&self, user: NewUser) -> StoreResult<UserAccount> {
        (**self).create_user(user).await
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        (**self).get_user(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        (**self).find_user_by_username(username).await
    }

    async fn list_trainers(&self, filter: &TrainerFilter) -> StoreResult<Vec<Trainer>> {
        (**self).list_trainers(filter).await
    }

    async fn get_trainer(&self, id: TrainerId) -> StoreResult<Option<Trainer>> {
        (**self).get_trainer(id).await
    }

    async fn insert_trainer(&self, fields: TrainerFields) -> StoreResult<Trainer> {
        (**self).insert_trainer(fields).await
    }

    async fn update_trainer(&self, id: TrainerId, fields: TrainerFields) -> StoreResult<Option<Trainer>> {
        (**self).update_trainer(id, fields).await
    }

    async fn delete_trainer(&self, id: TrainerId) -> StoreResult<bool> {
        (**self).delete_trainer(id).await
    }

    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        (**self).list_members().await
    }

    async fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        (**self).get_member(id).await
    }

    async fn insert_member(&self, fields: MemberFields) -> StoreResult<Member> {
        (**self).insert_member(fields).await
    }

    async fn update_member(&self, id: MemberId, fields: MemberFields) -> StoreResult<Option<Member>> {
        (**self).update_member(id, fields).await
    }

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        (**self).delete_member(id).await
    }

    async fn list_member_memberships(&self, id: MemberId) -> StoreResult<Vec<Membership>> {
        (**self).list_member_memberships(id).await
    }

    async fn list_memberships(&self, filter: &MembershipFilter) -> StoreResult<Vec<Membership>> {
        (**self).list_memberships(filter).await
    }

    async fn get_membership(&self, id: MembershipId) -> StoreResult<Option<Membership>> {
        (**self).get_membership(id).await
    }

    async fn insert_membership(&self, fields: MembershipFields) -> StoreResult<Membership> {
        (**self).insert_membership(fields).await
    }

    async fn update_membership(
        &self,
        id: MembershipId,
        fields: MembershipFields,
    ) -> StoreResult<Option<Membership>> {
        (**self).update_membership(id, fields).await
    }

    async fn delete_membership(&self, id: MembershipId) -> StoreResult<bool> {
        (**self).delete_membership(id).await
    }
}
