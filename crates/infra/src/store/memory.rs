use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use fitclub_auth::{NewUser, UserAccount};
use fitclub_club::{
    Member, MemberFields, Membership, MembershipFields, MembershipFilter, Trainer, TrainerFields,
    TrainerFilter,
};
use fitclub_core::{
    AccountProfile, MemberId, MembershipId, TrainerId, UserId, sort_newest_first,
};

use super::{ClubStore, StoreError, StoreResult};

#[derive(Debug, Clone)]
struct Row<F> {
    fields: F,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl<F> Row<F> {
    fn new(fields: F) -> Self {
        let now = Utc::now();
        Self {
            fields,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    last_user: i64,
    last_trainer: i64,
    last_member: i64,
    last_membership: i64,
    users: BTreeMap<UserId, UserAccount>,
    trainers: BTreeMap<TrainerId, Row<TrainerFields>>,
    members: BTreeMap<MemberId, Row<MemberFields>>,
    memberships: BTreeMap<MembershipId, Row<MembershipFields>>,
}

impl State {
    fn profile(&self, id: UserId) -> StoreResult<AccountProfile> {
        self.users
            .get(&id)
            .map(|u| u.profile.clone())
            .ok_or_else(|| StoreError::Database(format!("dangling user reference {id}")))
    }

    fn trainer(&self, id: TrainerId) -> StoreResult<Option<Trainer>> {
        let Some(row) = self.trainers.get(&id) else {
            return Ok(None);
        };
        let f = &row.fields;
        Ok(Some(Trainer {
            id,
            user: self.profile(f.user_id)?,
            specialization: f.specialization.clone(),
            experience_years: f.experience_years,
            phone: f.phone.clone(),
            bio: f.bio.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    fn member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        let Some(row) = self.members.get(&id) else {
            return Ok(None);
        };
        let f = &row.fields;
        Ok(Some(Member {
            id,
            user: self.profile(f.user_id)?,
            phone: f.phone.clone(),
            date_of_birth: f.date_of_birth,
            address: f.address.clone(),
            emergency_contact: f.emergency_contact.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    fn membership(&self, id: MembershipId) -> StoreResult<Option<Membership>> {
        let Some(row) = self.memberships.get(&id) else {
            return Ok(None);
        };
        let f = &row.fields;
        let member = self
            .member(f.member_id)?
            .ok_or_else(|| StoreError::Database(format!("dangling member reference {}", f.member_id)))?;
        let trainer = match f.trainer_id {
            Some(trainer_id) => self.trainer(trainer_id)?,
            None => None,
        };
        Ok(Some(Membership {
            id,
            member,
            trainer,
            membership_type: f.membership_type,
            start_date: f.start_date,
            end_date: f.end_date,
            price: f.price,
            status: f.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }

    fn check_trainer(&self, fields: &TrainerFields, this: Option<TrainerId>) -> StoreResult<()> {
        if !self.users.contains_key(&fields.user_id) {
            return Err(StoreError::MissingReference { field: "user_id" });
        }
        let taken = self
            .trainers
            .iter()
            .any(|(id, row)| Some(*id) != this && row.fields.user_id == fields.user_id);
        if taken {
            return Err(StoreError::user_taken("trainer"));
        }
        Ok(())
    }

    fn check_member(&self, fields: &MemberFields, this: Option<MemberId>) -> StoreResult<()> {
        if !self.users.contains_key(&fields.user_id) {
            return Err(StoreError::MissingReference { field: "user_id" });
        }
        let taken = self
            .members
            .iter()
            .any(|(id, row)| Some(*id) != this && row.fields.user_id == fields.user_id);
        if taken {
            return Err(StoreError::user_taken("member"));
        }
        Ok(())
    }

    fn check_membership(&self, fields: &MembershipFields) -> StoreResult<()> {
        if !self.members.contains_key(&fields.member_id) {
            return Err(StoreError::MissingReference { field: "member_id" });
        }
        if let Some(trainer_id) = fields.trainer_id {
            if !self.trainers.contains_key(&trainer_id) {
                return Err(StoreError::MissingReference { field: "trainer_id" });
            }
        }
        Ok(())
    }
}

/// In-memory club store for tests/dev.
///
/// Enforces one trainer and one member profile per account, cascades member
/// deletion to memberships and clears the trainer of memberships when a
/// trainer is deleted. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryClubStore {
    state: RwLock<State>,
}

impl InMemoryClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl ClubStore for InMemoryClubStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserAccount> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.profile.username == user.username) {
            return Err(StoreError::username_taken());
        }
        state.last_user += 1;
        let id = UserId::new(state.last_user);
        let account = UserAccount {
            profile: AccountProfile {
                id,
                username: user.username,
                email: user.email,
                first_name: user.first_name,
                last_name: user.last_name,
            },
            password_hash: user.password_hash,
            is_active: user.is_active,
            date_joined: Utc::now(),
        };
        state.users.insert(id, account.clone());
        Ok(account)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.profile.username == username)
            .cloned())
    }

    async fn list_trainers(&self, filter: &TrainerFilter) -> StoreResult<Vec<Trainer>> {
        let state = self.read()?;
        let mut out = Vec::with_capacity(state.trainers.len());
        for id in state.trainers.keys() {
            if let Some(trainer) = state.trainer(*id)? {
                if filter.matches(&trainer) {
                    out.push(trainer);
                }
            }
        }
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn get_trainer(&self, id: TrainerId) -> StoreResult<Option<Trainer>> {
        self.read()?.trainer(id)
    }

    async fn insert_trainer(&self, fields: TrainerFields) -> StoreResult<Trainer> {
        let mut state = self.write()?;
        state.check_trainer(&fields, None)?;
        state.last_trainer += 1;
        let id = TrainerId::new(state.last_trainer);
        state.trainers.insert(id, Row::new(fields));
        state
            .trainer(id)?
            .ok_or_else(|| StoreError::Database("inserted trainer vanished".to_string()))
    }

    async fn update_trainer(&self, id: TrainerId, fields: TrainerFields) -> StoreResult<Option<Trainer>> {
        let mut state = self.write()?;
        if !state.trainers.contains_key(&id) {
            return Ok(None);
        }
        state.check_trainer(&fields, Some(id))?;
        if let Some(row) = state.trainers.get_mut(&id) {
            row.fields = fields;
            row.updated_at = Utc::now();
        }
        state.trainer(id)
    }

    async fn delete_trainer(&self, id: TrainerId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.trainers.remove(&id).is_none() {
            return Ok(false);
        }
        for row in state.memberships.values_mut() {
            if row.fields.trainer_id == Some(id) {
                row.fields.trainer_id = None;
            }
        }
        Ok(true)
    }

    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        let state = self.read()?;
        let mut out = Vec::with_capacity(state.members.len());
        for id in state.members.keys() {
            out.extend(state.member(*id)?);
        }
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        self.read()?.member(id)
    }

    async fn insert_member(&self, fields: MemberFields) -> StoreResult<Member> {
        let mut state = self.write()?;
        state.check_member(&fields, None)?;
        state.last_member += 1;
        let id = MemberId::new(state.last_member);
        state.members.insert(id, Row::new(fields));
        state
            .member(id)?
            .ok_or_else(|| StoreError::Database("inserted member vanished".to_string()))
    }

    async fn update_member(&self, id: MemberId, fields: MemberFields) -> StoreResult<Option<Member>> {
        let mut state = self.write()?;
        if !state.members.contains_key(&id) {
            return Ok(None);
        }
        state.check_member(&fields, Some(id))?;
        if let Some(row) = state.members.get_mut(&id) {
            row.fields = fields;
            row.updated_at = Utc::now();
        }
        state.member(id)
    }

    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        let mut state = self.write()?;
        if state.members.remove(&id).is_none() {
            return Ok(false);
        }
        state.memberships.retain(|_, row| row.fields.member_id != id);
        Ok(true)
    }

    async fn list_memberships(&self, filter: &MembershipFilter) -> StoreResult<Vec<Membership>> {
        let state = self.read()?;
        let mut out = Vec::new();
        for id in state.memberships.keys() {
            if let Some(membership) = state.membership(*id)? {
                if filter.matches(&membership) {
                    out.push(membership);
                }
            }
        }
        sort_newest_first(&mut out);
        Ok(out)
    }

    async fn get_membership(&self, id: MembershipId) -> StoreResult<Option<Membership>> {
        self.read()?.membership(id)
    }

    async fn insert_membership(&self, fields: MembershipFields) -> StoreResult<Membership> {
        let mut state = self.write()?;
        state.check_membership(&fields)?;
        state.last_membership += 1;
        let id = MembershipId::new(state.last_membership);
        state.memberships.insert(id, Row::new(fields));
        state
            .membership(id)?
            .ok_or_else(|| StoreError::Database("inserted membership vanished".to_string()))
    }

    async fn update_membership(
        &self,
        id: MembershipId,
        fields: MembershipFields,
    ) -> StoreResult<Option<Membership>> {
        let mut state = self.write()?;
        if !state.memberships.contains_key(&id) {
            return Ok(None);
        }
        state.check_membership(&fields)?;
        if let Some(row) = state.memberships.get_mut(&id) {
            row.fields = fields;
            row.updated_at = Utc::now();
        }
        state.membership(id)
    }

    async fn delete_membership(&self, id: MembershipId) -> StoreResult<bool> {
        Ok(self.write()?.memberships.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fitclub_club::{MembershipStatus, MembershipType};
    use rust_decimal::Decimal;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@club.test"),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$placeholder".to_string(),
            is_active: true,
        }
    }

    fn trainer_fields(user_id: UserId, specialization: &str) -> TrainerFields {
        TrainerFields {
            user_id,
            specialization: specialization.to_string(),
            experience_years: 4,
            phone: "+15550001".to_string(),
            bio: None,
        }
    }

    fn member_fields(user_id: UserId) -> MemberFields {
        MemberFields {
            user_id,
            phone: "+15550002".to_string(),
            date_of_birth: None,
            address: None,
            emergency_contact: None,
        }
    }

    fn membership_fields(member_id: MemberId, trainer_id: Option<TrainerId>) -> MembershipFields {
        MembershipFields {
            member_id,
            trainer_id,
            membership_type: MembershipType::Premium,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            price: Decimal::new(4999, 2),
            status: MembershipStatus::Active,
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryClubStore::new();
        store.create_user(new_user("alice")).await.unwrap();
        let err = store.create_user(new_user("alice")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { field: "username", .. }));
    }

    #[tokio::test]
    async fn one_trainer_profile_per_account() {
        let store = InMemoryClubStore::new();
        let user = store.create_user(new_user("coach")).await.unwrap();
        store.insert_trainer(trainer_fields(user.id(), "Yoga")).await.unwrap();

        let err = store
            .insert_trainer(trainer_fields(user.id(), "Pilates"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::user_taken("trainer"));
    }

    #[tokio::test]
    async fn updating_a_trainer_keeps_its_own_account() {
        let store = InMemoryClubStore::new();
        let user = store.create_user(new_user("coach")).await.unwrap();
        let trainer = store.insert_trainer(trainer_fields(user.id(), "Yoga")).await.unwrap();

        let updated = store
            .update_trainer(trainer.id, trainer_fields(user.id(), "Yoga Instructor"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.specialization, "Yoga Instructor");
        assert!(updated.updated_at >= trainer.updated_at);
        assert_eq!(updated.created_at, trainer.created_at);
    }

    #[tokio::test]
    async fn references_must_exist() {
        let store = InMemoryClubStore::new();
        let err = store
            .insert_member(member_fields(UserId::new(99)))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::MissingReference { field: "user_id" });

        let user = store.create_user(new_user("m")).await.unwrap();
        let member = store.insert_member(member_fields(user.id())).await.unwrap();
        let err = store
            .insert_membership(membership_fields(member.id, Some(TrainerId::new(5))))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::MissingReference { field: "trainer_id" });
    }

    #[tokio::test]
    async fn deleting_member_cascades_to_memberships() {
        let store = InMemoryClubStore::new();
        let user = store.create_user(new_user("m")).await.unwrap();
        let member = store.insert_member(member_fields(user.id())).await.unwrap();
        let membership = store
            .insert_membership(membership_fields(member.id, None))
            .await
            .unwrap();

        assert!(store.delete_member(member.id).await.unwrap());
        assert!(store.get_membership(membership.id).await.unwrap().is_none());
        assert!(!store.delete_member(member.id).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_trainer_clears_membership_trainer() {
        let store = InMemoryClubStore::new();
        let coach = store.create_user(new_user("coach")).await.unwrap();
        let trainer = store.insert_trainer(trainer_fields(coach.id(), "Boxing")).await.unwrap();
        let user = store.create_user(new_user("m")).await.unwrap();
        let member = store.insert_member(member_fields(user.id())).await.unwrap();
        let membership = store
            .insert_membership(membership_fields(member.id, Some(trainer.id)))
            .await
            .unwrap();
        assert_eq!(membership.trainer.as_ref().map(|t| t.id), Some(trainer.id));

        assert!(store.delete_trainer(trainer.id).await.unwrap());
        let reloaded = store.get_membership(membership.id).await.unwrap().unwrap();
        assert!(reloaded.trainer.is_none());
        assert_eq!(reloaded.member.id, member.id);
    }

    #[tokio::test]
    async fn lists_are_newest_first_and_filtered() {
        let store = InMemoryClubStore::new();
        let a = store.create_user(new_user("a")).await.unwrap();
        let b = store.create_user(new_user("b")).await.unwrap();
        let first = store.insert_trainer(trainer_fields(a.id(), "Yoga Instructor")).await.unwrap();
        let second = store.insert_trainer(trainer_fields(b.id(), "Boxing")).await.unwrap();

        let all = store.list_trainers(&TrainerFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![second.id, first.id]);

        let yoga = store
            .list_trainers(&TrainerFilter {
                specialization: Some("yoga".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(yoga.len(), 1);
        assert_eq!(yoga[0].id, first.id);
    }

    #[tokio::test]
    async fn member_memberships_are_scoped() {
        let store = InMemoryClubStore::new();
        let a = store.create_user(new_user("a")).await.unwrap();
        let b = store.create_user(new_user("b")).await.unwrap();
        let ma = store.insert_member(member_fields(a.id())).await.unwrap();
        let mb = store.insert_member(member_fields(b.id())).await.unwrap();
        store.insert_membership(membership_fields(ma.id, None)).await.unwrap();
        store.insert_membership(membership_fields(mb.id, None)).await.unwrap();

        let list = store.list_member_memberships(ma.id).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].member.id, ma.id);
    }
}
