//! Postgres-backed club store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL code | Constraint | StoreError |
//! |---|---|---|
//! | `23505` | `users_username_key` | `Conflict { field: "username" }` |
//! | `23505` | `trainers_user_id_key` / `members_user_id_key` | `Conflict { field: "user_id" }` |
//! | `23503` | `*_fkey` | `MissingReference { field }` |
//! | other / pool / IO | | `Database` |
//!
//! Cascade and set-null behavior on delete is enforced by the schema
//! (`migrations/0001_club_schema.sql`), not by this module.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use fitclub_auth::{NewUser, UserAccount};
use fitclub_club::{
    Member, MemberFields, Membership, MembershipFields, MembershipFilter, MembershipStatus,
    MembershipType, Trainer, TrainerFields, TrainerFilter,
};
use fitclub_core::{AccountProfile, MemberId, MembershipId, TrainerId, UserId};

use super::{ClubStore, StoreError, StoreResult};

const SCHEMA: &str = include_str!("../../migrations/0001_club_schema.sql");

macro_rules! trainer_columns {
    () => {
        "t.id AS t_id, t.specialization AS t_specialization, \
         t.experience_years AS t_experience_years, t.phone AS t_phone, t.bio AS t_bio, \
         t.created_at AS t_created_at, t.updated_at AS t_updated_at, \
         tu.id AS tu_id, tu.username AS tu_username, tu.email AS tu_email, \
         tu.first_name AS tu_first_name, tu.last_name AS tu_last_name"
    };
}

macro_rules! member_columns {
    () => {
        "m.id AS m_id, m.phone AS m_phone, m.date_of_birth AS m_date_of_birth, \
         m.address AS m_address, m.emergency_contact AS m_emergency_contact, \
         m.created_at AS m_created_at, m.updated_at AS m_updated_at, \
         mu.id AS mu_id, mu.username AS mu_username, mu.email AS mu_email, \
         mu.first_name AS mu_first_name, mu.last_name AS mu_last_name"
    };
}

const SELECT_USERS: &str = "SELECT id, username, email, first_name, last_name, password_hash, \
     is_active, date_joined FROM users";

const SELECT_TRAINERS: &str = concat!(
    "SELECT ",
    trainer_columns!(),
    " FROM trainers t JOIN users tu ON tu.id = t.user_id"
);

const SELECT_MEMBERS: &str = concat!(
    "SELECT ",
    member_columns!(),
    " FROM members m JOIN users mu ON mu.id = m.user_id"
);

const SELECT_MEMBERSHIPS: &str = concat!(
    "SELECT ms.id AS ms_id, ms.membership_type, ms.start_date, ms.end_date, ms.price, ms.status, \
     ms.created_at AS ms_created_at, ms.updated_at AS ms_updated_at, ",
    member_columns!(),
    ", ",
    trainer_columns!(),
    " FROM memberships ms \
     JOIN members m ON m.id = ms.member_id \
     JOIN users mu ON mu.id = m.user_id \
     LEFT JOIN trainers t ON t.id = ms.trainer_id \
     LEFT JOIN users tu ON tu.id = t.user_id"
);

/// Postgres-backed club store.
///
/// Uses the SQLx connection pool, so it is `Send + Sync` and cheap to clone.
#[derive(Debug, Clone)]
pub struct PostgresClubStore {
    pool: Arc<PgPool>,
}

impl PostgresClubStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Apply the club schema. Safe to run repeatedly.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    async fn fetch_user(&self, operation: &str, sql: &str, key: UserKey<'_>) -> StoreResult<Option<UserAccount>> {
        let query = sqlx::query(sql);
        let query = match key {
            UserKey::Id(id) => query.bind(id.get()),
            UserKey::Username(username) => query.bind(username),
        };
        let row = query
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        row.map(|r| user_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error(operation, e))
    }
}

enum UserKey<'a> {
    Id(UserId),
    Username(&'a str),
}

#[async_trait]
impl ClubStore for PostgresClubStore {
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn create_user(&self, user: NewUser) -> StoreResult<UserAccount> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password_hash, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, first_name, last_name, password_hash, is_active, date_joined
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_active)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_user", e))?;

        user_from_row(&row).map_err(|e| map_sqlx_error("create_user", e))
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user(&self, id: UserId) -> StoreResult<Option<UserAccount>> {
        let sql = format!("{SELECT_USERS} WHERE id = $1");
        self.fetch_user("get_user", &sql, UserKey::Id(id)).await
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<UserAccount>> {
        let sql = format!("{SELECT_USERS} WHERE username = $1");
        self.fetch_user("find_user_by_username", &sql, UserKey::Username(username))
            .await
    }

    #[instrument(skip(self), err)]
    async fn list_trainers(&self, filter: &TrainerFilter) -> StoreResult<Vec<Trainer>> {
        let pattern = filter
            .specialization
            .as_deref()
            .map(|needle| format!("%{}%", escape_like(needle)));

        let sql = format!(
            "{SELECT_TRAINERS} WHERE ($1::text IS NULL OR t.specialization ILIKE $1) \
             ORDER BY t.created_at DESC, t.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(pattern)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_trainers", e))?;

        rows.iter()
            .map(trainer_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_trainers", e))
    }

    #[instrument(skip(self), fields(trainer_id = %id), err)]
    async fn get_trainer(&self, id: TrainerId) -> StoreResult<Option<Trainer>> {
        let sql = format!("{SELECT_TRAINERS} WHERE t.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_trainer", e))?;

        row.map(|r| trainer_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_trainer", e))
    }

    #[instrument(skip(self, fields), fields(user_id = %fields.user_id), err)]
    async fn insert_trainer(&self, fields: TrainerFields) -> StoreResult<Trainer> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO trainers (user_id, specialization, experience_years, phone, bio)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(fields.user_id.get())
        .bind(&fields.specialization)
        .bind(fields.experience_years)
        .bind(&fields.phone)
        .bind(&fields.bio)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_trainer", e))?;

        self.get_trainer(TrainerId::new(id))
            .await?
            .ok_or_else(|| StoreError::Database(format!("trainer {id} vanished after insert")))
    }

    #[instrument(skip(self, fields), fields(trainer_id = %id), err)]
    async fn update_trainer(&self, id: TrainerId, fields: TrainerFields) -> StoreResult<Option<Trainer>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE trainers
            SET user_id = $2, specialization = $3, experience_years = $4, phone = $5, bio = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.get())
        .bind(fields.user_id.get())
        .bind(&fields.specialization)
        .bind(fields.experience_years)
        .bind(&fields.phone)
        .bind(&fields.bio)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_trainer", e))?;

        match updated {
            Some(_) => self.get_trainer(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(trainer_id = %id), err)]
    async fn delete_trainer(&self, id: TrainerId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM trainers WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_trainer", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_members(&self) -> StoreResult<Vec<Member>> {
        let sql = format!("{SELECT_MEMBERS} ORDER BY m.created_at DESC, m.id DESC");
        let rows = sqlx::query(&sql)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_members", e))?;

        rows.iter()
            .map(member_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_members", e))
    }

    #[instrument(skip(self), fields(member_id = %id), err)]
    async fn get_member(&self, id: MemberId) -> StoreResult<Option<Member>> {
        let sql = format!("{SELECT_MEMBERS} WHERE m.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_member", e))?;

        row.map(|r| member_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_member", e))
    }

    #[instrument(skip(self, fields), fields(user_id = %fields.user_id), err)]
    async fn insert_member(&self, fields: MemberFields) -> StoreResult<Member> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO members (user_id, phone, date_of_birth, address, emergency_contact)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(fields.user_id.get())
        .bind(&fields.phone)
        .bind(fields.date_of_birth)
        .bind(&fields.address)
        .bind(&fields.emergency_contact)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_member", e))?;

        self.get_member(MemberId::new(id))
            .await?
            .ok_or_else(|| StoreError::Database(format!("member {id} vanished after insert")))
    }

    #[instrument(skip(self, fields), fields(member_id = %id), err)]
    async fn update_member(&self, id: MemberId, fields: MemberFields) -> StoreResult<Option<Member>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE members
            SET user_id = $2, phone = $3, date_of_birth = $4, address = $5,
                emergency_contact = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.get())
        .bind(fields.user_id.get())
        .bind(&fields.phone)
        .bind(fields.date_of_birth)
        .bind(&fields.address)
        .bind(&fields.emergency_contact)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_member", e))?;

        match updated {
            Some(_) => self.get_member(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(member_id = %id), err)]
    async fn delete_member(&self, id: MemberId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_member", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_memberships(&self, filter: &MembershipFilter) -> StoreResult<Vec<Membership>> {
        let sql = format!(
            "{SELECT_MEMBERSHIPS} \
             WHERE ($1::bigint IS NULL OR ms.member_id = $1) \
               AND ($2::bigint IS NULL OR ms.trainer_id = $2) \
               AND ($3::text IS NULL OR ms.status = $3) \
               AND ($4::text IS NULL OR ms.membership_type = $4) \
               AND (NOT $5 OR ms.status = 'active') \
             ORDER BY ms.created_at DESC, ms.id DESC"
        );
        let rows = sqlx::query(&sql)
            .bind(filter.member_id.map(MemberId::get))
            .bind(filter.trainer_id.map(TrainerId::get))
            .bind(filter.status.as_deref())
            .bind(filter.membership_type.as_deref())
            .bind(filter.active_only)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_memberships", e))?;

        rows.iter()
            .map(membership_from_row)
            .collect::<Result<_, _>>()
            .map_err(|e| map_sqlx_error("list_memberships", e))
    }

    #[instrument(skip(self), fields(membership_id = %id), err)]
    async fn get_membership(&self, id: MembershipId) -> StoreResult<Option<Membership>> {
        let sql = format!("{SELECT_MEMBERSHIPS} WHERE ms.id = $1");
        let row = sqlx::query(&sql)
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_membership", e))?;

        row.map(|r| membership_from_row(&r))
            .transpose()
            .map_err(|e| map_sqlx_error("get_membership", e))
    }

    #[instrument(skip(self, fields), fields(member_id = %fields.member_id), err)]
    async fn insert_membership(&self, fields: MembershipFields) -> StoreResult<Membership> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO memberships
                (member_id, trainer_id, membership_type, start_date, end_date, price, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(fields.member_id.get())
        .bind(fields.trainer_id.map(TrainerId::get))
        .bind(fields.membership_type.as_str())
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.price)
        .bind(fields.status.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_membership", e))?;

        self.get_membership(MembershipId::new(id))
            .await?
            .ok_or_else(|| StoreError::Database(format!("membership {id} vanished after insert")))
    }

    #[instrument(skip(self, fields), fields(membership_id = %id), err)]
    async fn update_membership(
        &self,
        id: MembershipId,
        fields: MembershipFields,
    ) -> StoreResult<Option<Membership>> {
        let updated: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE memberships
            SET member_id = $2, trainer_id = $3, membership_type = $4, start_date = $5,
                end_date = $6, price = $7, status = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.get())
        .bind(fields.member_id.get())
        .bind(fields.trainer_id.map(TrainerId::get))
        .bind(fields.membership_type.as_str())
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.price)
        .bind(fields.status.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_membership", e))?;

        match updated {
            Some(_) => self.get_membership(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(membership_id = %id), err)]
    async fn delete_membership(&self, id: MembershipId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_membership", e))?;
        Ok(result.rows_affected() > 0)
    }
}

/// Map SQLx errors to StoreError using the SQLSTATE code and constraint name.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => match db_err.constraint() {
                Some("users_username_key") => return StoreError::username_taken(),
                Some("trainers_user_id_key") => return StoreError::user_taken("trainer"),
                Some("members_user_id_key") => return StoreError::user_taken("member"),
                _ => {}
            },
            Some("23503") => match db_err.constraint() {
                Some("trainers_user_id_fkey" | "members_user_id_fkey") => {
                    return StoreError::MissingReference { field: "user_id" };
                }
                Some("memberships_member_id_fkey") => {
                    return StoreError::MissingReference { field: "member_id" };
                }
                Some("memberships_trainer_id_fkey") => {
                    return StoreError::MissingReference { field: "trainer_id" };
                }
                _ => {}
            },
            _ => {}
        }
        return StoreError::Database(format!(
            "database error in {}: {}",
            operation,
            db_err.message()
        ));
    }

    match err {
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}

/// Escape `%`, `_` and `\` so a user-supplied needle matches literally.
fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// SQLx row decoding

fn profile_from_row(row: &PgRow, prefix: &str) -> Result<AccountProfile, sqlx::Error> {
    let col = |name: &str| format!("{prefix}{name}");
    Ok(AccountProfile {
        id: UserId::new(row.try_get(col("id").as_str())?),
        username: row.try_get(col("username").as_str())?,
        email: row.try_get(col("email").as_str())?,
        first_name: row.try_get(col("first_name").as_str())?,
        last_name: row.try_get(col("last_name").as_str())?,
    })
}

fn user_from_row(row: &PgRow) -> Result<UserAccount, sqlx::Error> {
    Ok(UserAccount {
        profile: profile_from_row(row, "")?,
        password_hash: row.try_get("password_hash")?,
        is_active: row.try_get("is_active")?,
        date_joined: row.try_get("date_joined")?,
    })
}

fn trainer_from_row(row: &PgRow) -> Result<Trainer, sqlx::Error> {
    Ok(Trainer {
        id: TrainerId::new(row.try_get("t_id")?),
        user: profile_from_row(row, "tu_")?,
        specialization: row.try_get("t_specialization")?,
        experience_years: row.try_get("t_experience_years")?,
        phone: row.try_get("t_phone")?,
        bio: row.try_get("t_bio")?,
        created_at: row.try_get("t_created_at")?,
        updated_at: row.try_get("t_updated_at")?,
    })
}

fn member_from_row(row: &PgRow) -> Result<Member, sqlx::Error> {
    Ok(Member {
        id: MemberId::new(row.try_get("m_id")?),
        user: profile_from_row(row, "mu_")?,
        phone: row.try_get("m_phone")?,
        date_of_birth: row.try_get("m_date_of_birth")?,
        address: row.try_get("m_address")?,
        emergency_contact: row.try_get("m_emergency_contact")?,
        created_at: row.try_get("m_created_at")?,
        updated_at: row.try_get("m_updated_at")?,
    })
}

fn membership_from_row(row: &PgRow) -> Result<Membership, sqlx::Error> {
    let trainer_id: Option<i64> = row.try_get("t_id")?;
    let trainer = match trainer_id {
        Some(_) => Some(trainer_from_row(row)?),
        None => None,
    };

    let membership_type: String = row.try_get("membership_type")?;
    let status: String = row.try_get("status")?;

    Ok(Membership {
        id: MembershipId::new(row.try_get("ms_id")?),
        member: member_from_row(row)?,
        trainer,
        membership_type: membership_type
            .parse::<MembershipType>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?,
        start_date: row.try_get("start_date")?,
        end_date: row.try_get("end_date")?,
        price: row.try_get("price")?,
        status: status
            .parse::<MembershipStatus>()
            .map_err(|e| sqlx::Error::Decode(e.into()))?,
        created_at: row.try_get("ms_created_at")?,
        updated_at: row.try_get("ms_updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    #[test]
    fn like_needles_are_escaped() {
        assert_eq!(escape_like("yoga"), "yoga");
        assert_eq!(escape_like("100%_fit\\"), "100\\%\\_fit\\\\");
    }

    #[test]
    fn select_statements_join_accounts() {
        assert!(SELECT_TRAINERS.contains("JOIN users tu ON tu.id = t.user_id"));
        assert!(SELECT_MEMBERSHIPS.contains("LEFT JOIN trainers t ON t.id = ms.trainer_id"));
        assert!(SELECT_MEMBERSHIPS.contains("mu.username AS mu_username"));
    }

    /// Runs against a disposable database only:
    /// `DATABASE_URL=postgres://... cargo test -p fitclub-infra -- --ignored`
    #[tokio::test]
    #[ignore]
    async fn postgres_cascade_and_set_null() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresClubStore::connect(&url, 2).await.unwrap();
        store.migrate().await.unwrap();

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let new_user = |name: &str| NewUser {
            username: format!("{name}-{suffix}"),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "$argon2id$placeholder".to_string(),
            is_active: true,
        };

        let coach = store.create_user(new_user("coach")).await.unwrap();
        let dup = store.create_user(new_user("coach")).await.unwrap_err();
        assert_eq!(dup, StoreError::username_taken());

        let trainer = store
            .insert_trainer(TrainerFields {
                user_id: coach.id(),
                specialization: "Yoga Instructor".to_string(),
                experience_years: 3,
                phone: "+15550001".to_string(),
                bio: None,
            })
            .await
            .unwrap();

        let user = store.create_user(new_user("member")).await.unwrap();
        let member = store
            .insert_member(MemberFields {
                user_id: user.id(),
                phone: "+15550002".to_string(),
                date_of_birth: None,
                address: None,
                emergency_contact: None,
            })
            .await
            .unwrap();

        let membership = store
            .insert_membership(MembershipFields {
                member_id: member.id,
                trainer_id: Some(trainer.id),
                membership_type: MembershipType::Premium,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
                price: Decimal::new(4999, 2),
                status: MembershipStatus::Active,
            })
            .await
            .unwrap();
        assert_eq!(membership.price.to_string(), "49.99");

        let yoga = store
            .list_trainers(&TrainerFilter {
                specialization: Some("yoga".to_string()),
            })
            .await
            .unwrap();
        assert!(yoga.iter().any(|t| t.id == trainer.id));

        assert!(store.delete_trainer(trainer.id).await.unwrap());
        let reloaded = store.get_membership(membership.id).await.unwrap().unwrap();
        assert!(reloaded.trainer.is_none());

        assert!(store.delete_member(member.id).await.unwrap());
        assert!(store.get_membership(membership.id).await.unwrap().is_none());
    }
}
