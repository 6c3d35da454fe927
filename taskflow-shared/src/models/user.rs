/// User model and database operations
///
/// Users are created either by local signup or on their first successful SSO
/// verification. SSO users are keyed by their email address, which doubles as
/// the username, and never get a usable password.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL DEFAULT '',
///     given_name VARCHAR(150) NOT NULL DEFAULT '',
///     family_name VARCHAR(150) NOT NULL DEFAULT '',
///     password_hash VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskflow_shared::models::user::{User, NewUser};
/// use taskflow_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::resolve_or_create(&pool, NewUser::sso("ada@example.com", "Ada", "Lovelace")).await?;
/// let again = User::resolve_or_create(&pool, NewUser::sso("ada@example.com", "Ada", "Lovelace")).await?;
/// assert_eq!(user.id, again.id);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::role::RoleSet;

const USER_COLUMNS: &str =
    "id, username, email, given_name, family_name, password_hash, created_at, updated_at";

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,

    /// Unique login name; the email address for SSO users
    pub username: String,

    pub email: String,

    pub given_name: String,

    pub family_name: String,

    /// Argon2id hash, or `None` when the account has no usable password
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether password login is possible for this account
    pub fn has_usable_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Input for creating a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub password_hash: Option<String>,
}

impl NewUser {
    /// A user provisioned from an SSO identity: username is the email and
    /// there is no password.
    pub fn sso(email: &str, given_name: &str, family_name: &str) -> Self {
        Self {
            username: email.to_string(),
            email: email.to_string(),
            given_name: given_name.to_string(),
            family_name: family_name.to_string(),
            password_hash: None,
        }
    }
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails with a unique violation if the username is taken.
    pub async fn create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, given_name, family_name, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.given_name)
        .bind(data.family_name)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Returns the user with `data.username`, creating it if absent
    ///
    /// The insert and lookup run as one statement guarded by the unique
    /// constraint on `username`, so concurrent callers converge on a single
    /// row. When a concurrent insert commits after this statement's snapshot
    /// the statement returns nothing and a follow-up read picks the row up.
    /// Existing users are returned unchanged.
    pub async fn resolve_or_create(pool: &PgPool, data: NewUser) -> Result<Self, sqlx::Error> {
        let username = data.username.clone();

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            WITH inserted AS (
                INSERT INTO users (username, email, given_name, family_name, password_hash)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (username) DO NOTHING
                RETURNING {USER_COLUMNS}
            )
            SELECT {USER_COLUMNS} FROM inserted
            UNION ALL
            SELECT {USER_COLUMNS} FROM users WHERE username = $1
            LIMIT 1
            "#
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.given_name)
        .bind(data.family_name)
        .bind(data.password_hash)
        .fetch_optional(pool)
        .await?;

        match user {
            Some(user) => Ok(user),
            None => Self::find_by_username(pool, &username)
                .await?
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Loads the roles held by a user
    pub async fn roles(pool: &PgPool, id: Uuid) -> Result<RoleSet, sqlx::Error> {
        let names: Vec<String> =
            sqlx::query_scalar("SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role")
                .bind(id)
                .fetch_all(pool)
                .await?;

        Ok(RoleSet::from_names(names))
    }

    /// Replaces the roles held by a user
    ///
    /// Runs in a single transaction; readers see either the old or the new set.
    pub async fn set_roles(pool: &PgPool, id: Uuid, roles: &RoleSet) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM user_roles WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for role in roles.iter() {
            sqlx::query("INSERT INTO user_roles (user_id, role) VALUES ($1, $2)")
                .bind(id)
                .bind(role.as_str())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE users SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await
    }
}
