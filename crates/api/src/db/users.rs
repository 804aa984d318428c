//! User repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use spice_hub_core::models::{NewUser, User, UserUpdate};
use spice_hub_core::{UserId, UserRole};

use super::{RepositoryError, conflict_on_unique};

const USER_COLUMNS: &str = "id, supabase_id, first_name, last_name, email, phone_number, role, \
     is_active, is_verified, avatar_url, created_at, updated_at, last_login";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    supabase_id: String,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    role: String,
    is_active: bool,
    is_verified: bool,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    last_login: Option<DateTime<Utc>>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            supabase_id: row.supabase_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone_number: row.phone_number,
            role: row.role.parse()?,
            is_active: row.is_active,
            is_verified: row.is_verified,
            avatar_url: row.avatar_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
            last_login: row.last_login,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(User::try_from).collect()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Get a user by the identity provider's subject id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_supabase_id(&self, supabase_id: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE supabase_id = $1");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(supabase_id)
            .fetch_optional(self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Get a user by email, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool)
            .await?
            .map(User::try_from)
            .transpose()
    }

    /// Whether a user with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: UserId) -> Result<bool, RepositoryError> {
        let found: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;
        Ok(found)
    }

    /// Create a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or subject id already exists.
    pub async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let sql = format!(
            "INSERT INTO users (supabase_id, first_name, last_name, email, phone_number, role) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.supabase_id)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(&user.email)
            .bind(&user.phone_number)
            .bind(user.role.as_str())
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Email already registered"))?;
        User::try_from(row)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update(&self, id: UserId, update: &UserUpdate) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET \
                first_name = COALESCE($2, first_name), \
                last_name = COALESCE($3, last_name), \
                phone_number = COALESCE($4, phone_number), \
                role = COALESCE($5, role), \
                avatar_url = COALESCE($6, avatar_url), \
                is_active = COALESCE($7, is_active), \
                is_verified = COALESCE($8, is_verified), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.phone_number)
            .bind(update.role.map(|r| r.as_str()))
            .bind(&update.avatar_url)
            .bind(update.is_active)
            .bind(update.is_verified)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        User::try_from(row)
    }

    /// Set the role of the user with this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no user has the email.
    pub async fn set_role_by_email(
        &self,
        email: &str,
        role: UserRole,
    ) -> Result<User, RepositoryError> {
        let sql = format!(
            "UPDATE users SET role = $2, updated_at = NOW() \
             WHERE lower(email) = lower($1) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .bind(role.as_str())
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        User::try_from(row)
    }

    /// Delete a user and everything they own.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn delete(&self, id: UserId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
