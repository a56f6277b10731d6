//! Repository for the `users` table.

use sqlx::PgPool;
use yamdb_core::roles::Role;
use yamdb_core::types::{DbId, Timestamp};
use yamdb_core::validation::contains_pattern;

use crate::models::user::{CreateUser, UpdateUser, User};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, email, first_name, last_name, bio, role, is_superuser, \
                        last_login_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, first_name, last_name, bio, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.bio)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Return the user registered under `email`, creating a plain `user`
    /// account if none exists.
    ///
    /// The new account's username is the email itself. If another account
    /// already holds that username, it becomes `user<id>` instead.
    /// The boolean is `true` when the row was created by this call.
    pub async fn get_or_create_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<(User, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email)
             VALUES ($1, $1)
             ON CONFLICT DO NOTHING
             RETURNING {COLUMNS}"
        );
        if let Some(user) = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await?
        {
            return Ok((user, true));
        }

        if let Some(user) = Self::find_by_email(pool, email).await? {
            return Ok((user, false));
        }

        let query = format!(
            "WITH next AS (SELECT nextval(pg_get_serial_sequence('users', 'id')) AS id)
             INSERT INTO users (id, username, email)
             SELECT id, 'user' || id, $1 FROM next
             ON CONFLICT DO NOTHING
             RETURNING {COLUMNS}"
        );
        let generated = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await?;

        match generated {
            Some(user) => {
                tracing::info!(
                    user_id = user.id,
                    username = %user.username,
                    "Email taken as a username, generated one"
                );
                Ok((user, true))
            }
            None => Self::find_by_email(pool, email)
                .await?
                .map(|user| (user, false))
                .ok_or(sqlx::Error::RowNotFound),
        }
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE username = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-sensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// List users ordered by username, optionally filtered by a
    /// case-insensitive username substring.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR username ILIKE $1)
             ORDER BY username
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(search.map(contains_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count users matching the same filter as [`UserRepo::list`].
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE ($1::TEXT IS NULL OR username ILIKE $1)")
                .bind(search.map(contains_pattern))
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// Update a user. Only non-`None` fields in `input` are applied;
    /// `bio: Some(None)` clears the bio.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                bio = CASE WHEN $6 THEN $7 ELSE bio END,
                role = COALESCE($8, role)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(input.bio.is_some())
            .bind(input.bio.clone().flatten())
            .bind(input.role.map(Role::as_str))
            .fetch_optional(pool)
            .await
    }

    /// Delete a user. Their reviews and comments cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set `last_login_at` to now, provided it still equals `previous`.
    ///
    /// Confirmation codes are bound to the previous value, so this both spends
    /// the code and makes sure only one concurrent exchange can spend it.
    /// Returns `false` when the row had already moved on.
    pub async fn record_login(
        pool: &PgPool,
        id: DbId,
        previous: Option<Timestamp>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET last_login_at = NOW() \
             WHERE id = $1 AND last_login_at IS NOT DISTINCT FROM $2",
        )
        .bind(id)
        .bind(previous)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Make sure an admin superuser with this email exists, creating it or
    /// promoting the existing account.
    pub async fn ensure_superuser(
        pool: &PgPool,
        email: &str,
        username: &str,
    ) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, role, is_superuser)
             VALUES ($1, $2, 'admin', true)
             ON CONFLICT (email) DO UPDATE SET role = 'admin', is_superuser = true
             RETURNING {COLUMNS}"
        );
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .bind(email)
            .fetch_one(pool)
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "Superuser ensured");
        Ok(user)
    }
}
