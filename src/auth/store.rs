use rocket_db_pools::sqlx::{self, PgPool};

use crate::auth::{AuthError, AuthResult};
use crate::models::{AdminUpdateRequest, UpdateProfileRequest, User, UserStats};

/// Fields needed to create a user row. The hash is produced by the password
/// service before this record is built; the store never sees a plaintext.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub age: Option<i32>,
    pub bio: Option<String>,
}

/// Narrow query contract over the `users` table. Uniqueness of username and
/// email is enforced by the table's unique indexes; this layer translates the
/// resulting constraint violations into [`AuthError::Conflict`] so there is
/// no check-then-insert race anywhere above it.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_username_or_email(&self, identifier: &str) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE lower(username) = lower($1) OR lower(email) = lower($1)",
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn insert(&self, record: NewUserRecord) -> AuthResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, display_name, age, bio)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&record.username)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(&record.display_name)
        .bind(record.age)
        .bind(&record.bio)
        .fetch_one(&self.pool)
        .await
        .map_err(map_constraint_error)
    }

    pub async fn update_profile(
        &self,
        id: i32,
        fields: &UpdateProfileRequest,
    ) -> AuthResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = $1, email = $2, age = $3, bio = $4, avatar_url = $5,
                updated_at = now()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(&fields.display_name)
        .bind(&fields.email)
        .bind(fields.age)
        .bind(&fields.bio)
        .bind(&fields.avatar_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_constraint_error)
    }

    pub async fn update_password(&self, id: i32, password_hash: &str) -> AuthResult<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Admin-side update: profile fields plus role and active flag. Role and
    /// flag keep their stored value when not provided.
    pub async fn admin_update(
        &self,
        id: i32,
        fields: &AdminUpdateRequest,
    ) -> AuthResult<Option<User>> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = $1, email = $2, age = $3, bio = $4, avatar_url = $5,
                role = COALESCE($6, role), is_active = COALESCE($7, is_active),
                updated_at = now()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&fields.display_name)
        .bind(&fields.email)
        .bind(fields.age)
        .bind(&fields.bio)
        .bind(&fields.avatar_url)
        .bind(fields.role.map(|role| role.as_str()))
        .bind(fields.is_active)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_constraint_error)
    }

    pub async fn delete(&self, id: i32) -> AuthResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> AuthResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    pub async fn stats(&self) -> AuthResult<UserStats> {
        let stats = sqlx::query_as::<_, UserStats>(
            r#"
            SELECT
                COUNT(*) AS total_users,
                COUNT(*) FILTER (WHERE role = 'admin') AS total_admins,
                COUNT(*) FILTER (WHERE is_active) AS active_users,
                CAST(AVG(age) AS DOUBLE PRECISION) AS average_age
            FROM users
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(stats)
    }
}

/// Translate Postgres unique violations (SQLSTATE 23505) on the users table
/// into the domain `Conflict` error; everything else stays a storage error.
fn map_constraint_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            let message = match db_err.constraint() {
                Some("users_email_key") => "email already exists",
                Some("users_username_key") => "username already exists",
                _ => "username or email already exists",
            };
            return AuthError::Conflict(message.into());
        }
    }
    AuthError::Sqlx(err)
}
