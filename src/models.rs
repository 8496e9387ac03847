use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::auth::responses::Role;

// ===== Persisted rows =====

/// A user row as stored in Postgres. The password hash never leaves the
/// process; convert to [`UserView`] before serializing anything outward.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_str(&self.role)
    }
}

// ===== API views =====

/// Public projection of a user, safe to serialize in responses.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        let role = user.role();
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            age: user.age,
            bio: user.bio,
            avatar_url: user.avatar_url,
            role,
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Aggregate counters over the user table, served on the admin stats route.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, FromRow)]
pub struct UserStats {
    pub total_users: i64,
    pub total_admins: i64,
    pub active_users: i64,
    pub average_age: Option<f64>,
}

/// Trivial acknowledgment payload for routes that have nothing to return.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ===== Request bodies for the user-facing routes =====

/// Full replacement of the mutable profile fields (PUT semantics: omitted
/// optional fields clear the stored value).
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateProfileRequest {
    pub display_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Account deletion requires the password to be re-entered as confirmation.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// Admin-side update: the profile fields plus role and active flag. Role and
/// flag keep their current value when omitted.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AdminUpdateRequest {
    pub display_name: String,
    pub email: String,
    pub age: Option<i32>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}
