use rocket::http::Status;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

/// Domain error taxonomy for the authentication core. Every operation returns
/// these as typed results; the route layer maps them to HTTP statuses and
/// withholds 500-class detail from the caller.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    /// Deliberately undifferentiated: never reveals whether the identifier or
    /// the password was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("account is deactivated")]
    AccountDisabled,
    #[error("authentication required")]
    Unauthorized,
    #[error("admin privileges required")]
    Forbidden,
    #[error("user not found")]
    NotFound,
    #[error("cannot delete your own account")]
    SelfDeletionForbidden,
    #[error("token expired")]
    TokenExpired,
    #[error("token invalid")]
    TokenInvalid,
    #[error("configuration error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Sqlx(#[from] rocket_db_pools::sqlx::Error),
    #[error("jwt error: {0}")]
    Jwt(String),
    #[error("argon2 parameter error: {0}")]
    Argon2(String),
    #[error("password hashing error: {0}")]
    PasswordHash(String),
}

impl AuthError {
    pub fn status(&self) -> Status {
        match self {
            AuthError::Validation(_) => Status::BadRequest,
            AuthError::Conflict(_) => Status::Conflict,
            AuthError::InvalidCredentials => Status::Unauthorized,
            AuthError::AccountDisabled => Status::Forbidden,
            AuthError::Unauthorized => Status::Unauthorized,
            AuthError::Forbidden => Status::Forbidden,
            AuthError::NotFound => Status::NotFound,
            AuthError::SelfDeletionForbidden => Status::BadRequest,
            AuthError::TokenExpired | AuthError::TokenInvalid => Status::Unauthorized,
            AuthError::Config(_)
            | AuthError::Sqlx(_)
            | AuthError::Jwt(_)
            | AuthError::Argon2(_)
            | AuthError::PasswordHash(_) => Status::InternalServerError,
        }
    }
}

impl From<argon2::Error> for AuthError {
    fn from(err: argon2::Error) -> Self {
        AuthError::Argon2(err.to_string())
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::PasswordHash(err.to_string())
    }
}
