//! Authentication module: configuration, credential handling, token minting,
//! Rocket request guards, and HTTP route handlers.

use std::sync::Arc;

use rocket_db_pools::sqlx::PgPool;

pub mod config;
pub mod error;
pub mod guards;
pub mod jwt;
pub mod passwords;
pub mod responses;
pub mod routes;
pub mod service;
pub mod store;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use guards::{AuthUser, RequireAdmin};
pub use jwt::JwtService;
pub use passwords::PasswordService;
pub use service::AccountService;
pub use store::UserStore;

/// Process-wide authentication state managed by Rocket: the configuration
/// plus the three services built from it at startup.
#[derive(Clone)]
pub struct AuthState {
    pub config: AuthConfig,
    pub passwords: Arc<PasswordService>,
    pub jwt: Arc<JwtService>,
    pub accounts: Arc<AccountService>,
}

impl AuthState {
    pub fn new(config: AuthConfig, pool: PgPool) -> AuthResult<Self> {
        let passwords = Arc::new(PasswordService::new(&config)?);
        let jwt = Arc::new(JwtService::from_config(&config)?);
        let accounts = Arc::new(AccountService::new(
            UserStore::new(pool),
            passwords.clone(),
            jwt.clone(),
        ));
        Ok(Self {
            config,
            passwords,
            jwt,
            accounts,
        })
    }
}
