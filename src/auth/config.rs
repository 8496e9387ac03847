use crate::auth::{AuthError, AuthResult};

/// Authentication configuration loaded from environment variables. The
/// signing secret is the only required setting; everything else has a
/// default. The Argon2 work factor lives here so it is injected into the
/// hasher at construction rather than hard-coded at call sites.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub argon2_m_cost_kib: u32,
    pub argon2_t_cost: u32,
    pub argon2_p_cost: u32,
}

impl AuthConfig {
    pub fn from_env() -> AuthResult<Self> {
        let issuer =
            std::env::var("ACCOUNT_JWT_ISSUER").unwrap_or_else(|_| "http://localhost".into());
        let audience =
            std::env::var("ACCOUNT_JWT_AUDIENCE").unwrap_or_else(|_| "account-api".into());
        let jwt_secret = std::env::var("ACCOUNT_JWT_SECRET")
            .map_err(|_| AuthError::Config("ACCOUNT_JWT_SECRET is required".into()))?;
        let token_ttl_secs = std::env::var("ACCOUNT_TOKEN_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24 * 60 * 60);
        let argon2_m_cost_kib = std::env::var("ACCOUNT_ARGON2_M_COST_KIB")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(19 * 1024);
        let argon2_t_cost = std::env::var("ACCOUNT_ARGON2_T_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(2);
        let argon2_p_cost = std::env::var("ACCOUNT_ARGON2_P_COST")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(1);

        Ok(Self {
            issuer,
            audience,
            jwt_secret,
            token_ttl_secs,
            argon2_m_cost_kib,
            argon2_t_cost,
            argon2_p_cost,
        })
    }
}

/// Fixed-value configuration for unit tests. The token lifetime is the one
/// knob tests need to vary (a negative lifetime mints already-expired
/// tokens); the Argon2 cost is dialed down to keep the suite fast.
#[cfg(test)]
pub fn test_config(token_ttl_secs: i64) -> AuthConfig {
    AuthConfig {
        issuer: "https://account-api.test".into(),
        audience: "account-api".into(),
        jwt_secret: "unit-test-signing-secret".into(),
        token_ttl_secs,
        argon2_m_cost_kib: 4096,
        argon2_t_cost: 1,
        argon2_p_cost: 1,
    }
}
