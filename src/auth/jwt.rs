use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::auth::responses::Role;
use crate::auth::{AuthConfig, AuthError, AuthResult};

/// Claim set carried by every bearer token. Validity is determined purely by
/// signature and expiry; nothing is tracked server-side, so a token stays
/// usable until `exp` even after logout or deactivation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
    pub username: String,
    pub role: String,
}

impl TokenClaims {
    pub fn user_id(&self) -> AuthResult<i32> {
        self.sub.parse().map_err(|_| AuthError::TokenInvalid)
    }

    pub fn role(&self) -> Role {
        Role::from_str(&self.role)
    }
}

#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Stateless HS256 token issuer/verifier built from the server-held secret.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    token_ttl: Duration,
}

impl JwtService {
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let secret_bytes = config.jwt_secret.as_bytes();
        let encoding_key = EncodingKey::from_secret(secret_bytes);
        let decoding_key = DecodingKey::from_secret(secret_bytes);

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.clone()]);
        validation.set_issuer(&[config.issuer.clone()]);
        validation.leeway = 30;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            token_ttl: Duration::seconds(config.token_ttl_secs),
        })
    }

    pub fn issue_token(&self, user_id: i32, username: &str, role: Role) -> AuthResult<SignedToken> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = TokenClaims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| AuthError::Jwt(err.to_string()))?;

        Ok(SignedToken { token, expires_at })
    }

    /// Decode and verify a presented token. [`AuthError::TokenExpired`] once
    /// the current time passes `exp`; [`AuthError::TokenInvalid`] on a bad
    /// signature or a payload that does not match the claim shape.
    pub fn decode_token(&self, token: &str) -> AuthResult<TokenClaims> {
        match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(AuthError::TokenExpired),
                _ => Err(AuthError::TokenInvalid),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::test_config;

    #[test]
    fn issues_and_decodes_tokens() {
        let service = JwtService::from_config(&test_config(900)).expect("jwt service");

        let signed = service.issue_token(42, "alice", Role::User).expect("issue");
        let claims = service.decode_token(&signed.token).expect("decode");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.user_id().expect("numeric sub"), 42);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "user");
        assert_eq!(claims.role(), Role::User);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expired_token_is_rejected_as_expired() {
        // A negative lifetime mints a token whose expiry is already in the
        // past, beyond the 30s validation leeway.
        let service = JwtService::from_config(&test_config(-120)).expect("jwt service");
        let signed = service.issue_token(1, "alice", Role::User).expect("issue");

        match service.decode_token(&signed.token) {
            Err(AuthError::TokenExpired) => {}
            other => panic!("expected TokenExpired, got {other:?}"),
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let issuer = JwtService::from_config(&test_config(900)).expect("jwt service");
        let mut other_config = test_config(900);
        other_config.jwt_secret = "a-different-secret".into();
        let verifier = JwtService::from_config(&other_config).expect("jwt service");

        let signed = issuer.issue_token(7, "mallory", Role::Admin).expect("issue");
        match verifier.decode_token(&signed.token) {
            Err(AuthError::TokenInvalid) => {}
            other => panic!("expected TokenInvalid, got {other:?}"),
        }
    }

    #[test]
    fn garbage_is_invalid_not_a_crash() {
        let service = JwtService::from_config(&test_config(900)).expect("jwt service");
        match service.decode_token("not.a.token") {
            Err(AuthError::TokenInvalid) => {}
            other => panic!("expected TokenInvalid, got {other:?}"),
        }
    }
}
