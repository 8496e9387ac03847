use argon2::{
    Algorithm, Argon2, ParamsBuilder, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::RngCore;

use crate::auth::{AuthConfig, AuthError, AuthResult};

const SALT_LEN: usize = 16;

/// One-way salted password hashing with the work factor taken from
/// [`AuthConfig`]. Each hash embeds a fresh random salt, so two hashes of the
/// same plaintext differ while verification still succeeds.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    pub fn new(config: &AuthConfig) -> AuthResult<Self> {
        let mut builder = ParamsBuilder::new();
        builder.m_cost(config.argon2_m_cost_kib);
        builder.t_cost(config.argon2_t_cost);
        builder.p_cost(config.argon2_p_cost);
        let params = builder.build().map_err(AuthError::from)?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        Ok(Self { argon2 })
    }

    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        let mut salt_bytes = [0u8; SALT_LEN];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes).map_err(AuthError::from)?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(AuthError::from)?
            .to_string();
        Ok(hash)
    }

    /// `Ok(false)` on a wrong password; errors only when the stored record is
    /// malformed.
    pub fn verify_password(&self, password: &str, encoded: &str) -> AuthResult<bool> {
        let parsed = PasswordHash::new(encoded)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(AuthError::from(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::config::test_config;

    fn service() -> PasswordService {
        PasswordService::new(&test_config(900)).expect("password service")
    }

    #[test]
    fn hashes_and_verifies_passwords() {
        let service = service();
        let hash = service.hash_password("super-secret").expect("hash");
        assert!(service.verify_password("super-secret", &hash).expect("verify"));
        assert!(!service.verify_password("wrong-password", &hash).expect("verify runs"));
    }

    #[test]
    fn same_plaintext_hashes_differently() {
        let service = service();
        let first = service.hash_password("secret1").expect("hash");
        let second = service.hash_password("secret1").expect("hash");
        assert_ne!(first, second);
        assert!(service.verify_password("secret1", &first).expect("verify"));
        assert!(service.verify_password("secret1", &second).expect("verify"));
    }

    #[test]
    fn malformed_record_is_an_error_not_a_mismatch() {
        let service = service();
        assert!(service.verify_password("anything", "not-a-phc-string").is_err());
    }
}
