use std::sync::{Arc, OnceLock};

use regex::Regex;

use crate::auth::jwt::{JwtService, SignedToken};
use crate::auth::passwords::PasswordService;
use crate::auth::responses::RegisterRequest;
use crate::auth::store::{NewUserRecord, UserStore};
use crate::auth::{AuthError, AuthResult};
use crate::models::{AdminUpdateRequest, UpdateProfileRequest, UserStats, UserView};

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 6;

/// Orchestrates the account lifecycle: registration, login, password changes,
/// profile updates, and deletion, over the credential store, password hasher,
/// and token issuer. Every operation returns a typed [`AuthResult`]; nothing
/// panics across the route boundary.
///
/// Logout is absent on purpose: tokens are not tracked server-side, so logout
/// is a stateless acknowledgment handled entirely at the route layer.
pub struct AccountService {
    store: UserStore,
    passwords: Arc<PasswordService>,
    jwt: Arc<JwtService>,
}

impl AccountService {
    pub fn new(store: UserStore, passwords: Arc<PasswordService>, jwt: Arc<JwtService>) -> Self {
        Self {
            store,
            passwords,
            jwt,
        }
    }

    /// Create a new active, `user`-role account and mint its first token.
    /// Racing registrations on the same username or email are settled by the
    /// store's unique indexes; the loser surfaces as `Conflict` with no
    /// partial row.
    pub async fn register(&self, request: RegisterRequest) -> AuthResult<(SignedToken, UserView)> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();
        let display_name = request.display_name.trim().to_string();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&request.password)?;
        if display_name.is_empty() {
            return Err(AuthError::Validation("display name is required".into()));
        }

        let password_hash = self.passwords.hash_password(&request.password)?;
        let user = self
            .store
            .insert(NewUserRecord {
                username,
                email,
                password_hash,
                display_name,
                age: request.age,
                bio: request.bio,
            })
            .await?;

        let token = self.jwt.issue_token(user.id, &user.username, user.role())?;
        Ok((token, user.into()))
    }

    /// Authenticate by username or email. An unknown identifier and a wrong
    /// password both produce the same `InvalidCredentials`; only a known but
    /// deactivated account is distinguished, as `AccountDisabled`.
    pub async fn login(&self, identifier: &str, password: &str) -> AuthResult<(SignedToken, UserView)> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "identifier and password are required".into(),
            ));
        }

        let user = self
            .store
            .find_by_username_or_email(identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        if !self.passwords.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.jwt.issue_token(user.id, &user.username, user.role())?;
        Ok((token, user.into()))
    }

    pub async fn get_profile(&self, user_id: i32) -> AuthResult<UserView> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    pub async fn update_profile(
        &self,
        user_id: i32,
        mut fields: UpdateProfileRequest,
    ) -> AuthResult<UserView> {
        fields.display_name = fields.display_name.trim().to_string();
        fields.email = fields.email.trim().to_lowercase();
        if fields.display_name.is_empty() {
            return Err(AuthError::Validation("display name is required".into()));
        }
        validate_email(&fields.email)?;

        let user = self
            .store
            .update_profile(user_id, &fields)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    /// The current password must re-verify before the new one is accepted; on
    /// mismatch the stored hash is left untouched.
    pub async fn change_password(
        &self,
        user_id: i32,
        current_password: &str,
        new_password: &str,
    ) -> AuthResult<()> {
        validate_password(new_password)?;

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self
            .passwords
            .verify_password(current_password, &user.password_hash)?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let new_hash = self.passwords.hash_password(new_password)?;
        self.store.update_password(user_id, &new_hash).await?;
        Ok(())
    }

    /// Self-deletion requires the password to be re-entered as confirmation.
    pub async fn delete_self(&self, user_id: i32, password: &str) -> AuthResult<()> {
        if password.is_empty() {
            return Err(AuthError::Validation(
                "password is required to delete account".into(),
            ));
        }

        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)?;

        if !self.passwords.verify_password(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }

        self.store.delete(user_id).await?;
        Ok(())
    }

    pub async fn admin_list(&self) -> AuthResult<Vec<UserView>> {
        let users = self.store.list().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    pub async fn admin_get(&self, target_id: i32) -> AuthResult<UserView> {
        let user = self
            .store
            .find_by_id(target_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    pub async fn admin_update(
        &self,
        target_id: i32,
        mut fields: AdminUpdateRequest,
    ) -> AuthResult<UserView> {
        fields.display_name = fields.display_name.trim().to_string();
        fields.email = fields.email.trim().to_lowercase();
        if fields.display_name.is_empty() {
            return Err(AuthError::Validation("display name is required".into()));
        }
        validate_email(&fields.email)?;

        let user = self
            .store
            .admin_update(target_id, &fields)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    /// Admins may delete any account except their own; returns the removed
    /// user's public view.
    pub async fn admin_delete(&self, acting_admin_id: i32, target_id: i32) -> AuthResult<UserView> {
        if acting_admin_id == target_id {
            return Err(AuthError::SelfDeletionForbidden);
        }

        let user = self
            .store
            .delete(target_id)
            .await?
            .ok_or(AuthError::NotFound)?;
        Ok(user.into())
    }

    pub async fn stats(&self) -> AuthResult<UserStats> {
        self.store.stats().await
    }
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"))
}

fn validate_username(username: &str) -> AuthResult<()> {
    let length = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&length) {
        return Err(AuthError::Validation(
            "username must be between 3 and 50 characters".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AuthResult<()> {
    if !email_pattern().is_match(email) {
        return Err(AuthError::Validation("invalid email format".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(AuthError::Validation(
            "password must be at least 6 characters".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_length_bounds() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(50)).is_ok());
        assert!(validate_username(&"a".repeat(51)).is_err());
    }

    #[test]
    fn email_pattern_accepts_addresses_and_rejects_junk() {
        assert!(validate_email("alice@x.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("two@@x.com").is_err());
        assert!(validate_email("spaces in@x.com").is_err());
        assert!(validate_email("missing@tld").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }
}
