//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::db::Store;
use crate::services::auth_service::{AuthError, AuthService, RegisteredUser};
use crate::services::token::TokenSigner;

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenSigner,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenSigner) -> Self {
        Self { store, tokens }
    }
}

/// Minimal shape check; the point is rejecting obviously broken input, not
/// RFC 5322 conformance.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<RegisteredUser, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username is required".to_string()));
        }
        if !is_valid_email(email) {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }
        if password.len() < 6 {
            return Err(AuthError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }

        // A racing duplicate insert is still caught by the unique index; this
        // check exists to turn the common case into a clean 400.
        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::Validation(
                "Email already registered".to_string(),
            ));
        }

        let user = self.store.create_user(username, email, password).await?;

        Ok(RegisteredUser {
            id: user.id,
            username: user.username,
            email: user.email,
        })
    }

    async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let user = self
            .store
            .verify_user_password(email, password)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let token = self
            .tokens
            .sign(user.id, &user.email)
            .map_err(|e| AuthError::Internal(format!("Failed to sign token: {e}")))?;

        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("a.b+c@sub.example.co"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("userexample.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user @example.com"));
    }
}
