//! Sign In Use Case
//!
//! Verifies email + password and issues a token pair.
//!
//! Unknown email, provider-only account and wrong password all fail with
//! the same `InvalidCredentials` after one Argon2 verification, so neither
//! the answer nor its timing tells which it was.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::tokens::{SignedInSession, TokenIssuer};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_password::RawPassword};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<PasswordHasher>,
    tokens: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<U> SignInUseCase<U>
where
    U: UserRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        hasher: Arc<PasswordHasher>,
        tokens: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignedInSession> {
        let raw_password = RawPassword::for_verification(input.password);

        let user = match Email::new(&input.email) {
            Ok(email) => match self.user_repo.get_by_email(&email).await {
                Ok(user) => Some(user),
                Err(AuthError::UserNotFound) => None,
                Err(e) => return Err(e),
            },
            Err(_) => None,
        };

        let password_valid = match user.as_ref().and_then(|u| u.password.as_ref()) {
            Some(stored) => stored.verify(&raw_password, &self.hasher),
            None => self.hasher.verify_dummy(raw_password.inner()),
        };

        let user = match user {
            Some(user) if password_valid => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        if !user.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        if self.config.require_verified_email && !user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let tokens = self.tokens.issue_pair(&user)?;

        tracing::info!(user_id = %user.user_id, "User signed in");

        Ok(SignedInSession { tokens, user })
    }
}
