//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a new access + refresh pair.
//! Tokens are stateless, so the old refresh token stays valid until it
//! expires.

use std::sync::Arc;

use platform::token::TokenKind;

use crate::application::tokens::{TokenIssuer, TokenPair};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::user_id_from_subject;
use crate::error::{AuthError, AuthResult};

pub struct RefreshUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenIssuer>,
}

impl<U> RefreshUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenIssuer>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;

        let user_id = user_id_from_subject(&claims.sub)?;
        let user = self.user_repo.get_by_id(&user_id).await?;

        if !user.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        let pair = self.tokens.issue_pair(&user)?;

        tracing::debug!(user_id = %user.user_id, "Token pair refreshed");

        Ok(pair)
    }
}
