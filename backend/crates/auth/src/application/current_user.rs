//! Current User Use Case
//!
//! Resolves an access token to the user it was issued for.

use std::sync::Arc;

use platform::token::TokenKind;

use crate::application::tokens::TokenIssuer;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::ids::user_id_from_subject;
use crate::error::{AuthError, AuthResult};

pub struct CurrentUserUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenIssuer>,
}

impl<U> CurrentUserUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenIssuer>) -> Self {
        Self { user_repo, tokens }
    }

    /// `InvalidToken` unless `access_token` verifies as an access token;
    /// `UserNotFound` if the user is gone; `AccountDisabled` if inactive.
    pub async fn execute(&self, access_token: &str) -> AuthResult<User> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;

        let user_id = user_id_from_subject(&claims.sub)?;
        let user = self.user_repo.get_by_id(&user_id).await?;

        if !user.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        Ok(user)
    }
}
