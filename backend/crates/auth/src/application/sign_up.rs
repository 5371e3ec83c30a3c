//! Sign Up Use Case
//!
//! Creates a new email/password account.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    profile::DisplayName,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user: User,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: Arc<PasswordHasher>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, hasher: Arc<PasswordHasher>) -> Self {
        Self { user_repo, hasher }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let email = Email::new(&input.email)?;
        let name = match input.name {
            Some(name) => DisplayName::parse(name)?,
            None => None,
        };

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let raw_password = RawPassword::new(input.password)?;
        let password = UserPassword::hash(&raw_password, &self.hasher)?;

        // A concurrent sign-up with the same email loses here with EmailTaken
        let user = self
            .user_repo
            .create(&User::new_local(email, name, password))
            .await?;

        tracing::info!(user_id = %user.user_id, "User signed up");

        Ok(SignUpOutput { user })
    }
}
