//! Account Use Cases
//!
//! Profile update and account deletion for the signed-in user.

use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::profile::{DisplayName, ProfileImageUrl};
use crate::error::AuthResult;

/// Fields left `None` are not touched. An empty string clears the field.
#[derive(Debug, Default)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub profile_image_url: Option<String>,
}

pub struct UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, mut user: User, input: UpdateProfileInput) -> AuthResult<User> {
        // Validate everything before touching the entity
        let name = input.name.map(DisplayName::parse).transpose()?;
        let image = input
            .profile_image_url
            .map(ProfileImageUrl::parse)
            .transpose()?;

        if name.is_none() && image.is_none() {
            return Ok(user);
        }

        if let Some(name) = name {
            user.set_name(name);
        }
        if let Some(image) = image {
            user.set_profile_image_url(image);
        }

        let user = self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.user_id, "Profile updated");

        Ok(user)
    }
}

pub struct DeleteAccountUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> DeleteAccountUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    /// Linked accounts go with the user
    pub async fn execute(&self, user: &User) -> AuthResult<()> {
        self.user_repo.delete(&user.user_id).await?;

        tracing::info!(user_id = %user.user_id, "Account deleted");

        Ok(())
    }
}
