//! User Entity
//!
//! A local identity. Password is absent for accounts created through an
//! identity provider.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email,
    ids::UserId,
    profile::{DisplayName, ProfileImageUrl},
    user_password::UserPassword,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Immutable identifier
    pub user_id: UserId,
    /// Unique, lower-cased
    pub email: Email,
    pub name: Option<DisplayName>,
    /// Argon2id digest; `None` for provider-only accounts
    pub password: Option<UserPassword>,
    pub profile_image_url: Option<ProfileImageUrl>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New email/password account. Unverified until someone vouches for the email.
    pub fn new_local(email: Email, name: Option<DisplayName>, password: UserPassword) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            name,
            password: Some(password),
            profile_image_url: None,
            is_active: true,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// New account created from a verified provider identity
    pub fn new_federated(
        email: Email,
        name: Option<DisplayName>,
        profile_image_url: Option<ProfileImageUrl>,
        is_verified: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            email,
            name,
            password: None,
            profile_image_url,
            is_active: true,
            is_verified,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn can_sign_in(&self) -> bool {
        self.is_active
    }

    /// Returns whether anything changed
    pub fn mark_verified(&mut self) -> bool {
        if self.is_verified {
            return false;
        }
        self.is_verified = true;
        self.updated_at = Utc::now();
        true
    }

    pub fn set_name(&mut self, name: Option<DisplayName>) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    pub fn set_profile_image_url(&mut self, url: Option<ProfileImageUrl>) {
        self.profile_image_url = url;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::new("a@x.com").unwrap()
    }

    #[test]
    fn test_federated_user_has_no_password() {
        let user = User::new_federated(email(), None, None, true);
        assert!(user.password.is_none());
        assert!(user.is_verified);
        assert!(user.can_sign_in());
    }

    #[test]
    fn test_mark_verified_once() {
        let mut user = User::new_federated(email(), None, None, false);
        assert!(user.mark_verified());
        assert!(!user.mark_verified());
        assert!(user.is_verified);
    }
}
