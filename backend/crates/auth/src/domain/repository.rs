//! Repository Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer. Every mutating operation is atomic, and store
//! failures surface as `AuthError::Database`.

use crate::domain::entity::{linked_account::LinkedAccount, user::User};
use crate::domain::value_object::{email::Email, ids::UserId, provider::Provider};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Case-insensitive email lookup
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// `UserNotFound` if absent
    async fn get_by_email(&self, email: &Email) -> AuthResult<User>;

    /// `UserNotFound` if absent
    async fn get_by_id(&self, user_id: &UserId) -> AuthResult<User>;

    /// `EmailTaken` if the email is already registered
    async fn create(&self, user: &User) -> AuthResult<User>;

    /// Persist profile and verification changes. `UserNotFound` if absent.
    async fn update(&self, user: &User) -> AuthResult<User>;

    /// Delete the user and, by cascade, its linked accounts
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;
}

/// Linked account repository trait
#[trait_variant::make(LinkedAccountRepository: Send)]
pub trait LocalLinkedAccountRepository {
    async fn find_linked_account(
        &self,
        user_id: &UserId,
        provider: &Provider,
    ) -> AuthResult<Option<LinkedAccount>>;

    async fn find_linked_account_by_subject(
        &self,
        provider: &Provider,
        provider_account_id: &str,
    ) -> AuthResult<Option<LinkedAccount>>;

    /// Insert, or update the existing (user, provider) link in place.
    ///
    /// Returns the stored row, which keeps its original id. `Duplicate` if
    /// the provider subject is already linked to another user.
    async fn upsert_linked_account(&self, account: &LinkedAccount) -> AuthResult<LinkedAccount>;

    /// Create a user and its first link in one transaction.
    ///
    /// `EmailTaken` if the email is registered meanwhile; nothing is written.
    async fn create_with_linked_account(
        &self,
        user: &User,
        account: &LinkedAccount,
    ) -> AuthResult<(User, LinkedAccount)>;
}
