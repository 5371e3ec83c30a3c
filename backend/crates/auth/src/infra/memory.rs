//! In-Memory Repository Implementation
//!
//! Same contract as the PostgreSQL store, with uniqueness enforced under a
//! single write lock. Used by tests and local runs without a database.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entity::{linked_account::LinkedAccount, user::User};
use crate::domain::repository::{LinkedAccountRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    ids::{LinkedAccountId, UserId},
    provider::Provider,
};
use crate::error::{AuthError, AuthResult};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    accounts: HashMap<LinkedAccountId, LinkedAccount>,
}

impl State {
    fn email_taken(&self, email: &Email) -> bool {
        self.users.values().any(|u| &u.email == email)
    }

    fn check_insert_account(&self, account: &LinkedAccount) -> AuthResult<()> {
        let subject_taken = self.accounts.values().any(|a| {
            a.provider == account.provider
                && a.provider_account_id == account.provider_account_id
                && a.user_id != account.user_id
        });
        if subject_taken {
            return Err(AuthError::Duplicate);
        }
        Ok(())
    }

    fn upsert_account(&mut self, account: &LinkedAccount) -> LinkedAccount {
        let existing = self
            .accounts
            .values_mut()
            .find(|a| a.user_id == account.user_id && a.provider == account.provider);

        match existing {
            Some(stored) => {
                stored.relink(&account.provider_account_id, account.tokens.clone());
                stored.clone()
            }
            None => {
                self.accounts
                    .insert(account.linked_account_id, account.clone());
                account.clone()
            }
        }
    }
}

/// In-memory auth repository
#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of linked accounts held for a user
    pub async fn linked_account_count(&self, user_id: &UserId) -> usize {
        let state = self.state.read().await;
        state
            .accounts
            .values()
            .filter(|a| &a.user_id == user_id)
            .count()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for MemoryAuthRepository {
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self.state.read().await.email_taken(email))
    }

    async fn get_by_email(&self, email: &Email) -> AuthResult<User> {
        let state = self.state.read().await;
        state
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    async fn get_by_id(&self, user_id: &UserId) -> AuthResult<User> {
        let state = self.state.read().await;
        state
            .users
            .get(user_id)
            .cloned()
            .ok_or(AuthError::UserNotFound)
    }

    async fn create(&self, user: &User) -> AuthResult<User> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email) {
            return Err(AuthError::EmailTaken);
        }
        if state.users.contains_key(&user.user_id) {
            return Err(AuthError::Duplicate);
        }
        state.users.insert(user.user_id, user.clone());
        Ok(user.clone())
    }

    async fn update(&self, user: &User) -> AuthResult<User> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get_mut(&user.user_id)
            .ok_or(AuthError::UserNotFound)?;

        // Email and password are not changed through update
        stored.name = user.name.clone();
        stored.profile_image_url = user.profile_image_url.clone();
        stored.is_active = user.is_active;
        stored.is_verified = user.is_verified;
        stored.updated_at = user.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        let mut state = self.state.write().await;
        if state.users.remove(user_id).is_none() {
            return Err(AuthError::UserNotFound);
        }
        state.accounts.retain(|_, a| &a.user_id != user_id);
        Ok(())
    }
}

// ============================================================================
// Linked Account Repository Implementation
// ============================================================================

impl LinkedAccountRepository for MemoryAuthRepository {
    async fn find_linked_account(
        &self,
        user_id: &UserId,
        provider: &Provider,
    ) -> AuthResult<Option<LinkedAccount>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|a| &a.user_id == user_id && &a.provider == provider)
            .cloned())
    }

    async fn find_linked_account_by_subject(
        &self,
        provider: &Provider,
        provider_account_id: &str,
    ) -> AuthResult<Option<LinkedAccount>> {
        let state = self.state.read().await;
        Ok(state
            .accounts
            .values()
            .find(|a| &a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn upsert_linked_account(&self, account: &LinkedAccount) -> AuthResult<LinkedAccount> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&account.user_id) {
            return Err(AuthError::UserNotFound);
        }
        state.check_insert_account(account)?;
        Ok(state.upsert_account(account))
    }

    async fn create_with_linked_account(
        &self,
        user: &User,
        account: &LinkedAccount,
    ) -> AuthResult<(User, LinkedAccount)> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email) {
            return Err(AuthError::EmailTaken);
        }
        state.check_insert_account(account)?;

        state.users.insert(user.user_id, user.clone());
        let account = state.upsert_account(account);
        Ok((user.clone(), account))
    }
}
