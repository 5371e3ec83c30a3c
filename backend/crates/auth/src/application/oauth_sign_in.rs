//! OAuth Sign In Use Case
//!
//! Signs in (or signs up) with an identity provider id-token and links the
//! provider account to the local user.
//!
//! Repeated or concurrent callbacks for the same identity converge on one
//! user and one linked account: the store's uniqueness constraints decide
//! the race, and the loser re-reads and links instead of failing.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::tokens::{SignedInSession, TokenIssuer};
use crate::domain::entity::{
    linked_account::{LinkedAccount, ProviderTokens},
    user::User,
};
use crate::domain::identity::{IdentityVerifier, VerifiedIdentity};
use crate::domain::repository::{LinkedAccountRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    profile::{DisplayName, ProfileImageUrl},
    provider::Provider,
};
use crate::error::{AuthError, AuthResult};

/// OAuth sign in input, as posted by the client after the provider redirect
pub struct OAuthSignInInput {
    pub provider: String,
    pub provider_account_id: String,
    pub email: String,
    pub name: Option<String>,
    pub profile_image_url: Option<String>,
    pub id_token: String,
    pub provider_access_token: Option<String>,
    pub provider_refresh_token: Option<String>,
    /// Unix seconds
    pub provider_token_expires_at: Option<i64>,
}

/// Claims the client made, checked against the verified identity
struct CheckedIdentity {
    provider: Provider,
    email: Email,
    name: Option<DisplayName>,
    profile_image_url: Option<ProfileImageUrl>,
    identity: VerifiedIdentity,
    tokens: ProviderTokens,
}

/// OAuth sign in use case
pub struct OAuthSignInUseCase<R, V>
where
    R: UserRepository + LinkedAccountRepository,
    V: IdentityVerifier,
{
    repo: Arc<R>,
    verifier: Arc<V>,
    tokens: Arc<TokenIssuer>,
    config: Arc<AuthConfig>,
}

impl<R, V> OAuthSignInUseCase<R, V>
where
    R: UserRepository + LinkedAccountRepository,
    V: IdentityVerifier,
{
    pub fn new(
        repo: Arc<R>,
        verifier: Arc<V>,
        tokens: Arc<TokenIssuer>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            repo,
            verifier,
            tokens,
            config,
        }
    }

    pub async fn execute(&self, input: OAuthSignInInput) -> AuthResult<SignedInSession> {
        let checked = self.check_identity(input).await?;

        let user = match self.repo.get_by_email(&checked.email).await {
            Ok(user) => self.link_existing(user, &checked).await?,
            Err(AuthError::UserNotFound) => self.create_linked(&checked).await?,
            Err(e) => return Err(e),
        };

        if self.config.require_verified_email && !user.is_verified {
            return Err(AuthError::EmailNotVerified);
        }

        let tokens = self.tokens.issue_pair(&user)?;

        tracing::info!(
            user_id = %user.user_id,
            provider = %checked.provider,
            "User signed in with identity provider"
        );

        Ok(SignedInSession { tokens, user })
    }

    async fn check_identity(&self, input: OAuthSignInInput) -> AuthResult<CheckedIdentity> {
        let provider = Provider::new(&input.provider)?;
        if provider.as_str() != self.verifier.provider() {
            return Err(AuthError::InvalidInput(format!(
                "Unsupported provider: {}",
                provider
            )));
        }

        let email = Email::new(&input.email)?;

        if input.id_token.trim().is_empty() {
            return Err(AuthError::InvalidInput("id_token is required".to_string()));
        }

        let identity = self.verifier.verify(input.id_token.trim()).await?;

        let verified_email = identity
            .email
            .as_deref()
            .and_then(|e| Email::new(e).ok());
        if verified_email.as_ref() != Some(&email) {
            tracing::warn!(provider = %provider, "Claimed email does not match id-token");
            return Err(AuthError::InvalidInput(
                "Email does not match the identity token".to_string(),
            ));
        }

        if identity.subject != input.provider_account_id.trim() {
            tracing::warn!(provider = %provider, "Claimed subject does not match id-token");
            return Err(AuthError::InvalidInput(
                "Provider account id does not match the identity token".to_string(),
            ));
        }

        let name = input
            .name
            .as_deref()
            .and_then(DisplayName::lenient)
            .or_else(|| identity.name.as_deref().and_then(DisplayName::lenient));

        let profile_image_url = [input.profile_image_url.as_deref(), identity.picture.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|url| ProfileImageUrl::parse(url).ok().flatten());

        let tokens = ProviderTokens {
            access_token: input.provider_access_token.filter(|t| !t.is_empty()),
            refresh_token: input.provider_refresh_token.filter(|t| !t.is_empty()),
            expires_at: input.provider_token_expires_at,
        };

        Ok(CheckedIdentity {
            provider,
            email,
            name,
            profile_image_url,
            identity,
            tokens,
        })
    }

    async fn link_existing(&self, mut user: User, checked: &CheckedIdentity) -> AuthResult<User> {
        if !user.can_sign_in() {
            return Err(AuthError::AccountDisabled);
        }

        if checked.identity.email_verified && user.mark_verified() {
            user = self.repo.update(&user).await?;
        }

        let account = LinkedAccount::new(
            user.user_id,
            checked.provider.clone(),
            checked.identity.subject.clone(),
            checked.tokens.clone(),
        );
        self.repo.upsert_linked_account(&account).await?;

        Ok(user)
    }

    async fn create_linked(&self, checked: &CheckedIdentity) -> AuthResult<User> {
        let user = User::new_federated(
            checked.email.clone(),
            checked.name.clone(),
            checked.profile_image_url.clone(),
            checked.identity.email_verified,
        );
        let account = LinkedAccount::new(
            user.user_id,
            checked.provider.clone(),
            checked.identity.subject.clone(),
            checked.tokens.clone(),
        );

        match self.repo.create_with_linked_account(&user, &account).await {
            Ok((user, _)) => {
                tracing::info!(
                    user_id = %user.user_id,
                    provider = %checked.provider,
                    "User signed up with identity provider"
                );
                Ok(user)
            }
            Err(AuthError::EmailTaken) => {
                tracing::debug!(provider = %checked.provider, "Lost sign-up race, linking instead");
                let existing = self.repo.get_by_email(&checked.email).await?;
                self.link_existing(existing, checked).await
            }
            Err(e) => Err(e),
        }
    }
}
