//! Linked Account Entity
//!
//! Binds a user to one identity at an external provider. At most one per
//! (user, provider); a provider subject belongs to at most one user.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::domain::value_object::{
    ids::{LinkedAccountId, UserId},
    provider::Provider,
};

/// Provider-issued tokens cached on the link. Opaque to this service.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ProviderTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Unix seconds
    pub expires_at: Option<i64>,
}

impl ProviderTokens {
    /// Providers omit tokens they did not rotate (a refresh token is usually
    /// sent only on first consent); keep the previous value for those.
    pub fn merged_over(self, previous: &ProviderTokens) -> ProviderTokens {
        let access_token = self.access_token.or_else(|| previous.access_token.clone());
        let refresh_token = self.refresh_token.or_else(|| previous.refresh_token.clone());
        let expires_at = self.expires_at.or(previous.expires_at);
        ProviderTokens {
            access_token,
            refresh_token,
            expires_at,
        }
    }
}

impl fmt::Debug for ProviderTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTokens")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct LinkedAccount {
    pub linked_account_id: LinkedAccountId,
    pub user_id: UserId,
    pub provider: Provider,
    /// Provider-assigned subject (`sub`)
    pub provider_account_id: String,
    pub tokens: ProviderTokens,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkedAccount {
    pub fn new(
        user_id: UserId,
        provider: Provider,
        provider_account_id: impl Into<String>,
        tokens: ProviderTokens,
    ) -> Self {
        let now = Utc::now();
        Self {
            linked_account_id: LinkedAccountId::new(),
            user_id,
            provider,
            provider_account_id: provider_account_id.into(),
            tokens,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a fresh sign-in through the same provider to this link
    pub fn relink(&mut self, provider_account_id: &str, tokens: ProviderTokens) {
        self.provider_account_id = provider_account_id.to_string();
        self.tokens = tokens.merged_over(&self.tokens);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relink_keeps_unrotated_refresh_token() {
        let mut account = LinkedAccount::new(
            UserId::new(),
            Provider::new("google").unwrap(),
            "sub-1",
            ProviderTokens {
                access_token: Some("old-access".to_string()),
                refresh_token: Some("first-consent-refresh".to_string()),
                expires_at: Some(100),
            },
        );

        account.relink(
            "sub-1",
            ProviderTokens {
                access_token: Some("new-access".to_string()),
                refresh_token: None,
                expires_at: Some(200),
            },
        );

        assert_eq!(account.tokens.access_token.as_deref(), Some("new-access"));
        assert_eq!(
            account.tokens.refresh_token.as_deref(),
            Some("first-consent-refresh")
        );
        assert_eq!(account.tokens.expires_at, Some(200));
    }

    #[test]
    fn test_tokens_redacted_in_debug() {
        let account = LinkedAccount::new(
            UserId::new(),
            Provider::new("google").unwrap(),
            "1234567890",
            ProviderTokens {
                access_token: Some("ya29.secret".to_string()),
                refresh_token: Some("1//refresh-secret".to_string()),
                expires_at: Some(1_700_000_000),
            },
        );
        let debug = format!("{:?}", account);
        assert!(!debug.contains("ya29"));
        assert!(!debug.contains("refresh-secret"));
        assert!(debug.contains("1234567890"));
    }
}
