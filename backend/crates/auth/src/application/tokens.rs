//! Token Issuance
//!
//! Access/refresh pairs for an authenticated user.

use chrono::Duration;
use platform::token::{TokenClaims, TokenCodec, TokenKind};

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::error::{AuthError, AuthResult};

/// Freshly issued access + refresh tokens
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Result of a successful sign-in (password or provider)
#[derive(Debug, Clone)]
pub struct SignedInSession {
    pub tokens: TokenPair,
    pub user: User,
}

/// Issues and verifies this service's tokens with the configured TTLs
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    codec: TokenCodec,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(codec: TokenCodec, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            codec,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Fails on a missing or short secret
    pub fn from_config(config: &AuthConfig) -> AuthResult<Self> {
        let codec = TokenCodec::new(&config.token_secret, config.token_algorithm)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        Ok(Self::new(
            codec,
            Duration::seconds(config.access_token_ttl_secs()),
            Duration::seconds(config.refresh_token_ttl_secs()),
        ))
    }

    pub fn issue_pair(&self, user: &User) -> AuthResult<TokenPair> {
        let subject = user.user_id.to_string();
        let email = Some(user.email.as_str());

        let access_token = self
            .codec
            .issue(&subject, email, TokenKind::Access, self.access_ttl)?;
        let refresh_token = self
            .codec
            .issue(&subject, email, TokenKind::Refresh, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.access_ttl.num_seconds(),
        })
    }

    /// Any failure is `InvalidToken`
    pub fn verify(&self, token: &str, kind: TokenKind) -> AuthResult<TokenClaims> {
        Ok(self.codec.verify(token, kind)?)
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }
}
