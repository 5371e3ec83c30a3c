//! Google ID Token Verifier
//!
//! Verifies Google-issued OpenID id-tokens against Google's published JWKS.
//! Keys are cached by `kid` and refetched when a token names a key the
//! cache does not hold (Google rotates its signing keys), at most once per
//! [`MIN_REFRESH_INTERVAL`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::identity::{IdentityVerifier, VerifiedIdentity};
use crate::error::{AuthError, AuthResult};

pub const GOOGLE_PROVIDER: &str = "google";
pub const GOOGLE_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Unknown `kid`s inside this window after a fetch are rejected without refetching
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

/// Google sends `email_verified` as a bool, older tokens as a string
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BoolOrString {
    Bool(bool),
    String(String),
}

impl BoolOrString {
    fn is_true(&self) -> bool {
        match self {
            BoolOrString::Bool(b) => *b,
            BoolOrString::String(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<BoolOrString>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<GoogleClaims> for VerifiedIdentity {
    fn from(claims: GoogleClaims) -> Self {
        VerifiedIdentity {
            subject: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified.is_some_and(|v| v.is_true()),
            name: claims.name,
            picture: claims.picture,
        }
    }
}

#[derive(Default)]
struct KeySet {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Option<Instant>,
}

impl KeySet {
    fn recently_fetched(&self) -> bool {
        self.fetched_at
            .is_some_and(|at| at.elapsed() < MIN_REFRESH_INTERVAL)
    }
}

/// Google id-token verifier
#[derive(Clone)]
pub struct GoogleIdTokenVerifier {
    client_id: String,
    jwks_uri: String,
    http_client: Client,
    keys: Arc<RwLock<KeySet>>,
}

impl GoogleIdTokenVerifier {
    /// Keys are fetched lazily on first use
    pub fn new(client_id: impl Into<String>) -> Self {
        Self::with_jwks_uri(client_id, GOOGLE_JWKS_URI)
    }

    pub fn with_jwks_uri(client_id: impl Into<String>, jwks_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            jwks_uri: jwks_uri.into(),
            http_client: Client::new(),
            keys: Arc::new(RwLock::new(KeySet::default())),
        }
    }

    async fn fetch_keys(&self) -> AuthResult<HashMap<String, DecodingKey>> {
        tracing::debug!(uri = %self.jwks_uri, "Fetching Google JWKS");

        let response: JwksResponse = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        let mut fresh = HashMap::new();
        for jwk in response.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            let (Some(n), Some(e)) = (&jwk.n, &jwk.e) else {
                continue;
            };
            match DecodingKey::from_rsa_components(n, e) {
                Ok(key) => {
                    fresh.insert(jwk.kid, key);
                }
                Err(err) => {
                    tracing::warn!(kid = %jwk.kid, error = %err, "Skipping unparsable JWKS key");
                }
            }
        }

        tracing::info!(count = fresh.len(), "Loaded Google JWKS keys");
        Ok(fresh)
    }

    async fn key_for(&self, kid: &str) -> AuthResult<DecodingKey> {
        if let Some(key) = self.keys.read().await.keys.get(kid) {
            return Ok(key.clone());
        }

        // Held across the fetch so concurrent misses share one request
        let mut key_set = self.keys.write().await;
        if !key_set.keys.contains_key(kid) && !key_set.recently_fetched() {
            key_set.keys = self.fetch_keys().await?;
            key_set.fetched_at = Some(Instant::now());
        }

        key_set.keys.get(kid).cloned().ok_or_else(|| {
            tracing::debug!(kid, "Id-token signed with unknown key");
            AuthError::InvalidToken
        })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[&self.client_id]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }
}

impl IdentityVerifier for GoogleIdTokenVerifier {
    fn provider(&self) -> &str {
        GOOGLE_PROVIDER
    }

    async fn verify(&self, id_token: &str) -> AuthResult<VerifiedIdentity> {
        let header = decode_header(id_token).map_err(|e| {
            tracing::debug!(error = %e, "Malformed id-token header");
            AuthError::InvalidToken
        })?;

        if header.alg != Algorithm::RS256 {
            tracing::debug!(alg = ?header.alg, "Unexpected id-token algorithm");
            return Err(AuthError::InvalidToken);
        }

        let Some(kid) = header.kid else {
            tracing::debug!("Id-token header has no kid");
            return Err(AuthError::InvalidToken);
        };

        let key = self.key_for(&kid).await?;

        let data = decode::<GoogleClaims>(id_token, &key, &self.validation()).map_err(|e| {
            tracing::debug!(error = %e, "Id-token rejected");
            AuthError::InvalidToken
        })?;

        Ok(data.claims.into())
    }
}

impl std::fmt::Debug for GoogleIdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdTokenVerifier")
            .field("client_id", &self.client_id)
            .field("jwks_uri", &self.jwks_uri)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    // Unroutable, so any accidental fetch fails fast
    fn verifier() -> GoogleIdTokenVerifier {
        GoogleIdTokenVerifier::with_jwks_uri("client-123", "http://127.0.0.1:9/certs")
    }

    #[tokio::test]
    async fn test_malformed_token_is_invalid() {
        let err = verifier().verify("not-a-jwt").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_hmac_signed_token_is_rejected_before_key_lookup() {
        let token = encode(
            &Header::new(Algorithm::HS256),
            &json!({"sub": "1", "exp": 4_000_000_000u64}),
            &EncodingKey::from_secret(b"attacker-chosen-secret"),
        )
        .unwrap();

        let err = verifier().verify(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    // {"alg":"RS256","kid":"rotated"}
    const UNKNOWN_KID_TOKEN: &str = "eyJhbGciOiJSUzI1NiIsImtpZCI6InJvdGF0ZWQifQ.e30.c2ln";

    #[tokio::test]
    async fn test_unknown_kid_triggers_fetch() {
        let err = verifier().verify(UNKNOWN_KID_TOKEN).await.unwrap_err();
        assert!(matches!(err, AuthError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn test_unknown_kid_after_recent_fetch_is_not_refetched() {
        let verifier = verifier();
        verifier.keys.write().await.fetched_at = Some(Instant::now());

        let err = verifier.verify(UNKNOWN_KID_TOKEN).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken));
    }

    #[test]
    fn test_email_verified_accepts_bool_and_string() {
        let claims: GoogleClaims =
            serde_json::from_value(json!({"sub": "1", "email_verified": "true"})).unwrap();
        assert!(VerifiedIdentity::from(claims).email_verified);

        let claims: GoogleClaims =
            serde_json::from_value(json!({"sub": "1", "email_verified": false})).unwrap();
        assert!(!VerifiedIdentity::from(claims).email_verified);

        let claims: GoogleClaims = serde_json::from_value(json!({"sub": "1"})).unwrap();
        assert!(!VerifiedIdentity::from(claims).email_verified);
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(verifier().provider(), "google");
    }
}
