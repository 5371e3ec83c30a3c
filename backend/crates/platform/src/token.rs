//! Signed Session Tokens
//!
//! Stateless JWTs signed with one symmetric secret (HMAC-SHA2).
//! Access and refresh tokens share the secret and algorithm; they are told
//! apart only by the `type` claim, which [`TokenCodec::verify`] enforces.
//!
//! ## Claims
//! - `sub`: user id
//! - `email`: optional
//! - `type`: `access` | `refresh`
//! - `iat` / `exp`: seconds since the Unix epoch

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum secret size in bytes (256 bits)
pub const MIN_SECRET_LENGTH: usize = 32;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad signature, expired, malformed, missing claims or wrong kind.
    /// Callers never learn which.
    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Token signing failed: {0}")]
    Signing(String),

    #[error("Token secret must be at least {min} bytes (got {actual})")]
    WeakSecret { min: usize, actual: usize },

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

// ============================================================================
// Claims
// ============================================================================

/// Token kind, carried in the `type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "type")]
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

// ============================================================================
// Algorithm
// ============================================================================

/// HMAC-SHA2 family supported for signing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningAlgorithm {
    #[default]
    HS256,
    HS384,
    HS512,
}

impl SigningAlgorithm {
    fn as_jwt(&self) -> Algorithm {
        match self {
            SigningAlgorithm::HS256 => Algorithm::HS256,
            SigningAlgorithm::HS384 => Algorithm::HS384,
            SigningAlgorithm::HS512 => Algorithm::HS512,
        }
    }
}

impl FromStr for SigningAlgorithm {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HS256" => Ok(SigningAlgorithm::HS256),
            "HS384" => Ok(SigningAlgorithm::HS384),
            "HS512" => Ok(SigningAlgorithm::HS512),
            other => Err(TokenError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

// ============================================================================
// Codec
// ============================================================================

/// Issues and verifies signed tokens
///
/// ## Examples
/// ```rust
/// use chrono::Duration;
/// use platform::token::{SigningAlgorithm, TokenCodec, TokenKind};
///
/// let codec = TokenCodec::new(&[7u8; 32], SigningAlgorithm::HS256).unwrap();
/// let token = codec
///     .issue("user-1", Some("a@x.com"), TokenKind::Access, Duration::minutes(60))
///     .unwrap();
///
/// let claims = codec.verify(&token, TokenKind::Access).unwrap();
/// assert_eq!(claims.sub, "user-1");
/// assert!(codec.verify(&token, TokenKind::Refresh).is_err());
/// ```
#[derive(Clone)]
pub struct TokenCodec {
    algorithm: SigningAlgorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenCodec {
    pub fn new(secret: &[u8], algorithm: SigningAlgorithm) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::WeakSecret {
                min: MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    pub fn algorithm(&self) -> SigningAlgorithm {
        self.algorithm
    }

    /// Issue a token valid for `ttl` from now
    pub fn issue(
        &self,
        subject: &str,
        email: Option<&str>,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        self.issue_at(subject, email, kind, ttl, Utc::now())
    }

    /// Issue a token as if at `issued_at`
    pub fn issue_at(
        &self,
        subject: &str,
        email: Option<&str>,
        kind: TokenKind,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = TokenClaims {
            sub: subject.to_string(),
            email: email.map(str::to_string),
            kind,
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        encode(&Header::new(self.algorithm.as_jwt()), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature, expiry (no leeway), `sub` presence and kind.
    ///
    /// Any failure is [`TokenError::InvalidToken`]; the reason only goes to
    /// the debug log.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(self.algorithm.as_jwt());
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding, &validation)
            .map_err(|e| {
                tracing::debug!(reason = %e, expected = %expected, "Token rejected");
                TokenError::InvalidToken
            })?
            .claims;

        // `exp` is exclusive; the decoder only rejects once it has passed
        if claims.exp <= Utc::now().timestamp() {
            tracing::debug!(expected = %expected, "Token expired");
            return Err(TokenError::InvalidToken);
        }

        if claims.kind != expected {
            tracing::debug!(expected = %expected, actual = %claims.kind, "Token kind mismatch");
            return Err(TokenError::InvalidToken);
        }

        if claims.sub.is_empty() {
            tracing::debug!("Token has empty subject");
            return Err(TokenError::InvalidToken);
        }

        Ok(claims)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, SigningAlgorithm::HS256).unwrap()
    }

    fn segments(token: &str) -> Vec<&str> {
        token.split('.').collect()
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let codec = codec();
        let token = codec
            .issue("user-1", Some("a@x.com"), TokenKind::Access, Duration::minutes(60))
            .unwrap();

        let claims = codec.verify(&token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.kind, TokenKind::Access);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_refresh_ttl_in_days() {
        let codec = codec();
        let token = codec
            .issue("user-1", None, TokenKind::Refresh, Duration::days(7))
            .unwrap();
        let claims = codec.verify(&token, TokenKind::Refresh).unwrap();
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);
        assert!(claims.email.is_none());
    }

    #[test]
    fn test_kind_separation() {
        let codec = codec();
        let access = codec
            .issue("user-1", None, TokenKind::Access, Duration::minutes(5))
            .unwrap();
        let refresh = codec
            .issue("user-1", None, TokenKind::Refresh, Duration::minutes(5))
            .unwrap();

        assert_eq!(
            codec.verify(&access, TokenKind::Refresh),
            Err(TokenError::InvalidToken)
        );
        assert_eq!(
            codec.verify(&refresh, TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = codec();
        let two_hours_ago = Utc::now() - Duration::hours(2);
        let token = codec
            .issue_at("user-1", None, TokenKind::Access, Duration::hours(1), two_hours_ago)
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_zero_ttl_token_rejected() {
        let codec = codec();
        let token = codec
            .issue("user-1", None, TokenKind::Access, Duration::zero())
            .unwrap();

        assert_eq!(
            codec.verify(&token, TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = codec()
            .issue("user-1", None, TokenKind::Access, Duration::minutes(5))
            .unwrap();
        let other = TokenCodec::new(&[9u8; 32], SigningAlgorithm::HS256).unwrap();

        assert_eq!(
            other.verify(&token, TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let codec = codec();
        let mine = codec
            .issue("user-1", None, TokenKind::Refresh, Duration::minutes(5))
            .unwrap();
        let theirs = codec
            .issue("user-2", None, TokenKind::Refresh, Duration::minutes(5))
            .unwrap();

        let (m, t) = (segments(&mine), segments(&theirs));
        let forged = format!("{}.{}.{}", m[0], t[1], m[2]);

        assert_eq!(
            codec.verify(&forged, TokenKind::Refresh),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_algorithm_mismatch_rejected() {
        let token = TokenCodec::new(SECRET, SigningAlgorithm::HS512)
            .unwrap()
            .issue("user-1", None, TokenKind::Access, Duration::minutes(5))
            .unwrap();

        assert_eq!(
            codec().verify(&token, TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_missing_subject_rejected() {
        let now = Utc::now().timestamp();
        let claims = serde_json::json!({ "type": "access", "iat": now, "exp": now + 300 });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert_eq!(
            codec().verify(&token, TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_garbage_rejected() {
        assert_eq!(
            codec().verify("not.a.jwt", TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
        assert_eq!(
            codec().verify("", TokenKind::Access),
            Err(TokenError::InvalidToken)
        );
    }

    #[test]
    fn test_weak_secret_rejected() {
        assert!(matches!(
            TokenCodec::new(b"short", SigningAlgorithm::HS256),
            Err(TokenError::WeakSecret { min: 32, actual: 5 })
        ));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("HS256".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::HS256);
        assert_eq!("hs512".parse::<SigningAlgorithm>().unwrap(), SigningAlgorithm::HS512);
        assert!("RS256".parse::<SigningAlgorithm>().is_err());
    }

    #[test]
    fn test_claims_wire_format() {
        let claims = TokenClaims {
            sub: "u".to_string(),
            email: None,
            kind: TokenKind::Refresh,
            iat: 1,
            exp: 2,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["type"], "refresh");
        assert!(json.get("email").is_none());
    }
}
