//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared read-only.

use std::time::Duration;

use platform::cookie::CookieConfig;

/// Re-export platform types used in config fields
pub use platform::cookie::SameSite;
pub use platform::password::HashCost;
pub use platform::token::SigningAlgorithm;

/// Longest token lifetime honoured (100 years); longer TTLs are clamped
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Token signing secret (shared by access and refresh tokens)
    pub token_secret: Vec<u8>,
    /// HMAC algorithm for tokens
    pub token_algorithm: SigningAlgorithm,
    /// Access token TTL (60 minutes)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (7 days)
    pub refresh_token_ttl: Duration,
    /// Refresh token cookie name
    pub refresh_cookie_name: String,
    /// Access token cookie name (read-only fallback for `/me`)
    pub access_cookie_name: String,
    /// Cookie path (the auth route prefix)
    pub cookie_path: String,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Argon2id cost
    pub password_cost: HashCost,
    /// Refuse sign-in until the email is verified
    pub require_verified_email: bool,
    /// OAuth client id; the expected `aud` of provider id-tokens
    pub oauth_client_id: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            token_algorithm: SigningAlgorithm::HS256,
            access_token_ttl: Duration::from_secs(60 * 60), // 60 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
            refresh_cookie_name: "refresh_token".to_string(),
            access_cookie_name: "access_token".to_string(),
            cookie_path: "/api/auth".to_string(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
            password_cost: HashCost::default(),
            require_verified_email: false,
            oauth_client_id: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 64];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Access token lifetime in seconds (`expires_in`)
    pub fn access_token_ttl_secs(&self) -> i64 {
        clamped_secs(self.access_token_ttl)
    }

    pub fn refresh_token_ttl_secs(&self) -> i64 {
        clamped_secs(self.refresh_token_ttl)
    }

    /// Attributes of the refresh token cookie
    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.refresh_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: self.cookie_path.clone(),
            max_age_secs: Some(self.refresh_token_ttl_secs()),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("token_algorithm", &self.token_algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("access_cookie_name", &self.access_cookie_name)
            .field("cookie_path", &self.cookie_path)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .field("password_cost", &self.password_cost)
            .field("require_verified_email", &self.require_verified_email)
            .field("oauth_client_id", &self.oauth_client_id)
            .finish()
    }
}

fn clamped_secs(ttl: Duration) -> i64 {
    // MAX_TOKEN_TTL fits in i64 seconds
    ttl.min(MAX_TOKEN_TTL).as_secs() as i64
}
