//! Server configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::config::{AuthConfig, MAX_TOKEN_TTL, SameSite, SigningAlgorithm};
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";

#[derive(Debug)]
pub struct ServerConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), cfg!(debug_assertions))
    }

    /// `development` lets a missing `JWT_SECRET` fall back to a random one
    pub fn from_lookup<F>(lookup: F, development: bool) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse()
            .context("BIND_ADDR must be host:port")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let mut auth = match var("JWT_SECRET") {
            Some(secret) => AuthConfig {
                token_secret: decode_secret(&secret),
                ..AuthConfig::default()
            },
            None if development => {
                tracing::warn!("JWT_SECRET not set; using a random secret for this run");
                AuthConfig::development()
            }
            None => bail!("JWT_SECRET must be set in production"),
        };

        if let Some(alg) = var("JWT_ALGORITHM") {
            auth.token_algorithm = alg.parse::<SigningAlgorithm>()?;
        }
        if let Some(minutes) = var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            let minutes: u64 = minutes
                .parse()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be a number")?;
            auth.access_token_ttl = ttl_secs(minutes, 60)
                .context("ACCESS_TOKEN_EXPIRE_MINUTES is too large")?;
        }
        if let Some(days) = var("REFRESH_TOKEN_EXPIRE_DAYS") {
            let days: u64 = days
                .parse()
                .context("REFRESH_TOKEN_EXPIRE_DAYS must be a number")?;
            auth.refresh_token_ttl = ttl_secs(days, 24 * 3600)
                .context("REFRESH_TOKEN_EXPIRE_DAYS is too large")?;
        }
        if let Some(secure) = var("COOKIE_SECURE") {
            auth.cookie_secure = parse_bool(&secure).context("COOKIE_SECURE must be true/false")?;
        }
        if let Some(same_site) = var("COOKIE_SAMESITE") {
            auth.cookie_same_site = same_site
                .parse::<SameSite>()
                .map_err(anyhow::Error::msg)?;
        }
        if let Some(required) = var("REQUIRE_VERIFIED_EMAIL") {
            auth.require_verified_email =
                parse_bool(&required).context("REQUIRE_VERIFIED_EMAIL must be true/false")?;
        }
        if let Some(pepper) = var("PASSWORD_PEPPER") {
            auth.password_pepper = Some(pepper.into_bytes());
        }

        auth.oauth_client_id = var("GOOGLE_CLIENT_ID");

        Ok(Self {
            database_url,
            bind_addr,
            frontend_origins,
            auth,
        })
    }
}

/// `count * unit` seconds, if no longer than [`MAX_TOKEN_TTL`]
fn ttl_secs(count: u64, unit: u64) -> Option<Duration> {
    let ttl = Duration::from_secs(count.checked_mul(unit)?);
    (ttl <= MAX_TOKEN_TTL).then_some(ttl)
}

/// Base64 (standard) if it decodes, raw bytes otherwise
fn decode_secret(secret: &str) -> Vec<u8> {
    let secret = secret.trim();
    general_purpose::STANDARD
        .decode(secret)
        .unwrap_or_else(|_| secret.as_bytes().to_vec())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
