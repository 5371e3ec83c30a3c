//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::tokens::{SignedInSession, TokenPair};
use crate::domain::entity::user::User;

/// `token_type` of every issued token
pub const TOKEN_TYPE_BEARER: &str = "bearer";

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Sign up response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpResponse {
    pub id: String,
    pub email: String,
    pub is_verified: bool,
}

impl From<&User> for SignUpResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            email: user.email.to_string(),
            is_verified: user.is_verified,
        }
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// Sign in request
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Public projection of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub profile_image_url: Option<String>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            email: user.email.to_string(),
            name: user.name.as_ref().map(|n| n.as_str().to_string()),
            profile_image_url: user
                .profile_image_url
                .as_ref()
                .map(|u| u.as_str().to_string()),
        }
    }
}

/// Sign in response (password and provider sign-in)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
    pub user: UserResponse,
}

impl From<&SignedInSession> for SessionResponse {
    fn from(session: &SignedInSession) -> Self {
        Self {
            access_token: session.tokens.access_token.clone(),
            refresh_token: session.tokens.refresh_token.clone(),
            expires_in: session.tokens.expires_in,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            user: UserResponse::from(&session.user),
        }
    }
}

// ============================================================================
// OAuth
// ============================================================================

/// Provider sign-in request, posted after the provider redirect
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthRequest {
    pub provider: String,
    pub provider_account_id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    pub id_token: String,
    #[serde(default)]
    pub provider_access_token: Option<String>,
    #[serde(default)]
    pub provider_refresh_token: Option<String>,
    /// Unix seconds
    #[serde(default)]
    pub provider_token_expires_at: Option<i64>,
}

// ============================================================================
// Refresh
// ============================================================================

/// Refresh response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

impl From<&TokenPair> for RefreshResponse {
    fn from(pair: &TokenPair) -> Self {
        Self {
            access_token: pair.access_token.clone(),
            refresh_token: pair.refresh_token.clone(),
            expires_in: pair.expires_in,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

// ============================================================================
// Current User
// ============================================================================

/// PATCH /me request. Omitted fields are left unchanged; `""` clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}
