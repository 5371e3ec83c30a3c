//! HTTP Handlers

use axum::Json;
use axum::extract::{Extension, State};
use axum_extra::extract::WithRejection;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::IntoResponse;
use std::sync::Arc;

use platform::client::extract_token;
use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::{
    DeleteAccountUseCase, OAuthSignInInput, OAuthSignInUseCase, RefreshUseCase, SignInInput,
    SignInUseCase, SignUpInput, SignUpUseCase, TokenIssuer, UpdateProfileInput,
    UpdateProfileUseCase,
};
use crate::domain::identity::IdentityVerifier;
use crate::domain::repository::{LinkedAccountRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    OAuthRequest, RefreshResponse, SessionResponse, SignInRequest, SignUpRequest, SignUpResponse,
    UpdateProfileRequest, UserResponse,
};
use crate::presentation::middleware::CurrentUser;

/// JSON body whose rejection is answered as `InvalidInput`
type JsonBody<T> = WithRejection<Json<T>, AuthError>;

/// Shared state for auth handlers
pub struct AuthAppState<R, V> {
    pub repo: Arc<R>,
    pub verifier: Arc<V>,
    pub config: Arc<AuthConfig>,
    pub hasher: Arc<PasswordHasher>,
    pub tokens: Arc<TokenIssuer>,
}

impl<R, V> AuthAppState<R, V> {
    /// Build the hasher and token issuer once from `config`
    pub fn new(repo: R, verifier: V, config: AuthConfig) -> AuthResult<Self> {
        let hasher = PasswordHasher::new(config.password_cost, config.password_pepper.clone())?;
        let tokens = TokenIssuer::from_config(&config)?;

        Ok(Self {
            repo: Arc::new(repo),
            verifier: Arc::new(verifier),
            config: Arc::new(config),
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
        })
    }
}

// Manual impl: derive would require `R: Clone` and `V: Clone`
impl<R, V> Clone for AuthAppState<R, V> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            verifier: self.verifier.clone(),
            config: self.config.clone(),
            hasher: self.hasher.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, V>(
    State(state): State<AuthAppState<R, V>>,
    WithRejection(Json(req), _): JsonBody<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(state.repo.clone(), state.hasher.clone());

    let input = SignUpInput {
        email: req.email,
        password: req.password,
        name: req.name,
    };

    let output = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(SignUpResponse::from(&output.user))))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<R, V>(
    State(state): State<AuthAppState<R, V>>,
    WithRejection(Json(req), _): JsonBody<SignInRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.repo.clone(),
        state.hasher.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = SignInInput {
        email: req.email,
        password: req.password,
    };

    let session = use_case.execute(input).await?;
    let headers = refresh_cookie_headers(&state.config, &session.tokens.refresh_token);

    Ok((StatusCode::OK, headers, Json(SessionResponse::from(&session))))
}

// ============================================================================
// OAuth Sign In
// ============================================================================

/// POST /api/auth/oauth
pub async fn oauth_sign_in<R, V>(
    State(state): State<AuthAppState<R, V>>,
    WithRejection(Json(req), _): JsonBody<OAuthRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = OAuthSignInUseCase::new(
        state.repo.clone(),
        state.verifier.clone(),
        state.tokens.clone(),
        state.config.clone(),
    );

    let input = OAuthSignInInput {
        provider: req.provider,
        provider_account_id: req.provider_account_id,
        email: req.email,
        name: req.name,
        profile_image_url: req.profile_image_url,
        id_token: req.id_token,
        provider_access_token: req.provider_access_token,
        provider_refresh_token: req.provider_refresh_token,
        provider_token_expires_at: req.provider_token_expires_at,
    };

    let session = use_case.execute(input).await?;
    let headers = refresh_cookie_headers(&state.config, &session.tokens.refresh_token);

    Ok((StatusCode::OK, headers, Json(SessionResponse::from(&session))))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R, V>(
    State(state): State<AuthAppState<R, V>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let token = extract_token(&headers, &state.config.refresh_cookie_name)
        .ok_or(AuthError::MissingToken)?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.tokens.clone());
    let pair = use_case.execute(&token).await?;

    let headers = refresh_cookie_headers(&state.config, &pair.refresh_token);

    Ok((StatusCode::OK, headers, Json(RefreshResponse::from(&pair))))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
///
/// Tokens are stateless; signing out only clears the refresh cookie.
pub async fn sign_out<R, V>(State(state): State<AuthAppState<R, V>>) -> impl IntoResponse
where
    R: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    (StatusCode::NO_CONTENT, delete_cookie_headers(&state.config))
}

// ============================================================================
// Current User (requires access token)
// ============================================================================

/// GET /api/auth/me
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

/// PATCH /api/auth/me
pub async fn update_me<R, V>(
    State(state): State<AuthAppState<R, V>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    WithRejection(Json(req), _): JsonBody<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = UpdateProfileUseCase::new(state.repo.clone());

    let input = UpdateProfileInput {
        name: req.name,
        profile_image_url: req.profile_image_url,
    };

    let user = use_case.execute(user, input).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// DELETE /api/auth/me
pub async fn delete_me<R, V>(
    State(state): State<AuthAppState<R, V>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let use_case = DeleteAccountUseCase::new(state.repo.clone());
    use_case.execute(&user).await?;

    Ok((StatusCode::NO_CONTENT, delete_cookie_headers(&state.config)))
}

// ============================================================================
// Helper Functions
// ============================================================================

fn refresh_cookie_headers(config: &AuthConfig, refresh_token: &str) -> HeaderMap {
    cookie_headers(config.refresh_cookie().set_header(refresh_token))
}

fn delete_cookie_headers(config: &AuthConfig) -> HeaderMap {
    cookie_headers(config.refresh_cookie().delete_header())
}

fn cookie_headers(value: Option<HeaderValue>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match value {
        Some(value) => {
            headers.insert(header::SET_COOKIE, value);
        }
        None => tracing::warn!("Refresh cookie is not a valid header value; omitting"),
    }
    headers
}
