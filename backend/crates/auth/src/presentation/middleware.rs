//! Auth Middleware
//!
//! Middleware for requiring an access token on protected routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use platform::client::{extract_client_ip, extract_token};

use crate::application::CurrentUserUseCase;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// The signed-in user, stored in request extensions by
/// [`require_access_token`]
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid access token
///
/// Reads `Authorization: Bearer` first, then the access token cookie.
pub async fn require_access_token<R, V>(
    State(state): State<AuthAppState<R, V>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    R: UserRepository + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    let headers = req.headers();

    let client_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    let client_ip = extract_client_ip(headers, client_ip);

    let Some(token) = extract_token(headers, &state.config.access_cookie_name) else {
        return Err(AuthError::MissingToken);
    };

    let use_case = CurrentUserUseCase::new(state.repo.clone(), state.tokens.clone());

    // Logged at warn by `AuthError::into_response`
    let user = use_case.execute(&token).await.inspect_err(|e| {
        tracing::debug!(client_ip = ?client_ip, error = %e, "Access token not accepted");
    })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}
