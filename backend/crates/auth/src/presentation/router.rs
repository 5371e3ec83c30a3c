//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::application::config::AuthConfig;
use crate::domain::identity::IdentityVerifier;
use crate::domain::repository::{LinkedAccountRepository, UserRepository};
use crate::error::AuthResult;
use crate::infra::{google::GoogleIdTokenVerifier, postgres::PgAuthRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::require_access_token;

/// Create the Auth router with PostgreSQL repository and Google sign-in
pub fn auth_router(
    repo: PgAuthRepository,
    verifier: GoogleIdTokenVerifier,
    config: AuthConfig,
) -> AuthResult<Router> {
    auth_router_generic(repo, verifier, config)
}

/// Create a generic Auth router for any repository and verifier
///
/// Fails if the token secret or password cost in `config` is unusable.
pub fn auth_router_generic<R, V>(repo: R, verifier: V, config: AuthConfig) -> AuthResult<Router>
where
    R: UserRepository + LinkedAccountRepository + Send + Sync + 'static,
    V: IdentityVerifier + Send + Sync + 'static,
{
    let state = AuthAppState::new(repo, verifier, config)?;

    let protected = Router::new()
        .route(
            "/me",
            get(handlers::me)
                .patch(handlers::update_me::<R, V>)
                .delete(handlers::delete_me::<R, V>),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_access_token::<R, V>,
        ));

    let router = Router::new()
        .route("/signup", post(handlers::sign_up::<R, V>))
        .route("/signin", post(handlers::sign_in::<R, V>))
        .route("/oauth", post(handlers::oauth_sign_in::<R, V>))
        .route("/refresh", post(handlers::refresh::<R, V>))
        .route("/signout", post(handlers::sign_out::<R, V>))
        .merge(protected)
        .with_state(state);

    Ok(router)
}
