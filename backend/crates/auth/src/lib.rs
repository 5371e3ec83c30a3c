//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository and verifier traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database and identity provider implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - User signup/signin with email + password
//! - Sign-in and account linking with a Google id-token
//! - Stateless access/refresh JWTs; refresh token also set as an HttpOnly cookie
//! - Current user profile read, update and deletion
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional application pepper
//! - Unknown email and wrong password are indistinguishable, in answer and in timing
//! - Access and refresh tokens are told apart by their `type` claim
//! - Provider id-tokens verified against the provider's JWKS (RS256)

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{GoogleIdTokenVerifier, MemoryAuthRepository, PgAuthRepository};
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::MemoryAuthRepository as MemoryAuthStore;
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
