//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::token::TokenError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed request data (bad email, weak password, claim mismatch)
    #[error("{0}")]
    InvalidInput(String),

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Some other uniqueness constraint was hit
    #[error("Resource already exists")]
    Duplicate,

    /// Wrong email/password. Same error whichever part was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Bad, expired or wrong-kind token
    #[error("Invalid or expired token")]
    InvalidToken,

    /// No token presented
    #[error("Authentication required")]
    MissingToken,

    /// Account is disabled
    #[error("Account is disabled")]
    AccountDisabled,

    /// Sign-in requires a verified email
    #[error("Email address is not verified")]
    EmailNotVerified,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Identity provider could not be reached or answered garbage
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput(_) => ErrorKind::BadRequest,
            AuthError::EmailTaken | AuthError::Duplicate => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::InvalidToken | AuthError::MissingToken => {
                ErrorKind::Unauthorized
            }
            AuthError::AccountDisabled | AuthError::EmailNotVerified => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Database(_) | AuthError::ProviderUnavailable(_) => {
                ErrorKind::ServiceUnavailable
            }
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side errors get a generic message; details stay in the log.
    pub fn to_app_error(&self) -> AppError {
        match self.kind() {
            ErrorKind::ServiceUnavailable => {
                AppError::service_unavailable("Service temporarily unavailable")
                    .with_action("Please try again later")
            }
            ErrorKind::InternalServerError => AppError::internal("Internal server error"),
            kind => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::ProviderUnavailable(msg) => {
                tracing::error!(message = %msg, "Identity provider unavailable");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid sign-in attempt");
            }
            AuthError::InvalidToken => {
                tracing::warn!("Rejected invalid token");
            }
            AuthError::AccountDisabled => {
                tracing::warn!("Access attempt on disabled account");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<PasswordPolicyError> for AuthError {
    fn from(err: PasswordPolicyError) -> Self {
        AuthError::InvalidInput(err.to_string())
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(reason = %rejection.body_text(), "Request body rejected");
        let message = match rejection {
            JsonRejection::JsonDataError(_) => "Request body is missing fields or has invalid values",
            JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON",
            JsonRejection::MissingJsonContentType(_) => "Expected `Content-Type: application/json`",
            _ => "Request body could not be read",
        };
        AuthError::InvalidInput(message.to_string())
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::InvalidToken => AuthError::InvalidToken,
            other => AuthError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AuthError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::Duplicate.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::InvalidCredentials.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::MissingToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AuthError::AccountDisabled.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::EmailNotVerified.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::ProviderUnavailable("down".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Database(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AuthError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let app = AuthError::Internal("argon2 exploded at 0xdeadbeef".into()).to_app_error();
        assert!(!app.message().contains("deadbeef"));

        let app = AuthError::ProviderUnavailable("jwks timeout".into()).to_app_error();
        assert!(!app.message().contains("jwks"));
    }

    #[test]
    fn test_unauthenticated_response_has_challenge() {
        let response = AuthError::InvalidToken.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[test]
    fn test_token_error_conversion() {
        assert!(matches!(
            AuthError::from(TokenError::InvalidToken),
            AuthError::InvalidToken
        ));
        assert!(matches!(
            AuthError::from(TokenError::Signing("boom".into())),
            AuthError::Internal(_)
        ));
    }

    #[test]
    fn test_policy_error_is_invalid_input() {
        let err = AuthError::from(PasswordPolicyError::CommonPattern);
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }
}
