//! Error conversions - HTTP rendering of [`AppError`]
//!
//! Every error leaves the service as an RFC 7807 problem document.

// ============================================================================
// Axum conversions (feature-gated)
// ============================================================================

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl AppError {
    /// RFC 7807 Problem Details body
    pub fn problem_body(&self) -> serde_json::Value {
        serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "code": self.kind().code(),
            "detail": self.message(),
            "action": self.action(),
        })
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use super::kind::ErrorKind;
        use axum::Json;
        use axum::http::{HeaderValue, StatusCode, header};

        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = (status, Json(self.problem_body())).into_response();

        // RFC 6750 §3: 401 responses carry a bearer challenge
        if self.kind() == ErrorKind::Unauthorized {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

#[cfg(all(test, feature = "axum"))]
mod tests {
    use super::*;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    #[test]
    fn test_unauthorized_carries_bearer_challenge() {
        let response = AppError::unauthorized("Invalid or expired token").into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
    }

    #[test]
    fn test_other_errors_have_no_challenge() {
        let response = AppError::conflict("Email already registered").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(response.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn test_problem_body_fields() {
        let body = AppError::bad_request("Invalid email format")
            .with_action("Enter a valid email")
            .problem_body();
        assert_eq!(body["status"], 400);
        assert_eq!(body["title"], "Bad Request");
        assert_eq!(body["code"], "invalid_input");
        assert_eq!(body["detail"], "Invalid email format");
        assert_eq!(body["action"], "Enter a valid email");
    }
}
