//! Request header helpers
//!
//! Credential and client identification from HTTP headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

use crate::cookie::extract_cookie;

/// Extract the token from `Authorization: Bearer <token>`
///
/// The scheme is matched case-insensitively (RFC 6750). Anything else,
/// including an empty token, yields `None`.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}

/// Bearer token first, then the named cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    extract_bearer_token(headers).or_else(|| extract_cookie(headers, cookie_name))
}

/// Extract client IP address from headers
///
/// Checks X-Forwarded-For header first (for reverse proxy setups),
/// then falls back to direct connection IP.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_auth(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(
            extract_bearer_token(&with_auth("Bearer abc.def.ghi")),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(
            extract_bearer_token(&with_auth("bearer abc")),
            Some("abc".to_string())
        );
    }

    #[test]
    fn test_extract_bearer_token_rejects_other_schemes() {
        assert_eq!(extract_bearer_token(&with_auth("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer ")), None);
        assert_eq!(extract_bearer_token(&with_auth("Bearer")), None);
        assert_eq!(extract_bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_extract_token_prefers_header() {
        let mut headers = with_auth("Bearer from-header");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("refresh_token=from-cookie"),
        );
        assert_eq!(
            extract_token(&headers, "refresh_token"),
            Some("from-header".to_string())
        );

        headers.remove(header::AUTHORIZATION);
        assert_eq!(
            extract_token(&headers, "refresh_token"),
            Some("from-cookie".to_string())
        );
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let headers = HeaderMap::new();
        let direct: IpAddr = "127.0.0.1".parse().unwrap();

        let ip = extract_client_ip(&headers, Some(direct));
        assert_eq!(ip, Some(direct));
    }
}
