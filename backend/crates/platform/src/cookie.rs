//! Cookie Management Infrastructure
//!
//! `Set-Cookie` rendering and `Cookie` header parsing for token cookies.

use std::str::FromStr;

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Strict,
    #[default]
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite policy: {other}")),
        }
    }
}

/// Attributes for one named cookie
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age_secs: Option<i64>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "refresh_token".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age_secs: None,
        }
    }
}

impl CookieConfig {
    /// Build Set-Cookie header value
    pub fn build_set_cookie(&self, value: &str) -> String {
        self.render(value, self.max_age_secs)
    }

    /// Build Set-Cookie header value that makes the browser drop the cookie.
    ///
    /// Path and SameSite must match the original or the browser keeps it.
    pub fn build_delete_cookie(&self) -> String {
        self.render("", Some(0))
    }

    fn render(&self, value: &str, max_age: Option<i64>) -> String {
        let mut cookie = format!("{}={}", self.name, value);

        if self.http_only {
            cookie.push_str("; HttpOnly");
        }
        // Browsers drop SameSite=None cookies without Secure
        if self.secure || self.same_site == SameSite::None {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.same_site.as_str()));
        cookie.push_str(&format!("; Path={}", self.path));

        if let Some(max_age) = max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age));
        }

        cookie
    }

    /// `Set-Cookie` header value carrying `value`
    pub fn set_header(&self, value: &str) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_set_cookie(value)).ok()
    }

    /// `Set-Cookie` header value deleting this cookie
    pub fn delete_header(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.build_delete_cookie()).ok()
    }
}

/// Extract a cookie value from headers. Empty values count as absent.
pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name && !value.is_empty()).then(|| value.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refresh_cookie() -> CookieConfig {
        CookieConfig {
            name: "refresh_token".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            path: "/api/auth".to_string(),
            max_age_secs: Some(604_800),
        }
    }

    #[test]
    fn test_cookie_config_build() {
        let cookie = refresh_cookie().build_set_cookie("value123");
        assert!(cookie.starts_with("refresh_token=value123"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Path=/api/auth"));
        assert!(cookie.contains("Max-Age=604800"));
    }

    #[test]
    fn test_delete_cookie_keeps_scope() {
        let cookie = refresh_cookie().build_delete_cookie();
        assert!(cookie.starts_with("refresh_token=;"));
        assert!(cookie.contains("Path=/api/auth"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_insecure_cookie_for_local_development() {
        let config = CookieConfig {
            secure: false,
            ..refresh_cookie()
        };
        assert!(!config.build_set_cookie("v").contains("Secure"));

        let config = CookieConfig {
            secure: false,
            same_site: SameSite::None,
            ..refresh_cookie()
        };
        assert!(config.build_set_cookie("v").contains("Secure"));
    }

    #[test]
    fn test_same_site_from_str() {
        assert_eq!("strict".parse::<SameSite>().unwrap(), SameSite::Strict);
        assert_eq!("Lax".parse::<SameSite>().unwrap(), SameSite::Lax);
        assert_eq!("NONE".parse::<SameSite>().unwrap(), SameSite::None);
        assert!("sometimes".parse::<SameSite>().is_err());
    }

    #[test]
    fn test_extract_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("foo=bar; refresh_token=abc.def.ghi; empty="),
        );

        assert_eq!(
            extract_cookie(&headers, "refresh_token"),
            Some("abc.def.ghi".to_string())
        );
        assert_eq!(extract_cookie(&headers, "foo"), Some("bar".to_string()));
        assert_eq!(extract_cookie(&headers, "empty"), None);
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_extract_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(extract_cookie(&headers, "b"), Some("2".to_string()));
    }
}
