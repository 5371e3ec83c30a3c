//! Profile Value Objects
//!
//! Display name and profile image URL. Both are optional on a user.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

const DISPLAY_NAME_MAX_LENGTH: usize = 100;
const IMAGE_URL_MAX_LENGTH: usize = 2048;

/// Display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trimmed; blank input means "no name".
    pub fn parse(raw: impl AsRef<str>) -> AuthResult<Option<Self>> {
        let name = raw.as_ref().trim();
        if name.is_empty() {
            return Ok(None);
        }
        if name.chars().count() > DISPLAY_NAME_MAX_LENGTH {
            return Err(AuthError::InvalidInput(format!(
                "Name must be at most {} characters",
                DISPLAY_NAME_MAX_LENGTH
            )));
        }
        if name.chars().any(char::is_control) {
            return Err(AuthError::InvalidInput(
                "Name contains invalid characters".to_string(),
            ));
        }
        Ok(Some(Self(name.to_string())))
    }

    /// Provider-supplied names are cut down to size instead of rejected
    pub fn lenient(raw: impl AsRef<str>) -> Option<Self> {
        let cleaned: String = raw
            .as_ref()
            .chars()
            .filter(|c| !c.is_control())
            .take(DISPLAY_NAME_MAX_LENGTH)
            .collect();
        let cleaned = cleaned.trim();
        (!cleaned.is_empty()).then(|| Self(cleaned.to_string()))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Absolute http(s) URL of a profile image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileImageUrl(String);

impl ProfileImageUrl {
    /// Trimmed; blank input means "no image".
    pub fn parse(raw: impl AsRef<str>) -> AuthResult<Option<Self>> {
        let url = raw.as_ref().trim();
        if url.is_empty() {
            return Ok(None);
        }
        if url.len() > IMAGE_URL_MAX_LENGTH {
            return Err(AuthError::InvalidInput(
                "Profile image URL is too long".to_string(),
            ));
        }
        let lower = url.to_ascii_lowercase();
        let has_host = lower
            .strip_prefix("https://")
            .or_else(|| lower.strip_prefix("http://"))
            .is_some_and(|rest| !rest.is_empty() && !rest.starts_with('/'));
        if !has_host || url.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AuthError::InvalidInput(
                "Profile image URL must be an absolute http(s) URL".to_string(),
            ));
        }
        Ok(Some(Self(url.to_string())))
    }

    pub fn from_db(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(
            DisplayName::parse("  Ada Lovelace ").unwrap().unwrap().as_str(),
            "Ada Lovelace"
        );
        assert!(DisplayName::parse("   ").unwrap().is_none());
        assert!(DisplayName::parse("x".repeat(101)).is_err());
        assert!(DisplayName::parse("bad\u{0000}name").is_err());
    }

    #[test]
    fn test_display_name_lenient() {
        let name = DisplayName::lenient("y".repeat(150)).unwrap();
        assert_eq!(name.as_str().chars().count(), 100);
        assert!(DisplayName::lenient("\u{0007}").is_none());
    }

    #[test]
    fn test_profile_image_url() {
        assert!(ProfileImageUrl::parse("https://lh3.googleusercontent.com/a/pic").unwrap().is_some());
        assert!(ProfileImageUrl::parse("").unwrap().is_none());
        assert!(ProfileImageUrl::parse("javascript:alert(1)").is_err());
        assert!(ProfileImageUrl::parse("https://").is_err());
        assert!(ProfileImageUrl::parse("/relative/pic.png").is_err());
    }
}
