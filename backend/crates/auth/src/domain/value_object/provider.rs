//! Identity Provider name
//!
//! Lower-case ASCII slug such as `google`.

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

const PROVIDER_MAX_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Provider(String);

impl Provider {
    pub fn new(name: impl AsRef<str>) -> AuthResult<Self> {
        let name = name.as_ref().trim().to_ascii_lowercase();

        if name.is_empty() || name.len() > PROVIDER_MAX_LENGTH {
            return Err(AuthError::InvalidInput("Invalid provider".to_string()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
        {
            return Err(AuthError::InvalidInput("Invalid provider".to_string()));
        }

        Ok(Self(name))
    }

    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
