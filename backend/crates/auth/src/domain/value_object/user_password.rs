//! User Password Value Object
//!
//! Domain value object for user passwords with NIST SP 800-63B compliance.
//! Delegates to `platform::password` for cryptographic operations.
//!
//! ## Usage
//! ```rust
//! use auth::domain::value_object::user_password::{RawPassword, UserPassword};
//! use platform::password::{HashCost, PasswordHasher};
//!
//! let hasher = PasswordHasher::new(HashCost::minimal(), None).unwrap();
//!
//! // Sign-up input goes through the policy
//! let raw = RawPassword::new("MySecurePass123!".to_string()).unwrap();
//! let hashed = UserPassword::hash(&raw, &hasher).unwrap();
//!
//! assert!(hashed.verify(&raw, &hasher));
//! ```

use platform::password::{
    ClearTextPassword, HashedPassword, PasswordHasher, PasswordPolicyError,
};
use std::fmt;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input
///
/// Memory is zeroized when dropped.
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// Validate a new password (sign-up, password change)
    pub fn new(raw: String) -> AuthResult<Self> {
        let clear_text = ClearTextPassword::new(raw).map_err(|e| {
            let message = match e {
                PasswordPolicyError::TooShort { min, .. } => {
                    format!("Password must be at least {} characters", min)
                }
                PasswordPolicyError::TooLong { max, .. } => {
                    format!("Password must be at most {} characters", max)
                }
                PasswordPolicyError::EmptyOrWhitespace => "Password cannot be empty".to_string(),
                PasswordPolicyError::InvalidCharacter => {
                    "Password contains invalid characters".to_string()
                }
                PasswordPolicyError::CommonPattern => {
                    "Password is too common or follows a predictable pattern".to_string()
                }
            };
            AuthError::InvalidInput(message)
        })?;

        Ok(Self(clear_text))
    }

    /// Wrap a sign-in attempt. No policy: it is only ever compared.
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::for_verification(raw))
    }

    pub(crate) fn inner(&self) -> &ClearTextPassword {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Hashed user password (Argon2id PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn hash(raw: &RawPassword, hasher: &PasswordHasher) -> AuthResult<Self> {
        Ok(Self(hasher.hash(raw.inner())?))
    }

    /// Stored digest, taken as-is. One that does not parse never verifies.
    pub fn from_db(stored: impl Into<String>) -> Self {
        Self(HashedPassword::from_stored(stored))
    }

    /// Get PHC string for database storage
    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    /// Constant-time verification
    pub fn verify(&self, raw: &RawPassword, hasher: &PasswordHasher) -> bool {
        hasher.verify(raw.inner(), &self.0)
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use platform::password::HashCost;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(HashCost::minimal(), None).unwrap()
    }

    #[test]
    fn test_raw_password_validation() {
        assert!(RawPassword::new("Secret123".to_string()).is_ok());
        assert!(RawPassword::new("short".to_string()).is_err());
        assert!(RawPassword::new("password123".to_string()).is_err());
        assert!(RawPassword::new("".to_string()).is_err());
    }

    #[test]
    fn test_policy_message_is_user_facing() {
        let err = RawPassword::new("short".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Password must be at least 8 characters");
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::hash(&raw, &hasher).unwrap();

        assert!(hashed.verify(&RawPassword::for_verification("TestPassword123!".into()), &hasher));
        assert!(!hashed.verify(&RawPassword::for_verification("WrongPassword123!".into()), &hasher));
    }

    #[test]
    fn test_stored_digest_roundtrip() {
        let hasher = hasher();
        let raw = RawPassword::new("TestPassword123!".to_string()).unwrap();
        let hashed = UserPassword::hash(&raw, &hasher).unwrap();

        let restored = UserPassword::from_db(hashed.as_phc_string());
        assert!(restored.verify(&raw, &hasher));
    }

    #[test]
    fn test_foreign_digest_loads_but_never_verifies() {
        let hasher = hasher();
        let bcrypt = UserPassword::from_db(
            "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW",
        );
        let garbage = UserPassword::from_db("garbage");

        let raw = RawPassword::for_verification("TestPassword123!".into());
        assert!(!bcrypt.verify(&raw, &hasher));
        assert!(!garbage.verify(&raw, &hasher));
    }

    #[test]
    fn test_debug_redaction() {
        let raw = RawPassword::new("SecretPassword123!".to_string()).unwrap();
        let debug = format!("{:?}", raw);
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("Secret"));

        let hashed = UserPassword::hash(&raw, &hasher()).unwrap();
        assert!(!format!("{:?}", hashed).contains("argon2"));
    }
}
