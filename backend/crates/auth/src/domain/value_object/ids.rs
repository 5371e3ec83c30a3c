//! Entity identifiers
//!
//! UUID v4 on the inside, the hyphenated string on the wire.

pub use kernel::id::{LinkedAccountId, UserId};

use crate::error::{AuthError, AuthResult};

/// Parse a user id coming from a trusted token subject.
///
/// A subject that is not a UUID cannot name any user.
pub fn user_id_from_subject(subject: &str) -> AuthResult<UserId> {
    UserId::parse_str(subject).ok_or(AuthError::UserNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_new() {
        let user_id = UserId::new();
        assert_eq!(user_id.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_user_id_from_subject() {
        let user_id = UserId::new();
        assert_eq!(user_id_from_subject(&user_id.to_string()).unwrap(), user_id);
        assert!(matches!(
            user_id_from_subject("42"),
            Err(AuthError::UserNotFound)
        ));
    }
}
