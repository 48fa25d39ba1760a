//! Join request validation.
//!
//! A join is checked locally before anything touches the network: a bad
//! name never opens a connection.

use roomlink_protocol::{DEFAULT_AVATAR_ID, Envelope, avatar_url, default_avatar_url};
use tracing::warn;

use crate::error::ValidationError;

/// Trims `name` and checks it against the length limit.
///
/// Length is counted in characters, so "日本語の名前です" (8 characters)
/// passes a limit of 8 even though it is 24 bytes long.
///
/// ```rust
/// use roomlink_session::{ValidationError, validate_name};
///
/// assert_eq!(validate_name("  Alice ", 8), Ok("Alice".to_string()));
/// assert_eq!(validate_name("   ", 8), Err(ValidationError::EmptyName));
/// ```
pub fn validate_name(name: &str, max_chars: usize) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    let len = trimmed.chars().count();
    if len > max_chars {
        return Err(ValidationError::NameTooLong { len, max: max_chars });
    }

    Ok(trimmed.to_owned())
}

/// Validated join credentials, kept so the session can re-join after a
/// reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    /// The trimmed display name.
    pub name: String,
    /// The resolved avatar URL.
    pub avatar: String,
}

impl JoinRequest {
    /// Validates `name` and resolves `avatar_id` to its URL.
    ///
    /// An unknown avatar id is not an error; the default avatar is used.
    pub fn new(
        name: &str,
        avatar_id: &str,
        max_name_chars: usize,
    ) -> Result<Self, ValidationError> {
        let name = validate_name(name, max_name_chars)?;
        let avatar = match avatar_url(avatar_id) {
            Some(url) => url,
            None => {
                warn!(
                    avatar_id,
                    fallback = DEFAULT_AVATAR_ID,
                    "unknown avatar id, using default"
                );
                default_avatar_url()
            }
        };

        Ok(Self {
            name,
            avatar: avatar.to_owned(),
        })
    }

    /// The `join` envelope announcing these credentials.
    pub fn to_envelope(&self) -> Envelope {
        Envelope::Join {
            name: self.name.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_validate_name_trims() {
        assert_eq!(validate_name("\tBob\n", 8), Ok("Bob".to_string()));
    }

    #[test]
    fn test_validate_name_rejects_blank() {
        assert_eq!(validate_name("", 8), Err(ValidationError::EmptyName));
        assert_eq!(validate_name(" \t ", 8), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_validate_name_rejects_nine_chars() {
        assert_eq!(
            validate_name("Alexandra", 8),
            Err(ValidationError::NameTooLong { len: 9, max: 8 })
        );
    }

    #[test]
    fn test_validate_name_counts_chars_not_bytes() {
        assert_eq!(
            validate_name("日本語の名前です", 8),
            Ok("日本語の名前です".to_string())
        );
    }

    #[test]
    fn test_join_request_resolves_avatar() {
        let request = JoinRequest::new("Alice", "3", 8).unwrap();
        assert_eq!(request.avatar, avatar_url("3").unwrap());
        assert_eq!(
            request.to_envelope(),
            Envelope::Join {
                name: "Alice".into(),
                avatar: avatar_url("3").unwrap().into(),
            }
        );
    }

    #[test]
    fn test_join_request_unknown_avatar_falls_back() {
        let request = JoinRequest::new("Alice", "42", 8).unwrap();
        assert_eq!(request.avatar, default_avatar_url());
    }

    proptest! {
        #[test]
        fn prop_accepted_names_are_trimmed_and_short(name in "\\PC{0,12}") {
            match validate_name(&name, 8) {
                Ok(accepted) => {
                    prop_assert_eq!(accepted.as_str(), name.trim());
                    prop_assert!(!accepted.is_empty());
                    prop_assert!(accepted.chars().count() <= 8);
                }
                Err(ValidationError::EmptyName) => prop_assert!(name.trim().is_empty()),
                Err(ValidationError::NameTooLong { len, max }) => {
                    prop_assert_eq!(len, name.trim().chars().count());
                    prop_assert!(len > max);
                }
            }
        }
    }
}
