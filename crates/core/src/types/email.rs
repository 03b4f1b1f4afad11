//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    /// Not of the form `local@domain` with exactly one `@` and both sides non-empty.
    #[error("email must look like local@domain")]
    Malformed,
}

/// An email address as accepted by the identity provider.
///
/// The provider only checks the overall shape: one `@` separating a
/// non-empty local part from a non-empty domain. Anything else (spaces,
/// unicode, missing TLD) is passed through untouched.
///
/// ## Examples
///
/// ```
/// use shopfront_core::Email;
///
/// assert!(Email::parse("alice@ecommerce.com").is_ok());
/// assert!(Email::parse("a@b").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("a@b@ecommerce.com").is_err());
/// assert!(Email::parse("@ecommerce.com").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 254 characters,
    /// or not shaped `local@domain`.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        match s.split_once('@') {
            Some((local, domain))
                if !local.is_empty() && !domain.is_empty() && !domain.contains('@') =>
            {
                Ok(Self(s.to_owned()))
            }
            _ => Err(EmailError::Malformed),
        }
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("alice@ecommerce.com").is_ok());
        assert!(Email::parse("alice.smith@ecommerce.com").is_ok());
        assert!(Email::parse("a@b").is_ok());
        // The provider does not reject spaces, so neither do we
        assert!(Email::parse("john doe@ecommerce.com").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@ecommerce.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_malformed() {
        for input in ["no-at-symbol", "bob@home@ecommerce.com", "@ecommerce.com", "bob@", "@"] {
            assert_eq!(Email::parse(input), Err(EmailError::Malformed), "{input}");
        }
    }

    #[test]
    fn test_display() {
        let email = Email::parse("bob@ecommerce.com").unwrap();
        assert_eq!(email.to_string(), "bob@ecommerce.com");
    }

    #[test]
    fn test_serde_is_transparent() {
        let email = Email::parse("bob@ecommerce.com").unwrap();
        assert_eq!(
            serde_json::to_string(&email).unwrap(),
            "\"bob@ecommerce.com\""
        );
    }
}
