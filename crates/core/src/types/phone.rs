//! Phone number type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Phone`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PhoneError {
    /// The input string is empty.
    #[error("phone number cannot be empty")]
    Empty,
    /// The input is not exactly 11 digits.
    #[error("phone number must be exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The input contains a non-digit character.
    #[error("phone number must contain only digits")]
    NonDigit,
    /// The input does not start with a valid Egyptian mobile prefix.
    #[error("phone number must start with 010, 011, 012, or 015")]
    InvalidPrefix,
}

/// An Egyptian mobile phone number.
///
/// The remote commerce API only accepts Egyptian mobile numbers for customer
/// accounts and shipping addresses: 11 digits, starting with `010`, `011`,
/// `012`, or `015`.
///
/// ## Examples
///
/// ```
/// use greenbasket_core::Phone;
///
/// assert!(Phone::parse("01012345678").is_ok());
/// assert!(Phone::parse("01512345678").is_ok());
///
/// assert!(Phone::parse("0131234567").is_err());  // wrong length
/// assert!(Phone::parse("01312345678").is_err()); // 013 is not a mobile prefix
/// assert!(Phone::parse("02123456789").is_err()); // landline prefix
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Required number of digits.
    pub const LENGTH: usize = 11;

    /// Parse a `Phone` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty
    /// - Is not exactly 11 characters
    /// - Contains a non-digit character
    /// - Does not start with `010`, `011`, `012`, or `015`
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        if s.is_empty() {
            return Err(PhoneError::Empty);
        }

        if s.len() != Self::LENGTH {
            return Err(PhoneError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PhoneError::NonDigit);
        }

        let mut bytes = s.bytes();
        let prefix_ok = bytes.next() == Some(b'0')
            && bytes.next() == Some(b'1')
            && matches!(bytes.next(), Some(b'0' | b'1' | b'2' | b'5'));
        if !prefix_ok {
            return Err(PhoneError::InvalidPrefix);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Phone` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Phone {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_prefixes() {
        assert!(Phone::parse("01012345678").is_ok());
        assert!(Phone::parse("01112345678").is_ok());
        assert!(Phone::parse("01212345678").is_ok());
        assert!(Phone::parse("01512345678").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Phone::parse(""), Err(PhoneError::Empty)));
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            Phone::parse("0101234567"),
            Err(PhoneError::WrongLength { expected: 11 })
        ));
        assert!(matches!(
            Phone::parse("010123456789"),
            Err(PhoneError::WrongLength { expected: 11 })
        ));
    }

    #[test]
    fn test_parse_non_digit() {
        assert!(matches!(
            Phone::parse("0101234567a"),
            Err(PhoneError::NonDigit)
        ));
        assert!(matches!(
            Phone::parse("+2010123456"),
            Err(PhoneError::NonDigit)
        ));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert!(matches!(
            Phone::parse("01312345678"),
            Err(PhoneError::InvalidPrefix)
        ));
        assert!(matches!(
            Phone::parse("02123456789"),
            Err(PhoneError::InvalidPrefix)
        ));
    }

    #[test]
    fn test_display() {
        let phone = Phone::parse("01012345678").unwrap();
        assert_eq!(format!("{phone}"), "01012345678");
    }

    #[test]
    fn test_serde_roundtrip() {
        let phone = Phone::parse("01212345678").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"01212345678\"");

        let parsed: Phone = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, phone);
    }
}
