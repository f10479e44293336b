//! Identity value objects: `Email` and `Username`.
//!
//! Both are validated on construction and normalized to lowercase, so any
//! instance held by an aggregate is known-good. Deserialization goes through
//! the same validation (`try_from`), closing the serde back door.

use serde::{Deserialize, Serialize};

use devplan_core::{DomainError, DomainResult, ValueObject};

/// Validated email address, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub const MAX_LEN: usize = 254;

    pub fn new(raw: impl AsRef<str>) -> DomainResult<Self> {
        let value = raw.as_ref().trim().to_lowercase();

        if value.is_empty() {
            return Err(DomainError::validation("email cannot be empty"));
        }
        if value.len() > Self::MAX_LEN {
            return Err(DomainError::validation("email too long"));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::validation("email cannot contain whitespace"));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::validation("email must contain '@'"));
        };
        if local.is_empty() || domain.is_empty() {
            return Err(DomainError::validation(
                "email must have a local part and a domain",
            ));
        }
        if domain.contains('@') {
            return Err(DomainError::validation("email must contain exactly one '@'"));
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(DomainError::validation("email domain is malformed"));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated username: 3..=32 chars of `[a-z0-9_-]`, starting alphanumeric.
///
/// Input is lowercased, so usernames are case-insensitive identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    pub const MIN_LEN: usize = 3;
    pub const MAX_LEN: usize = 32;

    pub fn new(raw: impl AsRef<str>) -> DomainResult<Self> {
        let value = raw.as_ref().trim().to_lowercase();

        if value.len() < Self::MIN_LEN {
            return Err(DomainError::validation("username too short (min 3 chars)"));
        }
        if value.len() > Self::MAX_LEN {
            return Err(DomainError::validation("username too long (max 32 chars)"));
        }

        let mut chars = value.chars();
        // Length check above guarantees at least one char.
        let first = chars.next().unwrap_or('-');
        if !first.is_ascii_alphanumeric() {
            return Err(DomainError::validation(
                "username must start with a letter or digit",
            ));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(DomainError::validation(
                "username may only contain letters, digits, '_' and '-'",
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Username {}

impl TryFrom<String> for Username {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl core::fmt::Display for Username {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_email_is_normalized() {
        let email = Email::new("  Alice@Example.COM ").unwrap();
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn equal_by_value() {
        assert_eq!(
            Email::new("a@example.com").unwrap(),
            Email::new("A@EXAMPLE.COM").unwrap()
        );
    }

    #[test]
    fn rejects_malformed_emails() {
        for bad in [
            "",
            "no-at-sign",
            "@example.com",
            "alice@",
            "alice@@example.com",
            "alice@nodot",
            "alice@.com",
            "alice@example.com.",
            "alice smith@example.com",
        ] {
            assert!(Email::new(bad).is_err(), "accepted: {bad:?}");
        }
    }

    #[test]
    fn valid_usernames() {
        assert_eq!(Username::new("Alice_99").unwrap().as_str(), "alice_99");
        assert!(Username::new("a-b").is_ok());
        assert!(Username::new("9lives").is_ok());
    }

    #[test]
    fn rejects_malformed_usernames() {
        for bad in ["", "ab", "-leading", "_leading", "has space", "has.dot"] {
            assert!(Username::new(bad).is_err(), "accepted: {bad:?}");
        }
        assert!(Username::new("x".repeat(33)).is_err());
    }

    #[test]
    fn deserialization_validates() {
        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
        assert!(serde_json::from_str::<Username>("\"ok_name\"").is_ok());
    }
}
