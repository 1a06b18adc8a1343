//! Participant identities
//!
//! A principal is an opaque identifier handed to the ledger by the caller.
//! The ledger never interprets it beyond a shape check; signature
//! verification belongs to whatever transport delivered the call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Longest accepted principal, including an optional `.contract-name` suffix
pub const MAX_PRINCIPAL_LEN: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

/// Rejected principal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPrincipal {
    pub value: String,
    pub reason: &'static str,
}

impl fmt::Display for InvalidPrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid principal '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for InvalidPrincipal {}

impl Principal {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidPrincipal> {
        let value = value.into();

        if value.is_empty() {
            return Err(InvalidPrincipal { value, reason: "empty" });
        }
        if value.len() > MAX_PRINCIPAL_LEN {
            return Err(InvalidPrincipal { value, reason: "too long" });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        {
            return Err(InvalidPrincipal {
                value,
                reason: "only ASCII letters, digits, '.', '-' and '_' are allowed",
            });
        }
        if value.starts_with('.') || value.ends_with('.') {
            return Err(InvalidPrincipal { value, reason: "misplaced '.'" });
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Principal {
    type Error = InvalidPrincipal;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

impl std::str::FromStr for Principal {
    type Err = InvalidPrincipal;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Principal {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
