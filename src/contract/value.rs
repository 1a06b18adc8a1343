//! Contract values and their literal form
//!
//! Results render the way a contract runtime prints them: `true`, `u150`,
//! `'ST1...`, `(ok true)`, `(err u102)`,
//! `(tuple (min-stake u1000) (reward-rate u10))`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ledger::{LedgerError, Principal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ClarityValue {
    Bool(bool),
    UInt(u128),
    Principal(Principal),
    Tuple(Vec<(String, ClarityValue)>),
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
}

/// Rejected argument literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    Empty,
    Unsupported(String),
    InvalidUInt(String),
    InvalidPrincipal(String),
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralError::Empty => write!(f, "empty literal"),
            LiteralError::Unsupported(s) => write!(f, "unsupported literal '{}'", s),
            LiteralError::InvalidUInt(s) => write!(f, "invalid uint literal '{}'", s),
            LiteralError::InvalidPrincipal(reason) => write!(f, "{}", reason),
        }
    }
}

impl std::error::Error for LiteralError {}

impl ClarityValue {
    pub fn ok(value: ClarityValue) -> Self {
        ClarityValue::ResponseOk(Box::new(value))
    }

    pub fn err(value: ClarityValue) -> Self {
        ClarityValue::ResponseErr(Box::new(value))
    }

    pub fn uint(value: u64) -> Self {
        ClarityValue::UInt(value as u128)
    }

    /// `(ok <value>)` or `(err u<code>)`
    pub fn response(result: Result<ClarityValue, LedgerError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => Self::err(Self::uint(e.code())),
        }
    }

    /// Parse an argument literal: `true`, `false`, `u<digits>` or `'<principal>`
    pub fn parse_literal(literal: &str) -> Result<Self, LiteralError> {
        let literal = literal.trim();

        match literal {
            "" => Err(LiteralError::Empty),
            "true" => Ok(ClarityValue::Bool(true)),
            "false" => Ok(ClarityValue::Bool(false)),
            _ => {
                if let Some(digits) = literal.strip_prefix('u') {
                    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                        return Err(LiteralError::InvalidUInt(literal.to_string()));
                    }
                    digits
                        .parse::<u128>()
                        .map(ClarityValue::UInt)
                        .map_err(|_| LiteralError::InvalidUInt(literal.to_string()))
                } else if let Some(principal) = literal.strip_prefix('\'') {
                    Principal::new(principal)
                        .map(ClarityValue::Principal)
                        .map_err(|e| LiteralError::InvalidPrincipal(e.to_string()))
                } else {
                    Err(LiteralError::Unsupported(literal.to_string()))
                }
            }
        }
    }

    pub fn is_err_response(&self) -> bool {
        matches!(self, ClarityValue::ResponseErr(_))
    }

    /// Error code of an `(err u<code>)` response
    pub fn error_code(&self) -> Option<u128> {
        match self {
            ClarityValue::ResponseErr(inner) => match inner.as_ref() {
                ClarityValue::UInt(code) => Some(*code),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for ClarityValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClarityValue::Bool(b) => write!(f, "{}", b),
            ClarityValue::UInt(n) => write!(f, "u{}", n),
            ClarityValue::Principal(p) => write!(f, "'{}", p),
            ClarityValue::Tuple(fields) => {
                write!(f, "(tuple")?;
                for (name, value) in fields {
                    write!(f, " ({} {})", name, value)?;
                }
                write!(f, ")")
            }
            ClarityValue::ResponseOk(inner) => write!(f, "(ok {})", inner),
            ClarityValue::ResponseErr(inner) => write!(f, "(err {})", inner),
        }
    }
}
