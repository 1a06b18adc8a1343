//! Ledger rejection codes
//!
//! Every rejection is terminal for the call that caused it and leaves the
//! ledger untouched. Codes are the uint values surfaced in `(err u<code>)`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LedgerError {
    /// Caller is not the platform owner
    OwnerOnly,

    /// Identity has not registered yet
    NotRegistered,

    /// Identity registered before
    AlreadyRegistered,

    /// Contribution below the minimum, or an amount the ledger cannot hold
    InvalidAmount,

    /// Stake below the minimum
    InsufficientStake,
}

impl LedgerError {
    pub const ALL: [LedgerError; 5] = [
        LedgerError::OwnerOnly,
        LedgerError::NotRegistered,
        LedgerError::AlreadyRegistered,
        LedgerError::InvalidAmount,
        LedgerError::InsufficientStake,
    ];

    /// Numeric code carried by the error response
    pub fn code(&self) -> u64 {
        match self {
            LedgerError::OwnerOnly => 100,
            LedgerError::NotRegistered => 101,
            LedgerError::AlreadyRegistered => 102,
            LedgerError::InvalidAmount => 103,
            LedgerError::InsufficientStake => 105,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            LedgerError::OwnerOnly => "Only the platform owner may perform this action",
            LedgerError::NotRegistered => "Participant is not registered",
            LedgerError::AlreadyRegistered => "Participant is already registered",
            LedgerError::InvalidAmount => "Amount is below the minimum contribution",
            LedgerError::InsufficientStake => "Stake is below the minimum stake",
        }
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (u{})", self.description(), self.code())
    }
}

impl std::error::Error for LedgerError {}
