//! Contract call decoding
//!
//! Turns a function name plus argument literals into a typed call. Anything
//! that fails here never reaches the ledger.

use serde::Serialize;
use std::fmt;

use crate::contract::value::{ClarityValue, LiteralError};
use crate::ledger::Principal;

/// Name under which the ledger is addressed by callers
pub const CONTRACT_NAME: &str = "model_trainer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "function", rename_all = "kebab-case")]
pub enum ContractCall {
    RegisterUser,
    ContributeCompute {
        amount: u64,
    },
    StakeTokens {
        amount: u64,
    },
    ClaimRewards,
    UpdatePlatformParams {
        min_contribution: u64,
        min_stake: u64,
        reward_rate: u64,
    },
    UpdateReputation {
        participant: Principal,
        delta: u64,
    },

    // Read-only
    IsUserRegistered {
        participant: Principal,
    },
    GetContributionCount {
        participant: Principal,
    },
    GetStakedAmount {
        participant: Principal,
    },
    GetReputation {
        participant: Principal,
    },
    GetPendingRewards {
        participant: Principal,
    },
    GetPlatformParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    UnknownFunction(String),
    ArgumentCount {
        function: &'static str,
        expected: usize,
        got: usize,
    },
    InvalidArgument {
        function: &'static str,
        index: usize,
        reason: String,
    },
    /// A mutating function sent to the read-only entry point
    NotReadOnly(&'static str),
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallError::UnknownFunction(name) => write!(f, "unknown function '{}'", name),
            CallError::ArgumentCount {
                function,
                expected,
                got,
            } => write!(
                f,
                "{} expects {} argument(s), got {}",
                function, expected, got
            ),
            CallError::InvalidArgument {
                function,
                index,
                reason,
            } => write!(f, "{} argument {}: {}", function, index, reason),
            CallError::NotReadOnly(function) => {
                write!(f, "{} is not a read-only function", function)
            }
        }
    }
}

impl std::error::Error for CallError {}

/// Positional argument reader for one function
struct Args<'a> {
    function: &'static str,
    values: &'a [String],
}

impl<'a> Args<'a> {
    fn new(function: &'static str, values: &'a [String], expected: usize) -> Result<Self, CallError> {
        if values.len() != expected {
            return Err(CallError::ArgumentCount {
                function,
                expected,
                got: values.len(),
            });
        }
        Ok(Self { function, values })
    }

    fn invalid(&self, index: usize, reason: impl Into<String>) -> CallError {
        CallError::InvalidArgument {
            function: self.function,
            index,
            reason: reason.into(),
        }
    }

    fn literal(&self, index: usize) -> Result<ClarityValue, CallError> {
        ClarityValue::parse_literal(&self.values[index])
            .map_err(|e: LiteralError| self.invalid(index, e.to_string()))
    }

    fn uint(&self, index: usize) -> Result<u64, CallError> {
        match self.literal(index)? {
            ClarityValue::UInt(n) => u64::try_from(n)
                .map_err(|_| self.invalid(index, format!("u{} exceeds the ledger range", n))),
            other => Err(self.invalid(index, format!("expected uint, got {}", other))),
        }
    }

    fn principal(&self, index: usize) -> Result<Principal, CallError> {
        match self.literal(index)? {
            ClarityValue::Principal(p) => Ok(p),
            other => Err(self.invalid(index, format!("expected principal, got {}", other))),
        }
    }
}

impl ContractCall {
    pub const FUNCTIONS: [&'static str; 12] = [
        "register-user",
        "contribute-compute",
        "stake-tokens",
        "claim-rewards",
        "update-platform-params",
        "update-reputation",
        "is-user-registered",
        "get-contribution-count",
        "get-staked-amount",
        "get-reputation",
        "get-pending-rewards",
        "get-platform-params",
    ];

    pub fn parse(function: &str, args: &[String]) -> Result<Self, CallError> {
        let name = Self::FUNCTIONS
            .iter()
            .copied()
            .find(|f| *f == function)
            .ok_or_else(|| CallError::UnknownFunction(function.to_string()))?;

        let call = match name {
            "register-user" => {
                Args::new(name, args, 0)?;
                ContractCall::RegisterUser
            }
            "contribute-compute" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::ContributeCompute { amount: a.uint(0)? }
            }
            "stake-tokens" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::StakeTokens { amount: a.uint(0)? }
            }
            "claim-rewards" => {
                Args::new(name, args, 0)?;
                ContractCall::ClaimRewards
            }
            "update-platform-params" => {
                let a = Args::new(name, args, 3)?;
                ContractCall::UpdatePlatformParams {
                    min_contribution: a.uint(0)?,
                    min_stake: a.uint(1)?,
                    reward_rate: a.uint(2)?,
                }
            }
            "update-reputation" => {
                let a = Args::new(name, args, 2)?;
                ContractCall::UpdateReputation {
                    participant: a.principal(0)?,
                    delta: a.uint(1)?,
                }
            }
            "is-user-registered" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::IsUserRegistered {
                    participant: a.principal(0)?,
                }
            }
            "get-contribution-count" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::GetContributionCount {
                    participant: a.principal(0)?,
                }
            }
            "get-staked-amount" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::GetStakedAmount {
                    participant: a.principal(0)?,
                }
            }
            "get-reputation" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::GetReputation {
                    participant: a.principal(0)?,
                }
            }
            "get-pending-rewards" => {
                let a = Args::new(name, args, 1)?;
                ContractCall::GetPendingRewards {
                    participant: a.principal(0)?,
                }
            }
            _ => {
                Args::new(name, args, 0)?;
                ContractCall::GetPlatformParams
            }
        };

        Ok(call)
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            ContractCall::RegisterUser => "register-user",
            ContractCall::ContributeCompute { .. } => "contribute-compute",
            ContractCall::StakeTokens { .. } => "stake-tokens",
            ContractCall::ClaimRewards => "claim-rewards",
            ContractCall::UpdatePlatformParams { .. } => "update-platform-params",
            ContractCall::UpdateReputation { .. } => "update-reputation",
            ContractCall::IsUserRegistered { .. } => "is-user-registered",
            ContractCall::GetContributionCount { .. } => "get-contribution-count",
            ContractCall::GetStakedAmount { .. } => "get-staked-amount",
            ContractCall::GetReputation { .. } => "get-reputation",
            ContractCall::GetPendingRewards { .. } => "get-pending-rewards",
            ContractCall::GetPlatformParams => "get-platform-params",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(
            self,
            ContractCall::IsUserRegistered { .. }
                | ContractCall::GetContributionCount { .. }
                | ContractCall::GetStakedAmount { .. }
                | ContractCall::GetReputation { .. }
                | ContractCall::GetPendingRewards { .. }
                | ContractCall::GetPlatformParams
        )
    }

    /// Arguments in literal form, as they would be passed in
    pub fn args(&self) -> Vec<String> {
        let values = match self {
            ContractCall::RegisterUser
            | ContractCall::ClaimRewards
            | ContractCall::GetPlatformParams => vec![],
            ContractCall::ContributeCompute { amount } | ContractCall::StakeTokens { amount } => {
                vec![ClarityValue::uint(*amount)]
            }
            ContractCall::UpdatePlatformParams {
                min_contribution,
                min_stake,
                reward_rate,
            } => vec![
                ClarityValue::uint(*min_contribution),
                ClarityValue::uint(*min_stake),
                ClarityValue::uint(*reward_rate),
            ],
            ContractCall::UpdateReputation { participant, delta } => vec![
                ClarityValue::Principal(participant.clone()),
                ClarityValue::uint(*delta),
            ],
            ContractCall::IsUserRegistered { participant }
            | ContractCall::GetContributionCount { participant }
            | ContractCall::GetStakedAmount { participant }
            | ContractCall::GetReputation { participant }
            | ContractCall::GetPendingRewards { participant } => {
                vec![ClarityValue::Principal(participant.clone())]
            }
        };

        values.iter().map(ToString::to_string).collect()
    }
}
