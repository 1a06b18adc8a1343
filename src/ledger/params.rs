//! Platform parameters and owner-only governance
//!
//! Parameters are a plain value owned by the ledger instance. The only
//! way to change them at runtime is through [`OwnerGate`], which checks
//! the caller before anything else is looked at.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::{AccountRegistry, LedgerError, Principal};

/// Reward rate is expressed per this many compute units
pub const REWARD_RATE_DENOMINATOR: u64 = 100;

/// Upper bound accepted from configuration (100x the contributed units)
pub const MAX_REWARD_RATE: u64 = 10_000;

/// Owner-tunable thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformParameters {
    /// Smallest accepted compute contribution
    pub min_contribution: u64,

    /// Smallest accepted stake deposit
    pub min_stake: u64,

    /// Reward per [`REWARD_RATE_DENOMINATOR`] compute units
    pub reward_rate: u64,
}

impl Default for PlatformParameters {
    fn default() -> Self {
        Self {
            min_contribution: 100,
            min_stake: 1000,
            reward_rate: 10,
        }
    }
}

/// Capability check for privileged operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerGate {
    owner: Principal,
}

impl OwnerGate {
    pub fn new(owner: Principal) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn ensure_owner(&self, caller: &Principal) -> Result<(), LedgerError> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(LedgerError::OwnerOnly)
        }
    }

    /// Replace the parameters if `caller` is the owner
    pub fn update_parameters(
        &self,
        caller: &Principal,
        params: &mut PlatformParameters,
        next: PlatformParameters,
    ) -> Result<(), LedgerError> {
        self.ensure_owner(caller)?;
        *params = next;
        Ok(())
    }
}

/// Owner-maintained reputation scores
#[derive(Debug, Clone, Default)]
pub struct ReputationBook {
    scores: HashMap<Principal, u64>,
}

impl ReputationBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score, 0 for anyone never adjusted
    pub fn score(&self, who: &Principal) -> u64 {
        self.scores.get(who).copied().unwrap_or(0)
    }

    /// Add `delta` to a registered participant's score, saturating at `u64::MAX`
    pub fn adjust(
        &mut self,
        registry: &AccountRegistry,
        who: &Principal,
        delta: u64,
    ) -> Result<u64, LedgerError> {
        registry.ensure_registered(who)?;

        let score = self.scores.entry(who.clone()).or_insert(0);
        *score = score.saturating_add(delta);
        Ok(*score)
    }

    pub(crate) fn restore(&mut self, who: Principal, score: u64) {
        self.scores.insert(who, score);
    }
}
