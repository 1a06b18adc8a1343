//! Reward calculation and claims
//!
//! A claim pays `unclaimed_units * reward_rate / REWARD_RATE_DENOMINATOR`
//! at the reward rate in force when the claim is made, then advances the
//! participant's watermark to their current cumulative units. Claiming
//! again without new contributions pays 0. Contribution counts are never
//! reset by a claim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::{
    AccountRegistry, ComputeLedger, LedgerError, PlatformParameters, Principal,
    REWARD_RATE_DENOMINATOR,
};

/// Per-participant claim bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimState {
    /// Compute units already paid out
    pub claimed_units: u64,

    /// Sum of all rewards paid
    pub total_claimed: u64,

    pub last_claim_at: Option<DateTime<Utc>>,
}

/// Result of a successful claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaim {
    pub amount: u64,
    pub units_consumed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct RewardCalculator {
    claims: HashMap<Principal, ClaimState>,
}

impl RewardCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward owed for `units` at `reward_rate`, floored and capped at `u64::MAX`
    pub fn reward_for(units: u64, reward_rate: u64) -> u64 {
        let raw = units as u128 * reward_rate as u128 / REWARD_RATE_DENOMINATOR as u128;
        u64::try_from(raw).unwrap_or(u64::MAX)
    }

    pub fn claim_state(&self, who: &Principal) -> ClaimState {
        self.claims.get(who).copied().unwrap_or_default()
    }

    pub fn unclaimed_units(&self, compute: &ComputeLedger, who: &Principal) -> u64 {
        compute
            .compute_units(who)
            .saturating_sub(self.claim_state(who).claimed_units)
    }

    /// What a claim would pay right now, without claiming
    pub fn pending(
        &self,
        compute: &ComputeLedger,
        params: &PlatformParameters,
        who: &Principal,
    ) -> u64 {
        Self::reward_for(self.unclaimed_units(compute, who), params.reward_rate)
    }

    pub fn claim(
        &mut self,
        registry: &AccountRegistry,
        compute: &ComputeLedger,
        params: &PlatformParameters,
        who: &Principal,
    ) -> Result<RewardClaim, LedgerError> {
        registry.ensure_registered(who)?;

        let units_consumed = self.unclaimed_units(compute, who);
        let amount = Self::reward_for(units_consumed, params.reward_rate);

        let state = self.claims.entry(who.clone()).or_default();
        state.claimed_units = compute.compute_units(who);
        state.total_claimed = state.total_claimed.saturating_add(amount);
        state.last_claim_at = Some(Utc::now());

        Ok(RewardClaim {
            amount,
            units_consumed,
        })
    }

    pub(crate) fn restore(&mut self, who: Principal, state: ClaimState) {
        self.claims.insert(who, state);
    }
}
