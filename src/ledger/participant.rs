//! Participant snapshot assembled from the component ledgers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ledger::{ClaimState, ContributionRecord, Principal};

/// Everything the ledger knows about one registered identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub principal: Principal,
    pub registered_at: DateTime<Utc>,

    /// Accepted contributions and their cumulative compute units
    pub contribution_count: u64,
    pub compute_units: u64,

    /// Watermark of compute units already rewarded
    pub claimed_compute_units: u64,
    pub total_rewards_claimed: u64,
    pub last_claim_at: Option<DateTime<Utc>>,

    pub staked: u64,
    pub reputation: u64,
}

impl Participant {
    pub fn contribution_record(&self) -> ContributionRecord {
        ContributionRecord {
            count: self.contribution_count,
            compute_units: self.compute_units,
        }
    }

    pub fn claim_state(&self) -> ClaimState {
        ClaimState {
            claimed_units: self.claimed_compute_units,
            total_claimed: self.total_rewards_claimed,
            last_claim_at: self.last_claim_at,
        }
    }
}
