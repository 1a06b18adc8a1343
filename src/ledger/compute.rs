//! Compute contribution ledger

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ledger::{AccountRegistry, LedgerError, PlatformParameters, Principal};

/// Running totals for one participant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRecord {
    /// Number of accepted contributions
    pub count: u64,

    /// Sum of all accepted compute units
    pub compute_units: u64,
}

#[derive(Debug, Clone, Default)]
pub struct ComputeLedger {
    records: HashMap<Principal, ContributionRecord>,
}

impl ComputeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `amount` compute units for `who`
    ///
    /// Registration is checked before the minimum. An amount that would
    /// overflow the cumulative total is rejected as `InvalidAmount`.
    pub fn contribute(
        &mut self,
        registry: &AccountRegistry,
        params: &PlatformParameters,
        who: &Principal,
        amount: u64,
    ) -> Result<ContributionRecord, LedgerError> {
        registry.ensure_registered(who)?;

        if amount < params.min_contribution {
            return Err(LedgerError::InvalidAmount);
        }

        let current = self.record(who);
        let next = ContributionRecord {
            count: current
                .count
                .checked_add(1)
                .ok_or(LedgerError::InvalidAmount)?,
            compute_units: current
                .compute_units
                .checked_add(amount)
                .ok_or(LedgerError::InvalidAmount)?,
        };

        self.records.insert(who.clone(), next);
        Ok(next)
    }

    pub fn record(&self, who: &Principal) -> ContributionRecord {
        self.records.get(who).copied().unwrap_or_default()
    }

    pub fn contribution_count(&self, who: &Principal) -> u64 {
        self.record(who).count
    }

    pub fn compute_units(&self, who: &Principal) -> u64 {
        self.record(who).compute_units
    }

    /// Compute units across all participants
    pub fn total_compute_units(&self) -> u128 {
        self.records.values().map(|r| r.compute_units as u128).sum()
    }

    pub(crate) fn restore(&mut self, who: Principal, record: ContributionRecord) {
        self.records.insert(who, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registered(name: &str) -> (AccountRegistry, Principal) {
        let mut registry = AccountRegistry::new();
        let who = Principal::new(name).unwrap();
        registry.register(&who).unwrap();
        (registry, who)
    }

    #[test]
    fn test_contribution_respects_minimum() {
        let (registry, user) = registered("wallet_1");
        let params = PlatformParameters::default();
        let mut ledger = ComputeLedger::new();

        let record = ledger.contribute(&registry, &params, &user, 150).unwrap();
        assert_eq!(record.count, 1);
        assert_eq!(record.compute_units, 150);

        assert_eq!(
            ledger.contribute(&registry, &params, &user, 50),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(ledger.contribution_count(&user), 1);
    }

    #[test]
    fn test_exact_minimum_is_accepted() {
        let (registry, user) = registered("wallet_1");
        let params = PlatformParameters::default();
        let mut ledger = ComputeLedger::new();

        assert!(ledger.contribute(&registry, &params, &user, 100).is_ok());
    }

    #[test]
    fn test_unregistered_checked_before_minimum() {
        let registry = AccountRegistry::new();
        let params = PlatformParameters::default();
        let mut ledger = ComputeLedger::new();
        let stranger = Principal::new("wallet_9").unwrap();

        assert_eq!(
            ledger.contribute(&registry, &params, &stranger, 1),
            Err(LedgerError::NotRegistered)
        );
    }

    #[test]
    fn test_overflow_leaves_record_untouched() {
        let (registry, user) = registered("wallet_1");
        let params = PlatformParameters::default();
        let mut ledger = ComputeLedger::new();

        ledger.contribute(&registry, &params, &user, u64::MAX).unwrap();
        assert_eq!(
            ledger.contribute(&registry, &params, &user, 100),
            Err(LedgerError::InvalidAmount)
        );
        assert_eq!(ledger.record(&user).count, 1);
        assert_eq!(ledger.compute_units(&user), u64::MAX);
    }
}
