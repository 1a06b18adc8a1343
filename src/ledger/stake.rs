//! Token stake ledger

use std::collections::HashMap;

use crate::ledger::{AccountRegistry, LedgerError, PlatformParameters, Principal};

#[derive(Debug, Clone, Default)]
pub struct StakeLedger {
    balances: HashMap<Principal, u64>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the staked balance of `who`, returning the new balance
    pub fn stake(
        &mut self,
        registry: &AccountRegistry,
        params: &PlatformParameters,
        who: &Principal,
        amount: u64,
    ) -> Result<u64, LedgerError> {
        registry.ensure_registered(who)?;

        if amount < params.min_stake {
            return Err(LedgerError::InsufficientStake);
        }

        let balance = self
            .staked(who)
            .checked_add(amount)
            .ok_or(LedgerError::InvalidAmount)?;

        self.balances.insert(who.clone(), balance);
        Ok(balance)
    }

    pub fn staked(&self, who: &Principal) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    pub fn total_staked(&self) -> u128 {
        self.balances.values().map(|b| *b as u128).sum()
    }

    pub(crate) fn restore(&mut self, who: Principal, balance: u64) {
        self.balances.insert(who, balance);
    }
}
