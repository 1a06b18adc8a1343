//! Account registry: who is allowed to touch the ledgers

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::ledger::{LedgerError, Principal};

#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: HashMap<Principal, DateTime<Utc>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `who`; a second registration of the same identity is rejected
    pub fn register(&mut self, who: &Principal) -> Result<DateTime<Utc>, LedgerError> {
        if self.accounts.contains_key(who) {
            return Err(LedgerError::AlreadyRegistered);
        }

        let now = Utc::now();
        self.accounts.insert(who.clone(), now);
        Ok(now)
    }

    pub fn is_registered(&self, who: &Principal) -> bool {
        self.accounts.contains_key(who)
    }

    /// Gate shared by every mutating operation other than registration
    pub fn ensure_registered(&self, who: &Principal) -> Result<(), LedgerError> {
        if self.is_registered(who) {
            Ok(())
        } else {
            Err(LedgerError::NotRegistered)
        }
    }

    pub fn registered_at(&self, who: &Principal) -> Option<DateTime<Utc>> {
        self.accounts.get(who).copied()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn principals(&self) -> impl Iterator<Item = &Principal> {
        self.accounts.keys()
    }

    pub(crate) fn restore(&mut self, who: Principal, registered_at: DateTime<Utc>) {
        self.accounts.insert(who, registered_at);
    }
}
