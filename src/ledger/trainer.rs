//! Model Trainer - Ledger Orchestrator
//!
//! Owns every component ledger behind a single lock so each operation is
//! applied atomically and in a total order. Optionally writes accepted
//! changes through to PostgreSQL; the in-memory state stays authoritative.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::database::pool::DatabasePool;
use crate::ledger::{
    AccountRegistry, ComputeLedger, ContributionRecord, LedgerError, OwnerGate, Participant,
    PlatformParameters, Principal, ReputationBook, RewardCalculator, RewardClaim, StakeLedger,
};

/// Aggregate figures for monitoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformStats {
    pub participants: usize,
    pub total_compute_units: u128,
    pub total_staked: u128,
    pub total_rewards_claimed: u128,
    pub block_height: u64,
    pub params: PlatformParameters,
}

/// All ledger state. Every method runs to completion without awaiting, so
/// holding the write guard for a call (or a batch of calls) serializes it.
#[derive(Debug)]
pub struct LedgerState {
    registry: AccountRegistry,
    compute: ComputeLedger,
    stakes: StakeLedger,
    rewards: RewardCalculator,
    reputation: ReputationBook,
    params: PlatformParameters,
    gate: OwnerGate,
    block_height: u64,

    /// Participants changed since the last drain
    dirty: HashSet<Principal>,
    params_dirty: bool,
}

impl LedgerState {
    pub fn new(owner: Principal, params: PlatformParameters) -> Self {
        Self {
            registry: AccountRegistry::new(),
            compute: ComputeLedger::new(),
            stakes: StakeLedger::new(),
            rewards: RewardCalculator::new(),
            reputation: ReputationBook::new(),
            params,
            gate: OwnerGate::new(owner),
            block_height: 0,
            dirty: HashSet::new(),
            params_dirty: false,
        }
    }

    pub fn register(&mut self, who: &Principal) -> Result<(), LedgerError> {
        match self.registry.register(who) {
            Ok(_) => {
                self.dirty.insert(who.clone());
                info!(participant = %who, "Participant registered");
                Ok(())
            }
            Err(e) => {
                debug!(participant = %who, error = %e, "Registration rejected");
                Err(e)
            }
        }
    }

    pub fn contribute(
        &mut self,
        who: &Principal,
        amount: u64,
    ) -> Result<ContributionRecord, LedgerError> {
        match self
            .compute
            .contribute(&self.registry, &self.params, who, amount)
        {
            Ok(record) => {
                self.dirty.insert(who.clone());
                info!(
                    participant = %who,
                    amount = amount,
                    contributions = record.count,
                    "Compute contribution recorded"
                );
                Ok(record)
            }
            Err(e) => {
                debug!(participant = %who, amount = amount, error = %e, "Contribution rejected");
                Err(e)
            }
        }
    }

    pub fn stake(&mut self, who: &Principal, amount: u64) -> Result<u64, LedgerError> {
        match self.stakes.stake(&self.registry, &self.params, who, amount) {
            Ok(balance) => {
                self.dirty.insert(who.clone());
                info!(participant = %who, amount = amount, balance = balance, "Tokens staked");
                Ok(balance)
            }
            Err(e) => {
                debug!(participant = %who, amount = amount, error = %e, "Stake rejected");
                Err(e)
            }
        }
    }

    pub fn claim_rewards(&mut self, who: &Principal) -> Result<RewardClaim, LedgerError> {
        match self
            .rewards
            .claim(&self.registry, &self.compute, &self.params, who)
        {
            Ok(claim) => {
                self.dirty.insert(who.clone());
                info!(
                    participant = %who,
                    amount = claim.amount,
                    units = claim.units_consumed,
                    "Rewards claimed"
                );
                Ok(claim)
            }
            Err(e) => {
                debug!(participant = %who, error = %e, "Reward claim rejected");
                Err(e)
            }
        }
    }

    /// Owner-only replacement of the platform parameters
    pub fn update_parameters(
        &mut self,
        caller: &Principal,
        next: PlatformParameters,
    ) -> Result<(), LedgerError> {
        match self.gate.update_parameters(caller, &mut self.params, next) {
            Ok(()) => {
                self.params_dirty = true;
                info!(
                    min_contribution = next.min_contribution,
                    min_stake = next.min_stake,
                    reward_rate = next.reward_rate,
                    "Platform parameters updated"
                );
                Ok(())
            }
            Err(e) => {
                warn!(caller = %caller, "Rejected parameter update from non-owner");
                Err(e)
            }
        }
    }

    /// Owner-only reputation adjustment; returns the new score
    pub fn update_reputation(
        &mut self,
        caller: &Principal,
        who: &Principal,
        delta: u64,
    ) -> Result<u64, LedgerError> {
        if let Err(e) = self.gate.ensure_owner(caller) {
            warn!(caller = %caller, participant = %who, "Rejected reputation update from non-owner");
            return Err(e);
        }

        let score = self.reputation.adjust(&self.registry, who, delta)?;
        self.dirty.insert(who.clone());
        info!(participant = %who, delta = delta, score = score, "Reputation updated");
        Ok(score)
    }

    pub fn is_registered(&self, who: &Principal) -> bool {
        self.registry.is_registered(who)
    }

    pub fn contribution_count(&self, who: &Principal) -> u64 {
        self.compute.contribution_count(who)
    }

    pub fn staked(&self, who: &Principal) -> u64 {
        self.stakes.staked(who)
    }

    pub fn reputation(&self, who: &Principal) -> u64 {
        self.reputation.score(who)
    }

    pub fn pending_rewards(&self, who: &Principal) -> u64 {
        self.rewards.pending(&self.compute, &self.params, who)
    }

    pub fn params(&self) -> PlatformParameters {
        self.params
    }

    pub fn owner(&self) -> &Principal {
        self.gate.owner()
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Open the next block and return its height
    pub fn advance_height(&mut self) -> u64 {
        self.block_height += 1;
        self.block_height
    }

    pub fn participant(&self, who: &Principal) -> Option<Participant> {
        let registered_at = self.registry.registered_at(who)?;
        let record = self.compute.record(who);
        let claims = self.rewards.claim_state(who);

        Some(Participant {
            principal: who.clone(),
            registered_at,
            contribution_count: record.count,
            compute_units: record.compute_units,
            claimed_compute_units: claims.claimed_units,
            total_rewards_claimed: claims.total_claimed,
            last_claim_at: claims.last_claim_at,
            staked: self.stakes.staked(who),
            reputation: self.reputation.score(who),
        })
    }

    /// All participants, ordered by principal
    pub fn participants(&self) -> Vec<Participant> {
        let mut principals: Vec<&Principal> = self.registry.principals().collect();
        principals.sort();
        principals
            .into_iter()
            .filter_map(|p| self.participant(p))
            .collect()
    }

    pub fn stats(&self) -> PlatformStats {
        let total_rewards_claimed = self
            .registry
            .principals()
            .map(|p| self.rewards.claim_state(p).total_claimed as u128)
            .sum();

        PlatformStats {
            participants: self.registry.len(),
            total_compute_units: self.compute.total_compute_units(),
            total_staked: self.stakes.total_staked(),
            total_rewards_claimed,
            block_height: self.block_height,
            params: self.params,
        }
    }

    /// Reinstate a persisted participant without marking it dirty
    pub fn restore_participant(&mut self, participant: &Participant) {
        let who = participant.principal.clone();
        self.registry.restore(who.clone(), participant.registered_at);
        self.compute
            .restore(who.clone(), participant.contribution_record());
        self.stakes.restore(who.clone(), participant.staked);
        self.rewards.restore(who.clone(), participant.claim_state());
        self.reputation.restore(who, participant.reputation);
    }

    pub fn restore_parameters(&mut self, params: PlatformParameters) {
        self.params = params;
    }

    fn take_dirty(&mut self) -> (Vec<Participant>, Option<PlatformParameters>) {
        let dirty: Vec<Principal> = self.dirty.drain().collect();
        let snapshots = dirty.iter().filter_map(|p| self.participant(p)).collect();
        let params = std::mem::take(&mut self.params_dirty).then_some(self.params);
        (snapshots, params)
    }
}

/// Shared handle to the ledger
pub struct ModelTrainer {
    db: Option<Arc<DatabasePool>>,
    state: Arc<RwLock<LedgerState>>,
}

impl ModelTrainer {
    pub fn new(owner: Principal, params: PlatformParameters) -> Self {
        Self {
            db: None,
            state: Arc::new(RwLock::new(LedgerState::new(owner, params))),
        }
    }

    pub fn with_database(mut self, db: Arc<DatabasePool>) -> Self {
        self.db = Some(db);
        self
    }

    /// Replace in-memory state with what the database holds.
    /// Returns the number of participants restored.
    pub async fn load_from_database(&self) -> Result<usize> {
        let Some(ref db) = self.db else {
            return Ok(0);
        };

        let participants = db
            .participants()
            .load_all()
            .await
            .map_err(|e| anyhow::anyhow!(e))?;
        let params = db
            .parameters()
            .load()
            .await
            .map_err(|e| anyhow::anyhow!(e))?;

        let mut state = self.state.write().await;
        if let Some(params) = params {
            state.restore_parameters(params);
        }
        for participant in &participants {
            state.restore_participant(participant);
        }

        info!(participants = participants.len(), "Ledger state restored from database");
        Ok(participants.len())
    }

    /// Run `f` under the write lock, then write through whatever it changed
    pub async fn transact<R>(&self, f: impl FnOnce(&mut LedgerState) -> R) -> R {
        let mut state = self.state.write().await;
        let result = f(&mut *state);

        let (participants, params) = state.take_dirty();
        if let Some(ref db) = self.db {
            // Still holding the write lock, so writes land in ledger order
            Self::persist(db, &participants, params).await;
        }

        result
    }

    /// Run `f` under the read lock
    pub async fn inspect<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        let state = self.state.read().await;
        f(&*state)
    }

    pub async fn register(&self, who: &Principal) -> Result<(), LedgerError> {
        self.transact(|s| s.register(who)).await
    }

    pub async fn contribute(
        &self,
        who: &Principal,
        amount: u64,
    ) -> Result<ContributionRecord, LedgerError> {
        self.transact(|s| s.contribute(who, amount)).await
    }

    pub async fn stake(&self, who: &Principal, amount: u64) -> Result<u64, LedgerError> {
        self.transact(|s| s.stake(who, amount)).await
    }

    pub async fn claim_rewards(&self, who: &Principal) -> Result<RewardClaim, LedgerError> {
        self.transact(|s| s.claim_rewards(who)).await
    }

    pub async fn update_parameters(
        &self,
        caller: &Principal,
        next: PlatformParameters,
    ) -> Result<(), LedgerError> {
        self.transact(|s| s.update_parameters(caller, next)).await
    }

    pub async fn update_reputation(
        &self,
        caller: &Principal,
        who: &Principal,
        delta: u64,
    ) -> Result<u64, LedgerError> {
        self.transact(|s| s.update_reputation(caller, who, delta))
            .await
    }

    pub async fn is_registered(&self, who: &Principal) -> bool {
        self.inspect(|s| s.is_registered(who)).await
    }

    pub async fn contribution_count(&self, who: &Principal) -> u64 {
        self.inspect(|s| s.contribution_count(who)).await
    }

    pub async fn participant(&self, who: &Principal) -> Option<Participant> {
        self.inspect(|s| s.participant(who)).await
    }

    pub async fn params(&self) -> PlatformParameters {
        self.inspect(|s| s.params()).await
    }

    pub async fn stats(&self) -> PlatformStats {
        self.inspect(|s| s.stats()).await
    }

    async fn persist(
        db: &DatabasePool,
        participants: &[Participant],
        params: Option<PlatformParameters>,
    ) {
        for participant in participants {
            if let Err(e) = db.participants().upsert(participant).await {
                warn!(participant = %participant.principal, error = %e, "Failed to persist participant");
            }
        }

        if let Some(params) = params {
            if let Err(e) = db.parameters().save(&params).await {
                warn!(error = %e, "Failed to persist platform parameters");
            }
        }
    }
}
