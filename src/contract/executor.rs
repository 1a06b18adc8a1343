//! Contract Executor
//!
//! Applies decoded calls to the ledger and produces receipts. A block is a
//! batch of transactions applied in submission order under one write lock;
//! each transaction succeeds or fails on its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::contract::call::{CONTRACT_NAME, CallError, ContractCall};
use crate::contract::value::ClarityValue;
use crate::ledger::{LedgerError, LedgerState, ModelTrainer, PlatformParameters, Principal};

/// One call submitted by one sender
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub sender: Principal,
    pub call: ContractCall,
}

impl Transaction {
    pub fn new(sender: Principal, call: ContractCall) -> Self {
        Self { sender, call }
    }
}

/// Outcome of one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_id: Uuid,
    pub block_height: u64,
    pub tx_index: u32,
    pub sender: Principal,
    pub contract: String,
    pub function: String,
    pub args: Vec<String>,
    /// Rendered result, e.g. `(ok true)` or `(err u102)`
    pub result: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub height: u64,
    pub mined_at: DateTime<Utc>,
    pub receipts: Vec<Receipt>,
}

pub struct ContractExecutor {
    trainer: Arc<ModelTrainer>,
    audit: Arc<AuditLog>,
    /// Held from execution through audit so receipts are logged in block order
    submission: Mutex<()>,
}

impl ContractExecutor {
    pub fn new(trainer: Arc<ModelTrainer>, audit: Arc<AuditLog>) -> Self {
        Self {
            trainer,
            audit,
            submission: Mutex::new(()),
        }
    }

    pub fn trainer(&self) -> &Arc<ModelTrainer> {
        &self.trainer
    }

    pub fn audit(&self) -> &Arc<AuditLog> {
        &self.audit
    }

    /// Execute a single transaction in a block of its own
    pub async fn call(&self, sender: Principal, call: ContractCall) -> Receipt {
        let tx = Transaction::new(sender, call);
        let _submission = self.submission.lock().await;
        let receipt = self
            .trainer
            .transact(|state| {
                let height = state.advance_height();
                Self::execute(state, height, 0, &tx)
            })
            .await;

        self.audit.record(receipt.clone()).await;
        receipt
    }

    /// Apply `transactions` in order as one block
    pub async fn mine_block(&self, transactions: Vec<Transaction>) -> Block {
        let _submission = self.submission.lock().await;
        let (height, receipts) = self
            .trainer
            .transact(|state| {
                let height = state.advance_height();
                let receipts: Vec<Receipt> = transactions
                    .iter()
                    .enumerate()
                    .map(|(index, tx)| Self::execute(state, height, index as u32, tx))
                    .collect();
                (height, receipts)
            })
            .await;

        for receipt in &receipts {
            self.audit.record(receipt.clone()).await;
        }

        debug!(height = height, transactions = receipts.len(), "Block mined");

        Block {
            height,
            mined_at: Utc::now(),
            receipts,
        }
    }

    /// Evaluate a read-only function without opening a block
    pub async fn read_only(&self, call: &ContractCall) -> Result<ClarityValue, CallError> {
        self.trainer
            .inspect(|state| Self::query(state, call))
            .await
            .ok_or(CallError::NotReadOnly(call.function_name()))
    }

    fn execute(state: &mut LedgerState, height: u64, index: u32, tx: &Transaction) -> Receipt {
        let value = Self::apply(state, &tx.sender, &tx.call);

        if let Some(error) = Self::rejection(&value) {
            debug!(
                sender = %tx.sender,
                function = tx.call.function_name(),
                code = error.code(),
                reason = error.description(),
                "Transaction rejected"
            );
        }

        Receipt {
            tx_id: Uuid::new_v4(),
            block_height: height,
            tx_index: index,
            sender: tx.sender.clone(),
            contract: CONTRACT_NAME.to_string(),
            function: tx.call.function_name().to_string(),
            args: tx.call.args(),
            success: !value.is_err_response(),
            result: value.to_string(),
        }
    }

    /// Ledger error behind an `(err u<code>)` result
    fn rejection(value: &ClarityValue) -> Option<LedgerError> {
        value
            .error_code()
            .and_then(|code| u64::try_from(code).ok())
            .and_then(LedgerError::from_code)
    }

    /// Mutating calls yield a response; read-only calls yield their bare value
    fn apply(state: &mut LedgerState, sender: &Principal, call: &ContractCall) -> ClarityValue {
        match call {
            ContractCall::RegisterUser => ClarityValue::response(state.register(sender).map(ok_true)),
            ContractCall::ContributeCompute { amount } => {
                ClarityValue::response(state.contribute(sender, *amount).map(ok_true))
            }
            ContractCall::StakeTokens { amount } => {
                ClarityValue::response(state.stake(sender, *amount).map(ok_true))
            }
            ContractCall::ClaimRewards => ClarityValue::response(
                state
                    .claim_rewards(sender)
                    .map(|claim| ClarityValue::uint(claim.amount)),
            ),
            ContractCall::UpdatePlatformParams {
                min_contribution,
                min_stake,
                reward_rate,
            } => {
                let next = PlatformParameters {
                    min_contribution: *min_contribution,
                    min_stake: *min_stake,
                    reward_rate: *reward_rate,
                };
                ClarityValue::response(state.update_parameters(sender, next).map(ok_true))
            }
            ContractCall::UpdateReputation { participant, delta } => ClarityValue::response(
                state
                    .update_reputation(sender, participant, *delta)
                    .map(ok_true),
            ),
            read_only => match Self::query(state, read_only) {
                Some(value) => value,
                None => unreachable!("mutating calls are matched above"),
            },
        }
    }

    /// `None` for mutating calls
    fn query(state: &LedgerState, call: &ContractCall) -> Option<ClarityValue> {
        let value = match call {
            ContractCall::IsUserRegistered { participant } => {
                ClarityValue::Bool(state.is_registered(participant))
            }
            ContractCall::GetContributionCount { participant } => {
                ClarityValue::uint(state.contribution_count(participant))
            }
            ContractCall::GetStakedAmount { participant } => {
                ClarityValue::uint(state.staked(participant))
            }
            ContractCall::GetReputation { participant } => {
                ClarityValue::uint(state.reputation(participant))
            }
            ContractCall::GetPendingRewards { participant } => {
                ClarityValue::uint(state.pending_rewards(participant))
            }
            ContractCall::GetPlatformParams => {
                let params = state.params();
                ClarityValue::Tuple(vec![
                    ("min-contribution".to_string(), ClarityValue::uint(params.min_contribution)),
                    ("min-stake".to_string(), ClarityValue::uint(params.min_stake)),
                    ("reward-rate".to_string(), ClarityValue::uint(params.reward_rate)),
                ])
            }
            _ => return None,
        };

        Some(value)
    }
}

fn ok_true<T>(_: T) -> ClarityValue {
    ClarityValue::Bool(true)
}
