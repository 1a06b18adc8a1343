//! Integration tests for the model trainer ledger
//!
//! These tests drive the ledger end to end through the contract surface:
//! registration, contributions, staking, reward claims, owner-only
//! administration, block ordering, the audit trail and the HTTP handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use model_trainer::api::contract::{
    BlockRequest, CallRequest, ContractApiState, ReadOnlyRequest, read_only, submit_block,
    submit_call,
};
use model_trainer::api::platform::{
    AuditQuery, PlatformApiState, get_audit, get_participant, get_params, get_stats,
    list_participants,
};
use model_trainer::{
    AuditLog, CallError, ContractCall, ContractExecutor, LedgerError, ModelTrainer,
    PlatformParameters, Principal, Receipt, Transaction,
};
use std::sync::Arc;

// ============================================================================
// Test Helpers
// ============================================================================

const DEPLOYER: &str = "deployer";

fn principal(name: &str) -> Principal {
    Principal::new(name).unwrap()
}

fn create_test_executor() -> Arc<ContractExecutor> {
    let trainer = Arc::new(ModelTrainer::new(
        principal(DEPLOYER),
        PlatformParameters::default(),
    ));
    Arc::new(ContractExecutor::new(trainer, Arc::new(AuditLog::new())))
}

/// Decode and submit one call as its own block
async fn call(executor: &ContractExecutor, sender: &str, function: &str, args: &[&str]) -> Receipt {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let call = ContractCall::parse(function, &args).unwrap();
    executor.call(principal(sender), call).await
}

async fn read(executor: &ContractExecutor, function: &str, args: &[&str]) -> String {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let call = ContractCall::parse(function, &args).unwrap();
    executor.read_only(&call).await.unwrap().to_string()
}

fn request(sender: &str, function: &str, args: &[&str]) -> CallRequest {
    CallRequest {
        sender: sender.to_string(),
        function: function.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
    }
}

// ============================================================================
// Registration
// ============================================================================

mod registration {
    use super::*;

    #[tokio::test]
    async fn test_register_twice_fails() {
        let executor = create_test_executor();

        let first = call(&executor, "wallet_1", "register-user", &[]).await;
        assert_eq!(first.result, "(ok true)");
        assert!(first.success);

        let second = call(&executor, "wallet_1", "register-user", &[]).await;
        assert_eq!(second.result, "(err u102)");
        assert!(!second.success);
    }

    #[tokio::test]
    async fn test_registration_is_per_identity() {
        let executor = create_test_executor();

        call(&executor, "wallet_1", "register-user", &[]).await;
        let other = call(&executor, "wallet_2", "register-user", &[]).await;
        assert_eq!(other.result, "(ok true)");

        assert_eq!(read(&executor, "is-user-registered", &["'wallet_1"]).await, "true");
        assert_eq!(read(&executor, "is-user-registered", &["'wallet_2"]).await, "true");
        assert_eq!(read(&executor, "is-user-registered", &["'wallet_3"]).await, "false");
    }

    #[tokio::test]
    async fn test_register_then_contribute_once() {
        let executor = create_test_executor();

        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "contribute-compute", &["u150"]).await;

        assert_eq!(read(&executor, "is-user-registered", &["'wallet_1"]).await, "true");
        assert_eq!(read(&executor, "get-contribution-count", &["'wallet_1"]).await, "u1");
    }
}

// ============================================================================
// Contributions & Staking
// ============================================================================

mod contributions {
    use super::*;

    #[tokio::test]
    async fn test_contribution_minimum() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let accepted = call(&executor, "wallet_1", "contribute-compute", &["u150"]).await;
        assert_eq!(accepted.result, "(ok true)");

        let rejected = call(&executor, "wallet_1", "contribute-compute", &["u50"]).await;
        assert_eq!(rejected.result, "(err u103)");

        // Exactly the minimum is accepted
        let boundary = call(&executor, "wallet_1", "contribute-compute", &["u100"]).await;
        assert_eq!(boundary.result, "(ok true)");

        // Rejections leave no trace
        assert_eq!(read(&executor, "get-contribution-count", &["'wallet_1"]).await, "u2");
    }

    #[tokio::test]
    async fn test_stake_minimum() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let accepted = call(&executor, "wallet_1", "stake-tokens", &["u1500"]).await;
        assert_eq!(accepted.result, "(ok true)");

        let rejected = call(&executor, "wallet_1", "stake-tokens", &["u500"]).await;
        assert_eq!(rejected.result, "(err u105)");

        assert_eq!(read(&executor, "get-staked-amount", &["'wallet_1"]).await, "u1500");
    }

    #[tokio::test]
    async fn test_stakes_accumulate() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "stake-tokens", &["u1500"]).await;
        call(&executor, "wallet_1", "stake-tokens", &["u2000"]).await;

        assert_eq!(read(&executor, "get-staked-amount", &["'wallet_1"]).await, "u3500");
    }

    #[tokio::test]
    async fn test_contribution_overflow_rejected() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let max = format!("u{}", u64::MAX);
        let first = call(&executor, "wallet_1", "contribute-compute", &[&max]).await;
        assert_eq!(first.result, "(ok true)");

        let overflow = call(&executor, "wallet_1", "contribute-compute", &["u100"]).await;
        assert_eq!(overflow.result, "(err u103)");
        assert_eq!(read(&executor, "get-contribution-count", &["'wallet_1"]).await, "u1");
    }
}

// ============================================================================
// Rewards
// ============================================================================

mod rewards {
    use super::*;

    #[tokio::test]
    async fn test_claim_after_contribution() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "contribute-compute", &["u200"]).await;

        assert_eq!(read(&executor, "get-pending-rewards", &["'wallet_1"]).await, "u20");

        let claim = call(&executor, "wallet_1", "claim-rewards", &[]).await;
        assert_eq!(claim.result, "(ok u20)");
        assert!(claim.success);
    }

    #[tokio::test]
    async fn test_reclaim_pays_nothing_new() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "contribute-compute", &["u200"]).await;
        call(&executor, "wallet_1", "claim-rewards", &[]).await;

        let again = call(&executor, "wallet_1", "claim-rewards", &[]).await;
        assert_eq!(again.result, "(ok u0)");

        // Claiming does not reset the contribution count
        assert_eq!(read(&executor, "get-contribution-count", &["'wallet_1"]).await, "u1");

        call(&executor, "wallet_1", "contribute-compute", &["u300"]).await;
        let later = call(&executor, "wallet_1", "claim-rewards", &[]).await;
        assert_eq!(later.result, "(ok u30)");

        let participant = executor
            .trainer()
            .participant(&principal("wallet_1"))
            .await
            .unwrap();
        assert_eq!(participant.total_rewards_claimed, 50);
        assert_eq!(participant.claimed_compute_units, 500);
    }

    #[tokio::test]
    async fn test_claim_without_contribution() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let claim = call(&executor, "wallet_1", "claim-rewards", &[]).await;
        assert_eq!(claim.result, "(ok u0)");
    }

    #[tokio::test]
    async fn test_reward_rate_change_applies_to_unclaimed_units() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "contribute-compute", &["u200"]).await;

        call(&executor, DEPLOYER, "update-platform-params", &["u100", "u1000", "u50"]).await;

        let claim = call(&executor, "wallet_1", "claim-rewards", &[]).await;
        assert_eq!(claim.result, "(ok u100)");
    }
}

// ============================================================================
// Owner-Only Administration
// ============================================================================

mod administration {
    use super::*;

    #[tokio::test]
    async fn test_non_owner_always_rejected() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let params = call(
            &executor,
            "wallet_1",
            "update-platform-params",
            &["u200", "u2000", "u20"],
        )
        .await;
        assert_eq!(params.result, "(err u100)");

        let reputation =
            call(&executor, "wallet_1", "update-reputation", &["'wallet_1", "u10"]).await;
        assert_eq!(reputation.result, "(err u100)");

        // Non-owner is rejected even when the target is unregistered
        let stranger =
            call(&executor, "wallet_1", "update-reputation", &["'wallet_9", "u10"]).await;
        assert_eq!(stranger.result, "(err u100)");

        assert_eq!(
            read(&executor, "get-platform-params", &[]).await,
            "(tuple (min-contribution u100) (min-stake u1000) (reward-rate u10))"
        );
    }

    #[tokio::test]
    async fn test_owner_updates_parameters() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let update = call(
            &executor,
            DEPLOYER,
            "update-platform-params",
            &["u200", "u2000", "u20"],
        )
        .await;
        assert_eq!(update.result, "(ok true)");

        let below = call(&executor, "wallet_1", "contribute-compute", &["u150"]).await;
        assert_eq!(below.result, "(err u103)");
        let stake = call(&executor, "wallet_1", "stake-tokens", &["u1500"]).await;
        assert_eq!(stake.result, "(err u105)");
    }

    #[tokio::test]
    async fn test_owner_updates_reputation() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let update =
            call(&executor, DEPLOYER, "update-reputation", &["'wallet_1", "u10"]).await;
        assert_eq!(update.result, "(ok true)");
        call(&executor, DEPLOYER, "update-reputation", &["'wallet_1", "u5"]).await;

        assert_eq!(read(&executor, "get-reputation", &["'wallet_1"]).await, "u15");
    }

    #[tokio::test]
    async fn test_reputation_target_must_be_registered() {
        let executor = create_test_executor();

        let update =
            call(&executor, DEPLOYER, "update-reputation", &["'wallet_9", "u10"]).await;
        assert_eq!(update.result, "(err u101)");
    }
}

// ============================================================================
// Unregistered Identities
// ============================================================================

mod unregistered {
    use super::*;

    #[tokio::test]
    async fn test_every_mutation_requires_registration() {
        let executor = create_test_executor();

        for (function, args) in [
            ("contribute-compute", vec!["u500"]),
            ("stake-tokens", vec!["u5000"]),
            ("claim-rewards", vec![]),
        ] {
            let receipt = call(&executor, "wallet_9", function, &args).await;
            assert_eq!(receipt.result, "(err u101)", "{} should require registration", function);
        }

        assert!(executor.trainer().participant(&principal("wallet_9")).await.is_none());
        assert_eq!(executor.trainer().stats().await.participants, 0);
    }

    #[tokio::test]
    async fn test_registration_check_precedes_amount_check() {
        let executor = create_test_executor();

        // Below minimum and unregistered: registration wins
        let receipt = call(&executor, "wallet_9", "contribute-compute", &["u1"]).await;
        assert_eq!(receipt.result, "(err u101)");
        let receipt = call(&executor, "wallet_9", "stake-tokens", &["u1"]).await;
        assert_eq!(receipt.result, "(err u101)");
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::OwnerOnly.code(), 100);
        assert_eq!(LedgerError::NotRegistered.code(), 101);
        assert_eq!(LedgerError::AlreadyRegistered.code(), 102);
        assert_eq!(LedgerError::InvalidAmount.code(), 103);
        assert_eq!(LedgerError::InsufficientStake.code(), 105);
    }
}

// ============================================================================
// Blocks & Ordering
// ============================================================================

mod blocks {
    use super::*;

    #[tokio::test]
    async fn test_block_applies_in_order() {
        let executor = create_test_executor();
        let user = principal("wallet_1");

        let block = executor
            .mine_block(vec![
                Transaction::new(user.clone(), ContractCall::ContributeCompute { amount: 150 }),
                Transaction::new(user.clone(), ContractCall::RegisterUser),
                Transaction::new(user.clone(), ContractCall::ContributeCompute { amount: 150 }),
                Transaction::new(user.clone(), ContractCall::RegisterUser),
            ])
            .await;

        let results: Vec<&str> = block.receipts.iter().map(|r| r.result.as_str()).collect();
        assert_eq!(results, vec!["(err u101)", "(ok true)", "(ok true)", "(err u102)"]);

        for (index, receipt) in block.receipts.iter().enumerate() {
            assert_eq!(receipt.block_height, block.height);
            assert_eq!(receipt.tx_index as usize, index);
            assert_eq!(receipt.contract, "model_trainer");
        }
    }

    #[tokio::test]
    async fn test_heights_increase() {
        let executor = create_test_executor();

        let first = call(&executor, "wallet_1", "register-user", &[]).await;
        let block = executor.mine_block(vec![]).await;
        let second = call(&executor, "wallet_2", "register-user", &[]).await;

        assert_eq!(first.block_height, 1);
        assert_eq!(block.height, 2);
        assert!(block.receipts.is_empty());
        assert_eq!(second.block_height, 3);
        assert_eq!(executor.trainer().stats().await.block_height, 3);
    }

    #[tokio::test]
    async fn test_concurrent_registrations_are_serialized() {
        let executor = create_test_executor();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let executor = executor.clone();
            handles.push(tokio::spawn(async move {
                executor
                    .call(principal("wallet_1"), ContractCall::RegisterUser)
                    .await
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().success {
                successes += 1;
            }
        }

        // Exactly one registration wins
        assert_eq!(successes, 1);
    }

    #[tokio::test]
    async fn test_read_only_rejects_mutations() {
        let executor = create_test_executor();

        let result = executor.read_only(&ContractCall::RegisterUser).await;
        assert_eq!(result, Err(CallError::NotReadOnly("register-user")));
        assert_eq!(executor.trainer().stats().await.block_height, 0);
    }
}

// ============================================================================
// Audit Trail
// ============================================================================

mod audit_trail {
    use super::*;

    #[tokio::test]
    async fn test_every_receipt_is_recorded() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "contribute-compute", &["u150"]).await;

        let audit = executor.audit();
        assert_eq!(audit.len().await, 3);
        assert!(audit.verify_chain().await);

        let entries = audit.recent(10).await;
        assert_eq!(entries[0].receipt.result, "(ok true)");
        assert_eq!(entries[1].receipt.result, "(err u102)");
        assert_eq!(entries[2].receipt.function, "contribute-compute");
        assert_eq!(entries[2].receipt.args, vec!["u150".to_string()]);
        assert_eq!(entries[1].prev_digest, entries[0].digest);
    }

    #[tokio::test]
    async fn test_read_only_calls_are_not_recorded() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        read(&executor, "is-user-registered", &["'wallet_1"]).await;

        assert_eq!(executor.audit().len().await, 1);
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

mod http_handlers {
    use super::*;

    fn contract_state(executor: &Arc<ContractExecutor>) -> ContractApiState {
        ContractApiState {
            executor: executor.clone(),
        }
    }

    fn platform_state(executor: &Arc<ContractExecutor>) -> PlatformApiState {
        PlatformApiState {
            trainer: executor.trainer().clone(),
            audit: executor.audit().clone(),
        }
    }

    #[tokio::test]
    async fn test_submit_call() {
        let executor = create_test_executor();

        let Json(receipt) = submit_call(
            State(contract_state(&executor)),
            Json(request("wallet_1", "register-user", &[])),
        )
        .await
        .unwrap();

        assert_eq!(receipt.result, "(ok true)");
        assert_eq!(receipt.sender, principal("wallet_1"));
    }

    #[tokio::test]
    async fn test_submit_call_rejects_bad_input() {
        let executor = create_test_executor();

        let bad_sender = submit_call(
            State(contract_state(&executor)),
            Json(request("not a principal", "register-user", &[])),
        )
        .await;
        assert_eq!(bad_sender.unwrap_err().0, StatusCode::BAD_REQUEST);

        let unknown = submit_call(
            State(contract_state(&executor)),
            Json(request("wallet_1", "mint", &[])),
        )
        .await;
        assert_eq!(unknown.unwrap_err().0, StatusCode::BAD_REQUEST);

        // Nothing reached the ledger
        assert_eq!(executor.trainer().stats().await.block_height, 0);
    }

    #[tokio::test]
    async fn test_submit_block_is_all_or_nothing_on_decode() {
        let executor = create_test_executor();

        let rejected = submit_block(
            State(contract_state(&executor)),
            Json(BlockRequest {
                transactions: vec![
                    request("wallet_1", "register-user", &[]),
                    request("wallet_1", "stake-tokens", &["lots"]),
                ],
            }),
        )
        .await;
        let (status, message) = rejected.unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(message.starts_with("transaction 1"));
        assert!(!executor.trainer().is_registered(&principal("wallet_1")).await);

        let Json(block) = submit_block(
            State(contract_state(&executor)),
            Json(BlockRequest {
                transactions: vec![
                    request("wallet_1", "register-user", &[]),
                    request("wallet_1", "stake-tokens", &["u1500"]),
                ],
            }),
        )
        .await
        .unwrap();
        assert_eq!(block.receipts.len(), 2);
        assert!(block.receipts.iter().all(|r| r.success));
    }

    #[tokio::test]
    async fn test_read_only_handler() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;

        let Json(response) = read_only(
            State(contract_state(&executor)),
            Json(ReadOnlyRequest {
                function: "is-user-registered".to_string(),
                args: vec!["'wallet_1".to_string()],
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.result, "true");

        let mutating = read_only(
            State(contract_state(&executor)),
            Json(ReadOnlyRequest {
                function: "claim-rewards".to_string(),
                args: vec![],
            }),
        )
        .await;
        assert_eq!(mutating.unwrap_err().0, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_participant_lookup() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_1", "contribute-compute", &["u200"]).await;
        call(&executor, "wallet_1", "stake-tokens", &["u1000"]).await;

        let Json(participant) = get_participant(
            State(platform_state(&executor)),
            Path("wallet_1".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(participant.contribution_count, 1);
        assert_eq!(participant.compute_units, 200);
        assert_eq!(participant.staked, 1000);

        let missing = get_participant(
            State(platform_state(&executor)),
            Path("wallet_9".to_string()),
        )
        .await;
        assert_eq!(missing.unwrap_err().0, StatusCode::NOT_FOUND);

        let invalid = get_participant(
            State(platform_state(&executor)),
            Path("bad principal".to_string()),
        )
        .await;
        assert_eq!(invalid.unwrap_err().0, StatusCode::BAD_REQUEST);

        let Json(listing) = list_participants(State(platform_state(&executor))).await;
        assert_eq!(listing.total, 1);
    }

    #[tokio::test]
    async fn test_platform_views() {
        let executor = create_test_executor();
        call(&executor, "wallet_1", "register-user", &[]).await;
        call(&executor, "wallet_2", "register-user", &[]).await;
        call(&executor, "wallet_1", "stake-tokens", &["u1500"]).await;
        call(&executor, "wallet_2", "stake-tokens", &["u2500"]).await;

        let Json(params) = get_params(State(platform_state(&executor))).await;
        assert_eq!(params.owner, principal(DEPLOYER));
        assert_eq!(params.params, PlatformParameters::default());

        let Json(stats) = get_stats(State(platform_state(&executor))).await;
        assert_eq!(stats.participants, 2);
        assert_eq!(stats.total_staked, 4000);

        let Json(audit) = get_audit(
            State(platform_state(&executor)),
            Query(AuditQuery { limit: Some(2) }),
        )
        .await;
        assert_eq!(audit.retained, 4);
        assert_eq!(audit.entries.len(), 2);
        assert!(audit.chain_valid);
        assert_eq!(audit.entries[1].digest, audit.last_digest);
    }
}
