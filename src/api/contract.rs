//! Contract API endpoints
//!
//! Endpoints:
//!   POST /call -> Execute one transaction in its own block
//!   POST /block -> Execute a batch of transactions as one block
//!   POST /read-only -> Evaluate a read-only function

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::contract::{Block, ContractCall, ContractExecutor, Receipt, Transaction};
use crate::ledger::Principal;

/// Largest batch accepted by `/block`
pub const MAX_BLOCK_TRANSACTIONS: usize = 256;

#[derive(Clone)]
pub struct ContractApiState {
    pub executor: Arc<ContractExecutor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallRequest {
    pub sender: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockRequest {
    pub transactions: Vec<CallRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ReadOnlyRequest {
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReadOnlyResponse {
    pub function: String,
    pub result: String,
}

fn decode(request: &CallRequest) -> Result<Transaction, String> {
    let sender = Principal::new(request.sender.clone()).map_err(|e| e.to_string())?;
    let call = ContractCall::parse(&request.function, &request.args).map_err(|e| e.to_string())?;
    Ok(Transaction::new(sender, call))
}

/// POST /contract/call
pub async fn submit_call(
    State(state): State<ContractApiState>,
    Json(payload): Json<CallRequest>,
) -> Result<Json<Receipt>, (StatusCode, String)> {
    let tx = decode(&payload).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let receipt = state.executor.call(tx.sender, tx.call).await;
    Ok(Json(receipt))
}

/// POST /contract/block - nothing is applied unless every transaction decodes
pub async fn submit_block(
    State(state): State<ContractApiState>,
    Json(payload): Json<BlockRequest>,
) -> Result<Json<Block>, (StatusCode, String)> {
    if payload.transactions.len() > MAX_BLOCK_TRANSACTIONS {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Block holds {} transactions (max: {})",
                payload.transactions.len(),
                MAX_BLOCK_TRANSACTIONS
            ),
        ));
    }

    let transactions = payload
        .transactions
        .iter()
        .enumerate()
        .map(|(index, request)| {
            decode(request).map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("transaction {}: {}", index, e),
                )
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let block = state.executor.mine_block(transactions).await;
    Ok(Json(block))
}

/// POST /contract/read-only
pub async fn read_only(
    State(state): State<ContractApiState>,
    Json(payload): Json<ReadOnlyRequest>,
) -> Result<Json<ReadOnlyResponse>, (StatusCode, String)> {
    let call = ContractCall::parse(&payload.function, &payload.args)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let value = state
        .executor
        .read_only(&call)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    debug!(function = %payload.function, result = %value, "Read-only call evaluated");

    Ok(Json(ReadOnlyResponse {
        function: payload.function,
        result: value.to_string(),
    }))
}

pub fn create_router(state: ContractApiState) -> Router {
    Router::new()
        .route("/call", post(submit_call))
        .route("/block", post(submit_block))
        .route("/read-only", post(read_only))
        .with_state(state)
}
