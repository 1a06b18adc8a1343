//! Platform monitoring endpoints
//!
//! Endpoints:
//!   GET /participants -> All registered participants
//!   GET /participants/{principal} -> One participant
//!   GET /platform/params -> Owner and current parameters
//!   GET /platform/stats -> Aggregate figures
//!   GET /audit?limit=<n> -> Most recent receipts with chain check

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audit::{AuditEntry, AuditLog};
use crate::ledger::{ModelTrainer, Participant, PlatformParameters, PlatformStats, Principal};

const DEFAULT_AUDIT_LIMIT: usize = 50;
const MAX_AUDIT_LIMIT: usize = 1000;

#[derive(Clone)]
pub struct PlatformApiState {
    pub trainer: Arc<ModelTrainer>,
    pub audit: Arc<AuditLog>,
}

#[derive(Debug, Serialize)]
pub struct ParticipantsResponse {
    pub total: usize,
    pub participants: Vec<Participant>,
}

#[derive(Debug, Serialize)]
pub struct ParamsResponse {
    pub owner: Principal,
    pub params: PlatformParameters,
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AuditResponse {
    pub retained: usize,
    pub chain_valid: bool,
    pub last_digest: String,
    pub entries: Vec<AuditEntry>,
}

/// GET /participants
pub async fn list_participants(State(state): State<PlatformApiState>) -> Json<ParticipantsResponse> {
    let participants = state.trainer.inspect(|s| s.participants()).await;
    Json(ParticipantsResponse {
        total: participants.len(),
        participants,
    })
}

/// GET /participants/{principal}
pub async fn get_participant(
    State(state): State<PlatformApiState>,
    Path(principal): Path<String>,
) -> Result<Json<Participant>, (StatusCode, String)> {
    let principal =
        Principal::new(principal).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    state
        .trainer
        .participant(&principal)
        .await
        .map(Json)
        .ok_or_else(|| {
            (
                StatusCode::NOT_FOUND,
                format!("Participant {} is not registered", principal),
            )
        })
}

/// GET /platform/params
pub async fn get_params(State(state): State<PlatformApiState>) -> Json<ParamsResponse> {
    let (owner, params) = state
        .trainer
        .inspect(|s| (s.owner().clone(), s.params()))
        .await;
    Json(ParamsResponse { owner, params })
}

/// GET /platform/stats
pub async fn get_stats(State(state): State<PlatformApiState>) -> Json<PlatformStats> {
    Json(state.trainer.stats().await)
}

/// GET /audit
pub async fn get_audit(
    State(state): State<PlatformApiState>,
    Query(query): Query<AuditQuery>,
) -> Json<AuditResponse> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_AUDIT_LIMIT)
        .min(MAX_AUDIT_LIMIT);

    Json(AuditResponse {
        retained: state.audit.len().await,
        chain_valid: state.audit.verify_chain().await,
        last_digest: state.audit.last_digest().await,
        entries: state.audit.recent(limit).await,
    })
}

pub fn create_router(state: PlatformApiState) -> Router {
    Router::new()
        .route("/participants", get(list_participants))
        .route("/participants/{principal}", get(get_participant))
        .route("/platform/params", get(get_params))
        .route("/platform/stats", get(get_stats))
        .route("/audit", get(get_audit))
        .with_state(state)
}
