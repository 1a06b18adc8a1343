//! Receipt Audit Log
//!
//! Bounded, hash-chained record of every executed transaction. Each entry's
//! digest covers the previous digest, so rewriting any retained entry
//! breaks [`AuditLog::verify_chain`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::VecDeque;
use tokio::sync::RwLock;

use crate::contract::Receipt;

/// Previous digest of the very first entry
pub const GENESIS_DIGEST: &str = "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub sequence: u64,
    pub recorded_at: DateTime<Utc>,
    pub receipt: Receipt,
    pub prev_digest: String,
    pub digest: String,
}

#[derive(Debug)]
struct AuditChain {
    entries: VecDeque<AuditEntry>,
    next_sequence: u64,
    last_digest: String,
}

pub struct AuditLog {
    chain: RwLock<AuditChain>,
    max_entries: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            chain: RwLock::new(AuditChain {
                entries: VecDeque::new(),
                next_sequence: 0,
                last_digest: GENESIS_DIGEST.to_string(),
            }),
            max_entries: 100_000,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Digest over the link, the record time and every receipt field
    pub fn compute_digest(
        prev_digest: &str,
        sequence: u64,
        recorded_at: &DateTime<Utc>,
        receipt: &Receipt,
    ) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prev_digest.as_bytes());
        hasher.update(sequence.to_le_bytes());
        hasher.update(
            recorded_at
                .to_rfc3339_opts(SecondsFormat::Nanos, true)
                .as_bytes(),
        );
        hasher.update(receipt.tx_id.as_bytes());
        hasher.update(receipt.block_height.to_le_bytes());
        hasher.update(receipt.tx_index.to_le_bytes());
        hasher.update(receipt.sender.as_str().as_bytes());
        hasher.update(b"\x1d");
        hasher.update(receipt.contract.as_bytes());
        hasher.update(b"\x1d");
        hasher.update(receipt.function.as_bytes());
        for arg in &receipt.args {
            hasher.update(b"\x1f");
            hasher.update(arg.as_bytes());
        }
        hasher.update(b"\x1e");
        hasher.update(receipt.result.as_bytes());
        hasher.update([u8::from(receipt.success)]);
        format!("{:x}", hasher.finalize())
    }

    pub async fn record(&self, receipt: Receipt) -> AuditEntry {
        let mut chain = self.chain.write().await;

        let sequence = chain.next_sequence;
        let prev_digest = chain.last_digest.clone();
        let recorded_at = Utc::now();
        let digest = Self::compute_digest(&prev_digest, sequence, &recorded_at, &receipt);

        tracing::debug!(
            "AUDIT: {} {} by {} -> {}",
            receipt.tx_id,
            receipt.function,
            receipt.sender,
            receipt.result
        );

        let entry = AuditEntry {
            sequence,
            recorded_at,
            receipt,
            prev_digest,
            digest: digest.clone(),
        };

        chain.entries.push_back(entry.clone());
        chain.next_sequence += 1;
        chain.last_digest = digest;

        // Trim old entries
        while chain.entries.len() > self.max_entries {
            chain.entries.pop_front();
        }

        entry
    }

    /// Up to `limit` most recent entries, oldest first
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let chain = self.chain.read().await;
        let skip = chain.entries.len().saturating_sub(limit);
        chain.entries.iter().skip(skip).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.chain.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chain.read().await.entries.is_empty()
    }

    pub async fn last_digest(&self) -> String {
        self.chain.read().await.last_digest.clone()
    }

    /// Recompute every retained digest and check the links between them
    pub async fn verify_chain(&self) -> bool {
        let chain = self.chain.read().await;
        Self::verify_entries(chain.entries.iter())
    }

    fn verify_entries<'a>(entries: impl Iterator<Item = &'a AuditEntry>) -> bool {
        let mut expected_prev: Option<&str> = None;

        for entry in entries {
            if let Some(prev) = expected_prev {
                if entry.prev_digest != prev {
                    return false;
                }
            }
            if Self::compute_digest(
                &entry.prev_digest,
                entry.sequence,
                &entry.recorded_at,
                &entry.receipt,
            ) != entry.digest
            {
                return false;
            }
            expected_prev = Some(entry.digest.as_str());
        }

        true
    }
}
