//! Model Trainer Ledger
//!
//! Ledger for a decentralized AI-training platform: participants register,
//! contribute compute, stake tokens and claim rewards proportional to the
//! compute they contributed. The platform owner tunes the parameters and
//! adjusts reputation.
//!
//! ## Module Structure
//!
//! ```text
//! src/
//! ├── lib.rs         - Crate root with re-exports
//! ├── main.rs        - Server entrypoint
//! ├── config.rs      - Configuration management
//! ├── audit.rs       - Hash-chained receipt log
//! ├── ledger/        - Core ledger state
//! │   ├── principal.rs   - Validated account identities
//! │   ├── error.rs       - Numeric error codes
//! │   ├── registry.rs    - Account registration
//! │   ├── compute.rs     - Compute contributions
//! │   ├── stake.rs       - Token staking
//! │   ├── rewards.rs     - Reward calculation & claims
//! │   ├── params.rs      - Owner gate, parameters, reputation
//! │   ├── participant.rs - Per-account snapshot
//! │   └── trainer.rs     - Serialized access & write-through
//! ├── contract/      - Call surface
//! │   ├── value.rs    - Value literals & rendering
//! │   ├── call.rs     - Function decoding
//! │   └── executor.rs - Transactions, blocks, receipts
//! ├── api/           - HTTP API endpoints
//! │   ├── contract.rs   - Calls, blocks, read-only queries
//! │   ├── platform.rs   - Participants, params, stats, audit
//! │   └── middleware.rs - Rate limiting, body size, headers, logging
//! └── database/      - PostgreSQL persistence
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod contract;
pub mod database;
pub mod ledger;

// Re-export main types for convenience
pub use audit::{AuditEntry, AuditLog};
pub use config::TrainerConfig;
pub use contract::{
    Block, CallError, ClarityValue, ContractCall, ContractExecutor, Receipt, Transaction,
};
pub use database::pool::DatabasePool;
pub use ledger::{
    LedgerError, ModelTrainer, Participant, PlatformParameters, PlatformStats, Principal,
};
