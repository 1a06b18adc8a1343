//! Participant Ledger
//!
//! Registration, compute contributions, stakes, reward claims and
//! owner-only governance for the training platform.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐     ┌──────────────────┐
//! │ AccountRegistry │────►│   LedgerState    │◄────│ OwnerGate        │
//! │ (who may act)   │     │ (one write lock) │     │ PlatformParams   │
//! └─────────────────┘     └──────────────────┘     │ ReputationBook   │
//!                           │      │      │        └──────────────────┘
//!                           ▼      ▼      ▼
//!               ComputeLedger  StakeLedger  RewardCalculator
//! ```
//!
//! ## Rules
//!
//! - Registration gates every other mutation (`NotRegistered`)
//! - Contributions and stakes must meet the current minimums
//! - Only the owner changes parameters or reputation (`OwnerOnly`)
//! - A rejected call never mutates anything

mod compute;
mod error;
mod params;
mod participant;
mod principal;
mod registry;
mod rewards;
mod stake;
mod trainer;

pub use compute::{ComputeLedger, ContributionRecord};
pub use error::LedgerError;
pub use params::{
    MAX_REWARD_RATE, OwnerGate, PlatformParameters, REWARD_RATE_DENOMINATOR, ReputationBook,
};
pub use participant::Participant;
pub use principal::{InvalidPrincipal, MAX_PRINCIPAL_LEN, Principal};
pub use registry::AccountRegistry;
pub use rewards::{ClaimState, RewardCalculator, RewardClaim};
pub use stake::StakeLedger;
pub use trainer::{LedgerState, ModelTrainer, PlatformStats};
