//! Contract call surface
//!
//! Exposes the ledger through the function names and result tokens callers
//! of the `model_trainer` contract expect:
//!
//! | Function | Args | Success | Failure |
//! |---|---|---|---|
//! | register-user | | `(ok true)` | `(err u102)` |
//! | contribute-compute | uint | `(ok true)` | `(err u101)`, `(err u103)` |
//! | stake-tokens | uint | `(ok true)` | `(err u101)`, `(err u105)` |
//! | claim-rewards | | `(ok u<amount>)` | `(err u101)` |
//! | update-platform-params | uint uint uint | `(ok true)` | `(err u100)` |
//! | update-reputation | principal uint | `(ok true)` | `(err u100)`, `(err u101)` |
//!
//! Read-only: `is-user-registered`, `get-contribution-count`,
//! `get-staked-amount`, `get-reputation`, `get-pending-rewards`,
//! `get-platform-params`.

pub mod call;
pub mod executor;
pub mod value;

pub use call::{CONTRACT_NAME, CallError, ContractCall};
pub use executor::{Block, ContractExecutor, Receipt, Transaction};
pub use value::{ClarityValue, LiteralError};
