//! HTTP API for the model trainer ledger
//!
//! Provides REST APIs for:
//! - Contract calls (transactions, blocks, read-only queries)
//! - Platform monitoring (participants, parameters, stats, audit trail)
//! - Request guards (rate limiting, body size, headers, logging)

pub mod contract;
pub mod middleware;
pub mod platform;

pub use contract::{ContractApiState, create_router as create_contract_router};
pub use middleware::{
    GuardConfig, GuardState, RateLimiter, body_size_middleware, logging_middleware,
    rate_limit_middleware, security_headers_middleware,
};
pub use platform::{PlatformApiState, create_router as create_platform_router};
