//! PostgreSQL Database Module
//!
//! Optional snapshot store for participants and platform parameters.

pub mod parameters;
pub mod participants;
pub mod pool;

pub use parameters::ParameterRepository;
pub use participants::ParticipantRepository;
pub use pool::DatabasePool;
