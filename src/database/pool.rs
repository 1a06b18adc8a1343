//! Database Connection Pool using sqlx

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::database::parameters::ParameterRepository;
use crate::database::participants::ParticipantRepository;

pub struct DatabasePool {
    pool: PgPool,
    participants: ParticipantRepository,
    parameters: ParameterRepository,
}

impl DatabasePool {
    pub async fn new(connection_string: &str) -> Result<Self, String> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(connection_string)
            .await
            .map_err(|e| format!("Failed to connect to PostgreSQL: {}", e))?;

        info!("Connected to PostgreSQL");

        let participants = ParticipantRepository::new(pool.clone());
        let parameters = ParameterRepository::new(pool.clone());

        Ok(Self {
            pool,
            participants,
            parameters,
        })
    }

    pub async fn init_schema(&self) -> Result<(), String> {
        info!("Initializing database schema...");

        sqlx::query("CREATE SCHEMA IF NOT EXISTS trainer")
            .execute(&self.pool)
            .await
            .map_err(|e| format!("Failed to create trainer schema: {}", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trainer.participants (
                principal TEXT PRIMARY KEY,
                registered_at TIMESTAMPTZ NOT NULL,
                contribution_count NUMERIC(20, 0) NOT NULL DEFAULT 0,
                compute_units NUMERIC(20, 0) NOT NULL DEFAULT 0,
                claimed_compute_units NUMERIC(20, 0) NOT NULL DEFAULT 0,
                total_rewards_claimed NUMERIC(20, 0) NOT NULL DEFAULT 0,
                last_claim_at TIMESTAMPTZ,
                staked NUMERIC(20, 0) NOT NULL DEFAULT 0,
                reputation NUMERIC(20, 0) NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create participants table: {}", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trainer.parameters (
                id SMALLINT PRIMARY KEY CHECK (id = 1),
                min_contribution NUMERIC(20, 0) NOT NULL,
                min_stake NUMERIC(20, 0) NOT NULL,
                reward_rate NUMERIC(20, 0) NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to create parameters table: {}", e))?;

        // Earlier schemas used BIGINT, which cannot hold the upper half of u64
        sqlx::query(
            r#"
            ALTER TABLE trainer.participants
                ALTER COLUMN contribution_count TYPE NUMERIC(20, 0),
                ALTER COLUMN compute_units TYPE NUMERIC(20, 0),
                ALTER COLUMN claimed_compute_units TYPE NUMERIC(20, 0),
                ALTER COLUMN total_rewards_claimed TYPE NUMERIC(20, 0),
                ALTER COLUMN staked TYPE NUMERIC(20, 0),
                ALTER COLUMN reputation TYPE NUMERIC(20, 0)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to widen participant columns: {}", e))?;

        sqlx::query(
            r#"
            ALTER TABLE trainer.parameters
                ALTER COLUMN min_contribution TYPE NUMERIC(20, 0),
                ALTER COLUMN min_stake TYPE NUMERIC(20, 0),
                ALTER COLUMN reward_rate TYPE NUMERIC(20, 0)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to widen parameter columns: {}", e))?;

        info!("Database schema initialized");
        Ok(())
    }

    pub fn participants(&self) -> &ParticipantRepository {
        &self.participants
    }

    pub fn parameters(&self) -> &ParameterRepository {
        &self.parameters
    }
}

/// Counters span the full u64 range, so they live in NUMERIC(20, 0)
/// columns and cross the wire as decimal text
pub(crate) fn to_db_numeric(value: u64) -> String {
    value.to_string()
}

pub(crate) fn from_db_numeric(value: &str, column: &str) -> Result<u64, String> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| format!("{} holds out-of-range value {}", column, value))
}
