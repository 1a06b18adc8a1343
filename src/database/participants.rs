//! Participant Repository - PostgreSQL operations for participants using sqlx

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::pool::{from_db_numeric, to_db_numeric};
use crate::ledger::{Participant, Principal};

pub struct ParticipantRepository {
    pool: PgPool,
}

impl ParticipantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, participant: &Participant) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO trainer.participants
            (principal, registered_at, contribution_count, compute_units,
             claimed_compute_units, total_rewards_claimed, last_claim_at,
             staked, reputation)
            VALUES ($1, $2, $3::NUMERIC, $4::NUMERIC, $5::NUMERIC, $6::NUMERIC, $7,
                    $8::NUMERIC, $9::NUMERIC)
            ON CONFLICT (principal) DO UPDATE SET
                contribution_count = EXCLUDED.contribution_count,
                compute_units = EXCLUDED.compute_units,
                claimed_compute_units = EXCLUDED.claimed_compute_units,
                total_rewards_claimed = EXCLUDED.total_rewards_claimed,
                last_claim_at = EXCLUDED.last_claim_at,
                staked = EXCLUDED.staked,
                reputation = EXCLUDED.reputation
            "#,
        )
        .bind(participant.principal.as_str())
        .bind(participant.registered_at)
        .bind(to_db_numeric(participant.contribution_count))
        .bind(to_db_numeric(participant.compute_units))
        .bind(to_db_numeric(participant.claimed_compute_units))
        .bind(to_db_numeric(participant.total_rewards_claimed))
        .bind(participant.last_claim_at)
        .bind(to_db_numeric(participant.staked))
        .bind(to_db_numeric(participant.reputation))
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to upsert participant: {}", e))?;

        debug!(participant = %participant.principal, "Participant persisted");
        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<Participant>, String> {
        let rows = sqlx::query(
            r#"
            SELECT principal, registered_at,
                   contribution_count::TEXT AS contribution_count,
                   compute_units::TEXT AS compute_units,
                   claimed_compute_units::TEXT AS claimed_compute_units,
                   total_rewards_claimed::TEXT AS total_rewards_claimed,
                   last_claim_at,
                   staked::TEXT AS staked,
                   reputation::TEXT AS reputation
            FROM trainer.participants
            ORDER BY principal ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| format!("Failed to load participants: {}", e))?;

        rows.iter().map(Self::from_row).collect()
    }

    fn from_row(row: &sqlx::postgres::PgRow) -> Result<Participant, String> {
        let principal: String = row.get("principal");
        let numeric = |column: &str| -> Result<u64, String> {
            let text: String = row.get(column);
            from_db_numeric(&text, column)
        };

        Ok(Participant {
            principal: Principal::new(principal).map_err(|e| e.to_string())?,
            registered_at: row.get("registered_at"),
            contribution_count: numeric("contribution_count")?,
            compute_units: numeric("compute_units")?,
            claimed_compute_units: numeric("claimed_compute_units")?,
            total_rewards_claimed: numeric("total_rewards_claimed")?,
            last_claim_at: row.get("last_claim_at"),
            staked: numeric("staked")?,
            reputation: numeric("reputation")?,
        })
    }
}
