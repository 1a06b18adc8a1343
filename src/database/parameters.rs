//! Parameter Repository - the single row of platform parameters

use sqlx::{PgPool, Row};
use tracing::debug;

use crate::database::pool::{from_db_numeric, to_db_numeric};
use crate::ledger::PlatformParameters;

pub struct ParameterRepository {
    pool: PgPool,
}

impl ParameterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn save(&self, params: &PlatformParameters) -> Result<(), String> {
        sqlx::query(
            r#"
            INSERT INTO trainer.parameters (id, min_contribution, min_stake, reward_rate, updated_at)
            VALUES (1, $1::NUMERIC, $2::NUMERIC, $3::NUMERIC, NOW())
            ON CONFLICT (id) DO UPDATE SET
                min_contribution = EXCLUDED.min_contribution,
                min_stake = EXCLUDED.min_stake,
                reward_rate = EXCLUDED.reward_rate,
                updated_at = NOW()
            "#,
        )
        .bind(to_db_numeric(params.min_contribution))
        .bind(to_db_numeric(params.min_stake))
        .bind(to_db_numeric(params.reward_rate))
        .execute(&self.pool)
        .await
        .map_err(|e| format!("Failed to save platform parameters: {}", e))?;

        debug!("Platform parameters persisted");
        Ok(())
    }

    pub async fn load(&self) -> Result<Option<PlatformParameters>, String> {
        let row = sqlx::query(
            r#"
            SELECT min_contribution::TEXT AS min_contribution,
                   min_stake::TEXT AS min_stake,
                   reward_rate::TEXT AS reward_rate
            FROM trainer.parameters
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| format!("Failed to load platform parameters: {}", e))?;

        row.map(|r| {
            let numeric = |column: &str| -> Result<u64, String> {
                let text: String = r.get(column);
                from_db_numeric(&text, column)
            };
            Ok(PlatformParameters {
                min_contribution: numeric("min_contribution")?,
                min_stake: numeric("min_stake")?,
                reward_rate: numeric("reward_rate")?,
            })
        })
        .transpose()
    }
}
