use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    database::traits::DatabaseResource,
    models::user_stats::UserStats,
    progression::mission::MissionCompletion,
    store::{ProgressStore, StoreError, UserProgress},
};

// Inserts the stats row, or moves an existing one forward only if it still holds
// the total the caller read. Returns no row when the guard fails.
const UPSERT_STATS: &str = "INSERT INTO user_stats (user_id, xp_total, last_updated) \
     VALUES (CAST($1 AS VARCHAR), $2, $3) \
     ON CONFLICT (user_id) DO UPDATE \
     SET xp_total = EXCLUDED.xp_total, last_updated = EXCLUDED.last_updated \
     WHERE user_stats.xp_total = $4 \
     RETURNING *";

// A row left with completed = false may be completed; a completed one never changes.
const INSERT_COMPLETION: &str = "INSERT INTO mission_completions \
     (id, user_id, mission_id, completed, completed_at, xp, created_at) \
     VALUES (CAST($1 AS VARCHAR), CAST($2 AS VARCHAR), CAST($3 AS VARCHAR), $4, $5, $6, $7) \
     ON CONFLICT (user_id, mission_id) DO UPDATE \
     SET completed = EXCLUDED.completed, completed_at = EXCLUDED.completed_at, xp = EXCLUDED.xp \
     WHERE mission_completions.completed = FALSE";

pub struct PgProgressStore {
    pool: PgPool,
}

impl PgProgressStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ProgressStore for PgProgressStore {
    async fn fetch(&self, user_id: &str) -> Result<UserProgress, StoreError> {
        let stats = UserStats::find_by_user(&self.pool, user_id).await?;
        let completions = MissionCompletion::find_completed_by_user(&self.pool, user_id).await?;
        Ok(UserProgress { stats, completions })
    }

    async fn apply(
        &self,
        user_id: &str,
        expected_xp_total: i32,
        completion: &MissionCompletion,
        new_xp_total: i32,
    ) -> Result<UserStats, StoreError> {
        let now = OffsetDateTime::now_utc();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(UPSERT_STATS)
            .bind(user_id)
            .bind(new_xp_total)
            .bind(now)
            .bind(expected_xp_total)
            .fetch_optional(&mut *tx)
            .await?;
        let stats = match row {
            Some(row) => UserStats::from_row(&row)?,
            None => {
                tx.rollback().await?;
                tracing::warn!(
                    "[PgProgressStore::apply] Stats of {} moved past {}",
                    user_id,
                    expected_xp_total
                );
                return Err(StoreError::ConcurrencyViolation {
                    user_id: user_id.to_string(),
                });
            }
        };

        let inserted = sqlx::query(INSERT_COMPLETION)
            .bind(Uuid::new_v4().to_string())
            .bind(user_id)
            .bind(&completion.mission_id)
            .bind(completion.completed)
            .bind(completion.completed_at)
            .bind(completion.xp)
            .bind(now)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        if inserted == 0 {
            tx.rollback().await?;
            tracing::warn!(
                "[PgProgressStore::apply] Mission {} already recorded for {}",
                completion.mission_id,
                user_id
            );
            return Err(StoreError::ConcurrencyViolation {
                user_id: user_id.to_string(),
            });
        }

        tx.commit().await?;
        tracing::debug!(
            "[PgProgressStore::apply] {} completed {} ({} -> {} XP)",
            user_id,
            completion.mission_id,
            expected_xp_total,
            new_xp_total
        );
        Ok(stats)
    }
}
