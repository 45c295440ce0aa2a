use sqlx::{Error, PgPool, Row, postgres::PgRow};

use crate::{
    database::traits::DatabaseResource,
    find_all_resources_where_fields,
    progression::mission::{Completions, MissionCompletion},
};

impl MissionCompletion {
    /// Completed records of `user_id`, keyed by mission id.
    pub async fn find_completed_by_user(pool: &PgPool, user_id: &str) -> Result<Completions, Error> {
        let params = vec![("user_id", user_id.into()), ("completed", true.into())];
        let completions = match find_all_resources_where_fields!(pool, MissionCompletion, params).await
        {
            Ok(completions) => completions,
            Err(e) => {
                tracing::error!(
                    "[MissionCompletion::find_completed_by_user] Failed to get completions: {:?}",
                    e
                );
                return Err(e);
            }
        };
        Ok(completions
            .into_iter()
            .map(|completion| (completion.mission_id.clone(), completion))
            .collect())
    }
}

impl DatabaseResource for MissionCompletion {
    fn from_row(row: &PgRow) -> Result<Self, Error> {
        Ok(MissionCompletion {
            mission_id: row.try_get("mission_id")?,
            completed: row.try_get("completed")?,
            completed_at: row.try_get("completed_at")?,
            xp: row.try_get("xp")?,
        })
    }

    fn table_name() -> &'static str {
        "mission_completions"
    }
}
