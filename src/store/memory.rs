use std::collections::HashMap;

use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    models::user_stats::UserStats,
    progression::mission::MissionCompletion,
    store::{ProgressStore, StoreError, UserProgress},
};

/// Process-local store. Progress is lost on restart; used for development
/// runs without PostgreSQL and in tests.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    users: Mutex<HashMap<String, UserProgress>>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn seed(&self, user_id: &str, progress: UserProgress) {
        self.users.lock().await.insert(user_id.to_string(), progress);
    }
}

impl ProgressStore for MemoryProgressStore {
    async fn fetch(&self, user_id: &str) -> Result<UserProgress, StoreError> {
        let users = self.users.lock().await;
        Ok(users
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserProgress::empty(user_id)))
    }

    async fn apply(
        &self,
        user_id: &str,
        expected_xp_total: i32,
        completion: &MissionCompletion,
        new_xp_total: i32,
    ) -> Result<UserStats, StoreError> {
        let mut users = self.users.lock().await;
        let progress = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserProgress::empty(user_id));

        let already_recorded = progress
            .completions
            .get(&completion.mission_id)
            .is_some_and(|existing| existing.completed);
        if progress.stats.xp_total != expected_xp_total || already_recorded {
            tracing::warn!(
                "[MemoryProgressStore::apply] Rejected stale write for {}: expected {}, stored {}",
                user_id,
                expected_xp_total,
                progress.stats.xp_total
            );
            return Err(StoreError::ConcurrencyViolation {
                user_id: user_id.to_string(),
            });
        }

        progress
            .completions
            .insert(completion.mission_id.clone(), completion.clone());
        progress.stats.xp_total = new_xp_total;
        progress.stats.last_updated = Some(OffsetDateTime::now_utc());
        Ok(progress.stats.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::ledger::tests::sample_ledger;

    #[tokio::test]
    async fn test_fetch_unknown_user_is_empty() {
        let store = MemoryProgressStore::new();
        let progress = store.fetch("uid-1").await.unwrap();
        assert_eq!(progress, UserProgress::empty("uid-1"));
    }

    #[tokio::test]
    async fn test_apply_then_fetch() {
        let store = MemoryProgressStore::new();
        let ledger = sample_ledger();
        let outcome = ledger
            .complete_mission("m1", &Default::default(), 0)
            .unwrap();

        let stats = store
            .apply("uid-1", 0, &outcome.completion, outcome.new_total_xp)
            .await
            .unwrap();
        assert_eq!(stats.xp_total, 50);
        assert!(stats.last_updated.is_some());

        let progress = store.fetch("uid-1").await.unwrap();
        assert_eq!(progress.stats.xp_total, 50);
        assert_eq!(progress.completions["m1"], outcome.completion);
    }

    #[tokio::test]
    async fn test_stale_base_is_rejected() {
        let store = MemoryProgressStore::new();
        let ledger = sample_ledger();

        // both writers read the same snapshot
        let snapshot = store.fetch("uid-1").await.unwrap();
        let a = ledger
            .complete_mission("m1", &snapshot.completions, snapshot.stats.xp_total)
            .unwrap();
        let b = ledger
            .complete_mission("m2", &snapshot.completions, snapshot.stats.xp_total)
            .unwrap();

        store
            .apply("uid-1", snapshot.stats.xp_total, &a.completion, a.new_total_xp)
            .await
            .unwrap();
        let result = store
            .apply("uid-1", snapshot.stats.xp_total, &b.completion, b.new_total_xp)
            .await;
        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyViolation { .. })
        ));

        let progress = store.fetch("uid-1").await.unwrap();
        assert_eq!(progress.stats.xp_total, 50);
        assert!(!progress.completions.contains_key("m2"));
    }

    #[tokio::test]
    async fn test_duplicate_completion_is_rejected() {
        let store = MemoryProgressStore::new();
        let ledger = sample_ledger();
        let outcome = ledger
            .complete_mission("m3", &Default::default(), 0)
            .unwrap();
        store
            .apply("uid-1", 0, &outcome.completion, 40)
            .await
            .unwrap();

        let result = store.apply("uid-1", 40, &outcome.completion, 80).await;
        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyViolation { .. })
        ));
        assert_eq!(store.fetch("uid-1").await.unwrap().stats.xp_total, 40);
    }
}
