//! Fetch, apply, update.
//!
//! `ProgressService` is the only writer of user progress. Every completion reads
//! the current snapshot, runs the ledger over it, and hands the result to the
//! store's conditional write. A write that loses a race is recomputed from a
//! fresh snapshot, up to `max_retries` times.

use juniper::GraphQLObject;

use crate::{
    models::user_stats::UserStats,
    progression::{
        ledger::{CategoryAggregate, MissionLedger},
        level::{LevelInfo, LevelThresholds},
        mission::{MissionCategory, MissionCompletion},
    },
    store::{ProgressStore, StoreError, UserProgress},
};

/// Derived view of one user's progress.
#[derive(Debug, Clone, PartialEq, GraphQLObject)]
pub struct ProgressSummary {
    pub stats: UserStats,
    pub level: LevelInfo,
    /// Completed records, in catalog order first, then any retired missions.
    pub completions: Vec<MissionCompletion>,
    pub daily: CategoryAggregate,
    pub weekly: CategoryAggregate,
    pub overall_completed: i32,
}

#[derive(Debug, Clone, PartialEq, GraphQLObject)]
pub struct CompletionReceipt {
    pub completion: MissionCompletion,
    pub new_total_xp: i32,
    pub newly_completed: bool,
    pub level: LevelInfo,
}

pub struct ProgressService<S> {
    store: S,
    ledger: MissionLedger,
    thresholds: LevelThresholds,
    max_retries: u32,
}

impl<S: ProgressStore> ProgressService<S> {
    pub fn new(store: S, ledger: MissionLedger, thresholds: LevelThresholds, max_retries: u32) -> Self {
        Self {
            store,
            ledger,
            thresholds,
            max_retries,
        }
    }

    pub fn ledger(&self) -> &MissionLedger {
        &self.ledger
    }

    pub fn thresholds(&self) -> &LevelThresholds {
        &self.thresholds
    }

    pub async fn progress(&self, user_id: &str) -> Result<ProgressSummary, StoreError> {
        let progress = self.store.fetch(user_id).await?;
        self.audit(user_id, &progress);

        let level = self.thresholds.level_for(progress.stats.xp_total)?;
        let daily = self
            .ledger
            .get_aggregate(MissionCategory::Daily, &progress.completions);
        let weekly = self
            .ledger
            .get_aggregate(MissionCategory::Weekly, &progress.completions);
        let overall_completed = MissionLedger::overall_completed_count(&progress.completions);

        let mut completions: Vec<MissionCompletion> = progress
            .completions
            .values()
            .filter(|c| c.completed)
            .cloned()
            .collect();
        completions.sort_by_key(|c| {
            let position = self
                .ledger
                .list_missions(None)
                .position(|mission| mission.id == c.mission_id);
            (position.unwrap_or(usize::MAX), c.mission_id.clone())
        });

        Ok(ProgressSummary {
            stats: progress.stats,
            level,
            completions,
            daily,
            weekly,
            overall_completed,
        })
    }

    pub async fn complete_mission(
        &self,
        user_id: &str,
        mission_id: &str,
    ) -> Result<CompletionReceipt, StoreError> {
        let mut attempt = 0;
        loop {
            let progress = self.store.fetch(user_id).await?;
            let base = progress.stats.xp_total;
            let outcome = self
                .ledger
                .complete_mission(mission_id, &progress.completions, base)?;

            if !outcome.newly_completed {
                tracing::debug!(
                    "[ProgressService::complete_mission] {} already completed {}",
                    user_id,
                    mission_id
                );
                return self.receipt(outcome.completion, outcome.new_total_xp, false);
            }

            match self
                .store
                .apply(user_id, base, &outcome.completion, outcome.new_total_xp)
                .await
            {
                Ok(stats) => {
                    tracing::info!(
                        "[ProgressService::complete_mission] {} completed {} (+{} XP, total {})",
                        user_id,
                        mission_id,
                        outcome.completion.xp,
                        stats.xp_total
                    );
                    return self.receipt(outcome.completion, stats.xp_total, true);
                }
                Err(StoreError::ConcurrencyViolation { .. }) if attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "[ProgressService::complete_mission] Retrying {} for {} (attempt {})",
                        mission_id,
                        user_id,
                        attempt
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn receipt(
        &self,
        completion: MissionCompletion,
        new_total_xp: i32,
        newly_completed: bool,
    ) -> Result<CompletionReceipt, StoreError> {
        Ok(CompletionReceipt {
            completion,
            new_total_xp,
            newly_completed,
            level: self.thresholds.level_for(new_total_xp)?,
        })
    }

    // Stored totals drift from the records only if something wrote around the store.
    fn audit(&self, user_id: &str, progress: &UserProgress) {
        match MissionLedger::completed_xp_sum(&progress.completions) {
            Ok(sum) if sum != progress.stats.xp_total => tracing::warn!(
                "[ProgressService::audit] {} has {} XP stored but {} XP in completions",
                user_id,
                progress.stats.xp_total,
                sum
            ),
            Ok(_) => (),
            Err(e) => tracing::warn!("[ProgressService::audit] {}: {}", user_id, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::progression::{
        errors::ProgressionError,
        ledger::tests::{mission, sample_ledger},
    };
    use crate::store::MemoryProgressStore;

    fn service(store: Arc<MemoryProgressStore>) -> ProgressService<Arc<MemoryProgressStore>> {
        ProgressService::new(store, sample_ledger(), LevelThresholds::default(), 3)
    }

    async fn seed_total(store: &MemoryProgressStore, user_id: &str, xp_total: i32) {
        let mut progress = UserProgress::empty(user_id);
        progress.stats.xp_total = xp_total;
        store.seed(user_id, progress).await;
    }

    #[tokio::test]
    async fn test_sequential_completions_use_updated_total() {
        let store = Arc::new(MemoryProgressStore::new());
        seed_total(&store, "uid-1", 180).await;
        let service = service(store.clone());

        let a = service.complete_mission("uid-1", "m1").await.unwrap();
        let b = service.complete_mission("uid-1", "m2").await.unwrap();

        assert_eq!(a.new_total_xp, 230);
        assert_eq!(b.new_total_xp, 180 + 50 + 70);
        assert_eq!(b.level.level, 2);
        assert_eq!(store.fetch("uid-1").await.unwrap().stats.xp_total, 300);
    }

    #[tokio::test]
    async fn test_concurrent_completions_do_not_lose_updates() {
        let store = Arc::new(MemoryProgressStore::new());
        let service = Arc::new(service(store.clone()));

        let (a, b) = tokio::join!(
            service.complete_mission("uid-1", "m1"),
            service.complete_mission("uid-1", "m2")
        );
        assert!(a.unwrap().newly_completed);
        assert!(b.unwrap().newly_completed);

        let progress = store.fetch("uid-1").await.unwrap();
        assert_eq!(progress.stats.xp_total, 120);
        assert_eq!(progress.completions.len(), 2);
    }

    #[tokio::test]
    async fn test_parallel_tasks_do_not_lose_updates() {
        let store = Arc::new(MemoryProgressStore::new());
        let service = Arc::new(ProgressService::new(
            store.clone(),
            sample_ledger(),
            LevelThresholds::default(),
            8,
        ));

        let handles: Vec<_> = ["m1", "m2", "m3", "m4"]
            .into_iter()
            .map(|mission_id| {
                let service = service.clone();
                tokio::spawn(async move { service.complete_mission("uid-1", mission_id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let summary = service.progress("uid-1").await.unwrap();
        assert_eq!(summary.stats.xp_total, 50 + 70 + 40 + 30);
        assert_eq!(summary.overall_completed, 4);
    }

    #[tokio::test]
    async fn test_repeat_completion_is_noop() {
        let store = Arc::new(MemoryProgressStore::new());
        let service = service(store.clone());

        let first = service.complete_mission("uid-1", "m3").await.unwrap();
        let second = service.complete_mission("uid-1", "m3").await.unwrap();

        assert!(first.newly_completed);
        assert!(!second.newly_completed);
        assert_eq!(first.new_total_xp, second.new_total_xp);
        assert_eq!(first.completion, second.completion);
        assert_eq!(store.fetch("uid-1").await.unwrap().stats.xp_total, 40);
    }

    #[tokio::test]
    async fn test_unknown_mission_surfaces() {
        let service = service(Arc::new(MemoryProgressStore::new()));
        let result = service.complete_mission("uid-1", "nope").await;
        assert!(matches!(
            result,
            Err(StoreError::Progression(ProgressionError::UnknownMission(_)))
        ));
    }

    #[tokio::test]
    async fn test_completion_keeps_reward_snapshot() {
        let store = Arc::new(MemoryProgressStore::new());
        service(store.clone())
            .complete_mission("uid-1", "m1")
            .await
            .unwrap();

        // same store, catalog where m1 now pays 80
        let repriced = MissionLedger::new(vec![
            mission("m1", 80, MissionCategory::Daily),
            mission("m2", 70, MissionCategory::Daily),
        ])
        .unwrap();
        let service = ProgressService::new(store, repriced, LevelThresholds::default(), 3);

        let summary = service.progress("uid-1").await.unwrap();
        assert_eq!(summary.completions.len(), 1);
        assert_eq!(summary.completions[0].xp, 50);
        assert_eq!(summary.stats.xp_total, 50);
        assert_eq!(summary.daily.completed_xp, 80);
        assert_eq!(summary.daily.total_xp, 150);
    }

    #[tokio::test]
    async fn test_progress_summary() {
        let store = Arc::new(MemoryProgressStore::new());
        let service = service(store);
        service.complete_mission("uid-1", "m4").await.unwrap();
        service.complete_mission("uid-1", "m1").await.unwrap();

        let summary = service.progress("uid-1").await.unwrap();
        assert_eq!(summary.stats.xp_total, 80);
        assert_eq!(summary.level.level, 1);
        assert_eq!(summary.level.xp_to_next, 120);
        assert_eq!(summary.daily.completed_count, 1);
        assert_eq!(summary.weekly.completed_count, 1);
        assert_eq!(summary.overall_completed, 2);
        let ids: Vec<&str> = summary
            .completions
            .iter()
            .map(|c| c.mission_id.as_str())
            .collect();
        assert_eq!(ids, vec!["m1", "m4"]);
    }
}
