//! Persistence boundary for user progress.
//!
//! A store hands out a snapshot of one user's stats and completions, and applies
//! a completion together with the new XP total as a single conditional write.
//! The write is rejected with `StoreError::ConcurrencyViolation` when the stored
//! total no longer matches the snapshot it was computed from, or when the
//! mission was recorded in the meantime. Stale bases therefore never overwrite
//! an earlier increment.

use std::{future::Future, sync::Arc};

use thiserror::Error;

use crate::{
    models::user_stats::UserStats,
    progression::{
        errors::ProgressionError,
        mission::{Completions, MissionCompletion},
    },
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryProgressStore;
pub use postgres::PgProgressStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Progress of user {user_id} changed concurrently")]
    ConcurrencyViolation { user_id: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Progression(#[from] ProgressionError),
}

/// Everything the engine needs about one user, read in one fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProgress {
    pub stats: UserStats,
    pub completions: Completions,
}

impl UserProgress {
    pub fn empty(user_id: &str) -> Self {
        Self {
            stats: UserStats::new(user_id.to_string()),
            completions: Completions::new(),
        }
    }
}

pub trait ProgressStore: Send + Sync {
    fn fetch(&self, user_id: &str) -> impl Future<Output = Result<UserProgress, StoreError>> + Send;

    /// Records `completion` and sets the total to `new_xp_total`, provided the
    /// stored total still equals `expected_xp_total`. Writes nothing otherwise.
    fn apply(
        &self,
        user_id: &str,
        expected_xp_total: i32,
        completion: &MissionCompletion,
        new_xp_total: i32,
    ) -> impl Future<Output = Result<UserStats, StoreError>> + Send;
}

impl<S: ProgressStore> ProgressStore for Arc<S> {
    fn fetch(&self, user_id: &str) -> impl Future<Output = Result<UserProgress, StoreError>> + Send {
        self.as_ref().fetch(user_id)
    }

    fn apply(
        &self,
        user_id: &str,
        expected_xp_total: i32,
        completion: &MissionCompletion,
        new_xp_total: i32,
    ) -> impl Future<Output = Result<UserStats, StoreError>> + Send {
        self.as_ref()
            .apply(user_id, expected_xp_total, completion, new_xp_total)
    }
}

/// Store selected by configuration.
pub enum Store {
    Postgres(PgProgressStore),
    Memory(MemoryProgressStore),
}

impl ProgressStore for Store {
    async fn fetch(&self, user_id: &str) -> Result<UserProgress, StoreError> {
        match self {
            Store::Postgres(store) => store.fetch(user_id).await,
            Store::Memory(store) => store.fetch(user_id).await,
        }
    }

    async fn apply(
        &self,
        user_id: &str,
        expected_xp_total: i32,
        completion: &MissionCompletion,
        new_xp_total: i32,
    ) -> Result<UserStats, StoreError> {
        match self {
            Store::Postgres(store) => {
                store
                    .apply(user_id, expected_xp_total, completion, new_xp_total)
                    .await
            }
            Store::Memory(store) => {
                store
                    .apply(user_id, expected_xp_total, completion, new_xp_total)
                    .await
            }
        }
    }
}
