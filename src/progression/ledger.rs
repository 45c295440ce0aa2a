use std::collections::HashSet;

use juniper::GraphQLObject;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::progression::{
    errors::ProgressionError,
    mission::{Completions, Mission, MissionCategory, MissionCompletion},
};

/// Completion totals for one mission category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAggregate {
    pub category: MissionCategory,
    pub completed_xp: i32,
    pub total_xp: i32,
    pub completed_count: i32,
    pub total_count: i32,
    /// `completed_xp / total_xp` as a rounded percentage, 0 for an empty category.
    pub percent: i32,
}

/// Result of a completion attempt. `newly_completed` is false for the
/// idempotent case, where nothing needs to be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub completion: MissionCompletion,
    pub new_total_xp: i32,
    pub newly_completed: bool,
}

/// Mission catalog plus the completion rules applied over it.
///
/// The ledger never mutates the completion map it is handed; completion
/// produces a new record for the caller to persist.
#[derive(Debug, Clone)]
pub struct MissionLedger {
    missions: Vec<Mission>,
}

impl MissionLedger {
    pub fn new(missions: Vec<Mission>) -> Result<Self, ProgressionError> {
        let mut seen = HashSet::new();
        let mut catalog_xp: i32 = 0;
        for mission in missions.iter() {
            if mission.id.is_empty() {
                return Err(ProgressionError::invalid("mission id is empty"));
            }
            if !seen.insert(mission.id.as_str()) {
                return Err(ProgressionError::invalid(format!(
                    "duplicate mission id: {}",
                    mission.id
                )));
            }
            if mission.xp < 0 {
                return Err(ProgressionError::invalid(format!(
                    "mission {} has a negative reward: {}",
                    mission.id, mission.xp
                )));
            }
            catalog_xp = catalog_xp
                .checked_add(mission.xp)
                .ok_or_else(|| ProgressionError::invalid("catalog rewards overflow"))?;
        }
        Ok(Self { missions })
    }

    /// Missions in catalog order, optionally restricted to one category.
    pub fn list_missions(
        &self,
        category: Option<MissionCategory>,
    ) -> impl Iterator<Item = &Mission> + Clone + '_ {
        self.missions
            .iter()
            .filter(move |mission| category.is_none_or(|category| mission.category == category))
    }

    pub fn mission(&self, mission_id: &str) -> Option<&Mission> {
        self.missions.iter().find(|mission| mission.id == mission_id)
    }

    pub fn len(&self) -> usize {
        self.missions.len()
    }

    pub fn get_aggregate(
        &self,
        category: MissionCategory,
        completions: &Completions,
    ) -> CategoryAggregate {
        let mut aggregate = CategoryAggregate {
            category,
            completed_xp: 0,
            total_xp: 0,
            completed_count: 0,
            total_count: 0,
            percent: 0,
        };
        // the catalog total fits in i32, checked in `new`
        for mission in self.list_missions(Some(category)) {
            aggregate.total_xp += mission.xp;
            aggregate.total_count += 1;
            if is_completed(completions, &mission.id) {
                aggregate.completed_xp += mission.xp;
                aggregate.completed_count += 1;
            }
        }
        aggregate.percent = display_percent(aggregate.completed_xp, aggregate.total_xp);
        aggregate
    }

    pub fn complete_mission(
        &self,
        mission_id: &str,
        completions: &Completions,
        current_total_xp: i32,
    ) -> Result<CompletionOutcome, ProgressionError> {
        self.complete_mission_at(
            mission_id,
            completions,
            current_total_xp,
            OffsetDateTime::now_utc(),
        )
    }

    /// Same as `complete_mission` with an explicit completion instant.
    pub fn complete_mission_at(
        &self,
        mission_id: &str,
        completions: &Completions,
        current_total_xp: i32,
        now: OffsetDateTime,
    ) -> Result<CompletionOutcome, ProgressionError> {
        let mission = self
            .mission(mission_id)
            .ok_or_else(|| ProgressionError::UnknownMission(mission_id.to_string()))?;

        if let Some(existing) = completions.get(mission_id).filter(|c| c.completed) {
            return Ok(CompletionOutcome {
                completion: existing.clone(),
                new_total_xp: current_total_xp,
                newly_completed: false,
            });
        }

        if current_total_xp < 0 {
            return Err(ProgressionError::invalid(format!(
                "experience points must be non-negative, got {}",
                current_total_xp
            )));
        }
        let new_total_xp = current_total_xp
            .checked_add(mission.xp)
            .ok_or_else(|| ProgressionError::invalid("experience points overflow"))?;

        Ok(CompletionOutcome {
            completion: MissionCompletion {
                mission_id: mission.id.clone(),
                completed: true,
                completed_at: now,
                xp: mission.xp,
            },
            new_total_xp,
            newly_completed: true,
        })
    }

    /// Completed records across every category. Records for ids that are no
    /// longer in the catalog still count.
    pub fn overall_completed_count(completions: &Completions) -> i32 {
        completions.values().filter(|c| c.completed).count() as i32
    }

    /// Sum of the XP snapshots of completed records. Under serialized writes
    /// this equals the stored `xp_total`.
    pub fn completed_xp_sum(completions: &Completions) -> Result<i32, ProgressionError> {
        completions
            .values()
            .filter(|c| c.completed)
            .try_fold(0i32, |sum, c| sum.checked_add(c.xp))
            .ok_or_else(|| ProgressionError::invalid("experience points overflow"))
    }
}

fn is_completed(completions: &Completions, mission_id: &str) -> bool {
    completions.get(mission_id).is_some_and(|c| c.completed)
}

pub fn display_percent(completed_xp: i32, total_xp: i32) -> i32 {
    if total_xp <= 0 {
        return 0;
    }
    (completed_xp as f64 / total_xp as f64 * 100.0).round() as i32
}
