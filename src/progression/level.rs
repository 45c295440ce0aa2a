//! Experience points to level mapping.
//!
//! Levels are defined by an ascending threshold table whose first entry is 0.
//! The level for a total is the number of thresholds at or below it, so level 1
//! applies from 0 XP and the last level is reached at the last threshold.

use juniper::GraphQLObject;
use serde::{Deserialize, Serialize};

use crate::progression::errors::ProgressionError;

/// Threshold table used by the mobile app before levels became configurable.
pub const DEFAULT_THRESHOLDS: [i32; 5] = [0, 200, 600, 1200, 2000];

/// Derived level state for an XP total. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    pub level: i32,
    /// Fraction of the current band already earned, in `[0, 1]`.
    pub progress: f64,
    pub xp_to_next: i32,
    pub maxed: bool,
    pub current_threshold: i32,
    /// Equals the last threshold once maxed.
    pub next_threshold: i32,
}

/// Computes the level, band progress and remaining XP for `xp`.
///
/// Fails with `InvalidInput` when `xp` is negative or the thresholds are empty,
/// unsorted or do not start at 0.
pub fn compute_level(xp: i32, thresholds: &[i32]) -> Result<LevelInfo, ProgressionError> {
    if xp < 0 {
        return Err(ProgressionError::invalid(format!(
            "experience points must be non-negative, got {}",
            xp
        )));
    }
    validate_thresholds(thresholds)?;

    // thresholds are sorted, so the entries <= xp form a prefix
    let level = thresholds.partition_point(|threshold| *threshold <= xp);
    let last = thresholds[thresholds.len() - 1];
    let maxed = level == thresholds.len();
    let current_threshold = thresholds[level - 1];
    let next_threshold = thresholds.get(level).copied().unwrap_or(last);

    let progress = if maxed {
        1.0
    } else {
        let range = match next_threshold - current_threshold {
            0 => 1,
            range => range,
        };
        ((xp - current_threshold) as f64 / range as f64).clamp(0.0, 1.0)
    };
    let xp_to_next = if maxed {
        0
    } else {
        (next_threshold - xp).max(0)
    };

    Ok(LevelInfo {
        level: level as i32,
        progress,
        xp_to_next,
        maxed,
        current_threshold,
        next_threshold,
    })
}

fn validate_thresholds(thresholds: &[i32]) -> Result<(), ProgressionError> {
    match thresholds.first() {
        None => return Err(ProgressionError::invalid("level thresholds are empty")),
        Some(first) if *first != 0 => {
            return Err(ProgressionError::invalid(format!(
                "first level threshold must be 0, got {}",
                first
            )));
        }
        Some(_) => (),
    }
    if let Some(pair) = thresholds.windows(2).find(|pair| pair[0] > pair[1]) {
        return Err(ProgressionError::invalid(format!(
            "level thresholds are not ascending: {} comes before {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// A threshold table validated once, at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<i32>", into = "Vec<i32>")]
pub struct LevelThresholds(Vec<i32>);

impl LevelThresholds {
    pub fn new(thresholds: Vec<i32>) -> Result<Self, ProgressionError> {
        validate_thresholds(&thresholds)?;
        Ok(Self(thresholds))
    }

    pub fn level_for(&self, xp: i32) -> Result<LevelInfo, ProgressionError> {
        compute_level(xp, &self.0)
    }

    pub fn max_level(&self) -> i32 {
        self.0.len() as i32
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLDS.to_vec())
    }
}

impl TryFrom<Vec<i32>> for LevelThresholds {
    type Error = ProgressionError;

    fn try_from(thresholds: Vec<i32>) -> Result<Self, Self::Error> {
        Self::new(thresholds)
    }
}

impl From<LevelThresholds> for Vec<i32> {
    fn from(thresholds: LevelThresholds) -> Self {
        thresholds.0
    }
}
