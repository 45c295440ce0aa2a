use std::collections::HashMap;

use juniper::{GraphQLEnum, GraphQLObject};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::utils::time::{deserialize_date_time, serialize_date_time};

/// Time scope of a mission.
///
/// The aliases accept catalogs exported from the mobile app, which keys its
/// categories as `hoje` and `semana`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, GraphQLEnum)]
#[serde(rename_all = "lowercase")]
pub enum MissionCategory {
    #[serde(alias = "hoje")]
    Daily,
    #[serde(alias = "semana")]
    Weekly,
}

/// A catalog entry. Defined by configuration, never by user data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, GraphQLObject)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub description: String,
    pub xp: i32,
    pub category: MissionCategory,
}

/// The durable fact that a user completed a mission.
///
/// `xp` is the reward at completion time and does not follow later catalog
/// edits. The mission id is the key of the record in the completion map, so
/// it is not part of the serialized shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct MissionCompletion {
    #[serde(skip)]
    pub mission_id: String,
    pub completed: bool,

    #[serde(
        serialize_with = "serialize_date_time",
        deserialize_with = "deserialize_date_time"
    )]
    pub completed_at: OffsetDateTime,

    pub xp: i32,
}

/// Completion records of a single user, keyed by mission id.
pub type Completions = HashMap<String, MissionCompletion>;

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_category_accepts_app_keys() {
        let daily: MissionCategory = serde_json::from_str("\"hoje\"").unwrap();
        let weekly: MissionCategory = serde_json::from_str("\"semana\"").unwrap();
        assert_eq!(daily, MissionCategory::Daily);
        assert_eq!(weekly, MissionCategory::Weekly);
        assert_eq!(
            serde_json::to_string(&MissionCategory::Weekly).unwrap(),
            "\"weekly\""
        );
    }

    #[test]
    fn test_completion_record_shape() {
        let completion = MissionCompletion {
            mission_id: "m1".to_string(),
            completed: true,
            completed_at: datetime!(2025-03-01 12:30:00 UTC),
            xp: 50,
        };
        let value = serde_json::to_value(&completion).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "completed": true,
                "completedAt": "2025-03-01T12:30:00Z",
                "xp": 50
            })
        );
    }

    #[test]
    fn test_completion_map_keeps_reward_snapshot() {
        let json = r#"{
            "m1": {"completed": true, "completedAt": "2025-03-01T12:30:00Z", "xp": 50},
            "m9": {"completed": false, "completedAt": "2025-03-02T08:00:00Z", "xp": 10}
        }"#;
        let completions: Completions = serde_json::from_str(json).unwrap();
        assert!(completions["m1"].mission_id.is_empty());
        assert_eq!(completions["m1"].xp, 50);
        assert!(!completions["m9"].completed);
    }
}
