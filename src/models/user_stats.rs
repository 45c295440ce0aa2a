use juniper::GraphQLObject;
use serde::{Deserialize, Serialize};
use sqlx::{Error, PgPool, Row, postgres::PgRow};
use time::OffsetDateTime;

use crate::{
    database::traits::DatabaseResource,
    find_one_resource_where_fields,
    utils::time::{deserialize_offset_date_time, serialize_offset_date_time},
};

/// Accumulated experience of one user. Serialized as `{xpTotal, lastUpdated}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, GraphQLObject)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(skip)]
    pub user_id: String,
    pub xp_total: i32,

    #[serde(
        default,
        serialize_with = "serialize_offset_date_time",
        deserialize_with = "deserialize_offset_date_time"
    )]
    pub last_updated: Option<OffsetDateTime>,
}

impl UserStats {
    /// Stats of a user that has not completed anything yet.
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            xp_total: 0,
            last_updated: None,
        }
    }

    pub async fn find_by_user(pool: &PgPool, user_id: &str) -> Result<Self, Error> {
        let params = vec![("user_id", user_id.into())];
        match find_one_resource_where_fields!(pool, UserStats, params).await {
            Ok(Some(stats)) => Ok(stats),
            Ok(None) => Ok(Self::new(user_id.to_string())),
            Err(e) => {
                tracing::error!("[UserStats::find_by_user] Failed to get stats: {:?}", e);
                Err(e)
            }
        }
    }
}

impl DatabaseResource for UserStats {
    fn from_row(row: &PgRow) -> Result<Self, Error> {
        Ok(UserStats {
            user_id: row.try_get("user_id")?,
            xp_total: row.try_get("xp_total")?,
            last_updated: row.try_get("last_updated")?,
        })
    }

    fn table_name() -> &'static str {
        "user_stats"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_stats_record_shape() {
        let stats = UserStats {
            user_id: "uid-1".to_string(),
            xp_total: 120,
            last_updated: Some(datetime!(2025-03-01 10:00:00 UTC)),
        };
        assert_eq!(
            serde_json::to_value(&stats).unwrap(),
            serde_json::json!({"xpTotal": 120, "lastUpdated": "2025-03-01T10:00:00Z"})
        );

        let fresh: UserStats = serde_json::from_str(r#"{"xpTotal": 0}"#).unwrap();
        assert_eq!(fresh, UserStats::new(String::new()));
    }
}
