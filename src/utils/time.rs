//! RFC 3339 (ISO-8601) serialization of `OffsetDateTime` for the stored record
//! shapes: `completedAt` on completion records and `lastUpdated` on stats.

use serde::{self, Deserialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Serializes an `OffsetDateTime` as an RFC 3339 string.
pub fn serialize_date_time<S>(date_time: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&date_time.format(&Rfc3339).map_err(serde::ser::Error::custom)?)
}

/// Deserializes an RFC 3339 string into an `OffsetDateTime`.
pub fn deserialize_date_time<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)
}

/// Serializes an `Option<OffsetDateTime>` into a string using RFC 3339 format,
/// or `null` when absent.
pub fn serialize_offset_date_time<S>(
    date_time: &Option<OffsetDateTime>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match date_time {
        Some(dt) => serialize_date_time(dt, serializer),
        None => serializer.serialize_none(),
    }
}

/// Deserializes an optional RFC 3339 string into an `Option<OffsetDateTime>`.
///
/// Returns `Ok(None)` if the input is null, or an error if the string does not
/// parse.
pub fn deserialize_offset_date_time<'de, D>(
    deserializer: D,
) -> Result<Option<OffsetDateTime>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) => Ok(Some(
            OffsetDateTime::parse(&s, &Rfc3339).map_err(serde::de::Error::custom)?,
        )),
        None => Ok(None),
    }
}
