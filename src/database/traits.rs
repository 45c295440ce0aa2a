//! Database Resource Traits
//!
//! This module defines the `DatabaseResource` trait which must be implemented by any
//! struct that wants to use the database macros.

use sqlx::{Error, postgres::PgRow};

/// Trait that must be implemented by any struct used with database macros.
///
/// # Example Implementation
///
/// ```rust
/// use crate::database::traits::DatabaseResource;
/// use sqlx::{Error, Row, postgres::PgRow};
///
/// impl DatabaseResource for UserStats {
///     fn from_row(row: &PgRow) -> Result<Self, Error> {
///         Ok(UserStats {
///             user_id: row.try_get("user_id")?,
///             xp_total: row.try_get("xp_total")?,
///             last_updated: row.try_get("last_updated")?,
///         })
///     }
///
///     fn table_name() -> &'static str {
///         "user_stats"
///     }
/// }
/// ```
pub trait DatabaseResource {
    /// Converts a database row to the implementing struct.
    ///
    /// Use `row.try_get()` so that a schema mismatch surfaces as an `Error`
    /// instead of a panic.
    fn from_row(row: &PgRow) -> Result<Self, Error>
    where
        Self: Sized;

    /// Table the resource is stored in.
    fn table_name() -> &'static str;
}
