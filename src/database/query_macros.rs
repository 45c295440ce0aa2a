//! Query Macros for Database Operations
//!
//! This module provides macros for finding and retrieving resources from the database.
//! All macros work with any struct that implements the `DatabaseResource` trait and
//! run against the pool passed as their first argument.

/// Finds all resources matching the specified field conditions.
///
/// # Arguments
/// * `$pool` - The `PgPool` to query
/// * `$resource` - The resource type (must implement DatabaseResource)
/// * `$params` - Vector of `(&str, DatabaseValue)` tuples for field conditions
///
/// # Returns
/// `Result<Vec<Resource>, Error>` - Vector of matching resources or database error
///
/// # Example
/// ```rust
/// let params = vec![("user_id", "uid-123".into())];
/// let completions = find_all_resources_where_fields!(&pool, MissionCompletion, params).await?;
/// ```
///
/// # Generated SQL
/// ```sql
/// SELECT * FROM mission_completions WHERE user_id = CAST($1 AS VARCHAR)
/// ```
#[macro_export]
macro_rules! find_all_resources_where_fields {
    ($pool:expr, $resource:ty, $params:expr) => {{
        use $crate::database::{traits::DatabaseResource, values::DatabaseValue};

        let pool: &sqlx::PgPool = $pool;
        let params: Vec<(&str, DatabaseValue)> = $params;
        async move {
            let table_name = <$resource as DatabaseResource>::table_name();

            let mut query = format!("SELECT * FROM {}", table_name);
            if !params.is_empty() {
                query.push_str(" WHERE ");
            }
            for (i, (field, value)) in params.iter().enumerate() {
                query.push_str(&format!("{} = {}", field, value.placeholder(i + 1)));
                if i < params.len() - 1 {
                    query.push_str(" AND ");
                }
            }

            let mut query = sqlx::query(&query);
            for (_, value) in params.iter() {
                query = query.bind(value);
            }

            match query.fetch_all(pool).await {
                Ok(rows) => rows
                    .into_iter()
                    .map(|row| <$resource as DatabaseResource>::from_row(&row))
                    .collect::<Result<Vec<$resource>, _>>(),
                Err(e) => Err(e),
            }
        }
    }};
}

/// Finds a single resource matching the specified field conditions.
///
/// This macro generates a SELECT query with WHERE clauses and LIMIT 1. A missing
/// row is reported as `Ok(None)` rather than `sqlx::Error::RowNotFound`.
///
/// # Arguments
/// * `$pool` - The `PgPool` to query
/// * `$resource` - The resource type (must implement DatabaseResource)
/// * `$params` - Vector of `(&str, DatabaseValue)` tuples for field conditions
///
/// # Returns
/// `Result<Option<Resource>, Error>` - The first matching resource, if any
///
/// # Example
/// ```rust
/// let params = vec![("user_id", "uid-123".into())];
/// let stats = find_one_resource_where_fields!(&pool, UserStats, params).await?;
/// ```
#[macro_export]
macro_rules! find_one_resource_where_fields {
    ($pool:expr, $resource:ty, $params:expr) => {{
        use $crate::database::{traits::DatabaseResource, values::DatabaseValue};

        let pool: &sqlx::PgPool = $pool;
        let params: Vec<(&str, DatabaseValue)> = $params;
        async move {
            let table_name = <$resource as DatabaseResource>::table_name();

            let mut query = format!("SELECT * FROM {}", table_name);
            if !params.is_empty() {
                query.push_str(" WHERE ");
            }
            for (i, (field, value)) in params.iter().enumerate() {
                query.push_str(&format!("{} = {}", field, value.placeholder(i + 1)));
                if i < params.len() - 1 {
                    query.push_str(" AND ");
                }
            }
            query.push_str(" LIMIT 1");

            let mut query = sqlx::query(&query);
            for (_, value) in params.iter() {
                query = query.bind(value);
            }

            match query.fetch_optional(pool).await {
                Ok(Some(row)) => <$resource as DatabaseResource>::from_row(&row).map(Some),
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            }
        }
    }};
}
