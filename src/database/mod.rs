//! Database Macros System
//!
//! This module provides the query layer used by the PostgreSQL progress store.
//! Reads go through macros that work with any struct implementing the
//! `DatabaseResource` trait; the conditional writes that need a transaction are
//! written out in `crate::store::postgres`.
//!
//! ## Module Structure
//!
//! - `connection.rs` - Pool creation and migrations
//! - `traits.rs` - DatabaseResource trait definition
//! - `values.rs` - DatabaseValue enum for bound WHERE values
//! - `query_macros.rs` - Macros for finding and retrieving resources
//!
//! ## Quick Start
//!
//! ```rust
//! let params = vec![("user_id", user_id.into()), ("completed", true.into())];
//! let completions =
//!     find_all_resources_where_fields!(&pool, MissionCompletion, params).await?;
//!
//! let params = vec![("user_id", user_id.into())];
//! let stats = find_one_resource_where_fields!(&pool, UserStats, params).await?;
//! ```

pub mod connection;
pub mod query_macros;
pub mod traits;
pub mod values;
