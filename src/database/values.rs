//! Database Value Types
//!
//! This module provides the `DatabaseValue` enum used for the WHERE conditions built
//! by the query macros. Values travel to PostgreSQL as text and are cast back to the
//! column type inside the generated SQL, so one bind type covers every variant.

use sqlx::postgres::PgArgumentBuffer;
use sqlx::{Encode, Postgres, Type, encode::IsNull, error::BoxDynError};

/// A value bound into a generated query.
///
/// # Examples
///
/// ```rust
/// use crate::database::values::DatabaseValue;
///
/// let value: DatabaseValue = "uid-123".into();
/// let value: DatabaseValue = true.into();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseValue {
    /// Owned string value
    String(String),
    /// Boolean value stored as string
    Boolean(String),
}

impl DatabaseValue {
    /// SQL for the `index`-th bind parameter, cast to the column type.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            DatabaseValue::String(_) => format!("CAST(${} AS VARCHAR)", index),
            DatabaseValue::Boolean(_) => format!("CAST(${} AS BOOLEAN)", index),
        }
    }
}

impl<'q> Encode<'q, Postgres> for DatabaseValue {
    fn encode_by_ref(&self, buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        match self {
            DatabaseValue::String(s) => Encode::<Postgres>::encode_by_ref(s, buf),
            DatabaseValue::Boolean(b) => Encode::<Postgres>::encode_by_ref(b, buf),
        }
    }
}

impl Type<Postgres> for DatabaseValue {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        sqlx::postgres::PgTypeInfo::with_name("text")
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as Type<Postgres>>::compatible(ty)
    }
}

impl From<&str> for DatabaseValue {
    fn from(s: &str) -> Self {
        DatabaseValue::String(s.to_string())
    }
}

impl From<String> for DatabaseValue {
    fn from(s: String) -> Self {
        DatabaseValue::String(s)
    }
}

impl From<bool> for DatabaseValue {
    fn from(b: bool) -> Self {
        DatabaseValue::Boolean(b.to_string())
    }
}
