//! Literal values carried by operations.
//!
//! Values are dialect-neutral; the dialect decides how each one is written
//! as a SQL literal (see [`DialectConfig::literal`](crate::DialectConfig::literal)).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A literal value used in column defaults and seed data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlValue {
    /// NULL.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Integer.
    Integer(i64),
    /// Floating point.
    Float(f64),
    /// Character data.
    Text(String),
    /// Binary data.
    Bytes(Vec<u8>),
    /// Date and time without zone.
    Timestamp(NaiveDateTime),
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Default for a column: either a literal value or raw SQL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnDefault {
    /// A literal, rendered by the dialect.
    Value(SqlValue),
    /// A SQL expression emitted verbatim (e.g. `CURRENT_TIMESTAMP`).
    Sql(String),
}

impl ColumnDefault {
    /// Creates a literal default.
    #[must_use]
    pub fn value(v: impl Into<SqlValue>) -> Self {
        Self::Value(v.into())
    }

    /// Creates a raw SQL default.
    #[must_use]
    pub fn sql(expr: impl Into<String>) -> Self {
        Self::Sql(expr.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".to_string()));
    }

    #[test]
    fn test_default_from_literal() {
        assert_eq!(
            ColumnDefault::value(7),
            ColumnDefault::Value(SqlValue::Integer(7))
        );
    }

    #[test]
    fn test_value_json_shape() {
        let v: SqlValue = serde_json::from_str(r#"{"text":"John Snow"}"#).unwrap();
        assert_eq!(v, SqlValue::Text("John Snow".to_string()));
        let v: SqlValue = serde_json::from_str(r#""null""#).unwrap();
        assert_eq!(v, SqlValue::Null);
    }
}
