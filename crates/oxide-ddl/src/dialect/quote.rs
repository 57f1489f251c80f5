//! Identifier quoting and literal rendering.

use std::fmt::Write as _;

use chrono::{NaiveDateTime, Timelike};

use super::{BinaryLiteral, DialectConfig};
use crate::value::{ColumnDefault, SqlValue};

impl DialectConfig {
    /// Quotes an identifier, doubling any embedded closing quote.
    ///
    /// ```
    /// use oxide_ddl::DialectConfig;
    ///
    /// assert_eq!(DialectConfig::oracle().quote_identifier("Full Name"), "\"Full Name\"");
    /// assert_eq!(DialectConfig::sql_server().quote_identifier("a]b"), "[a]]b]");
    /// ```
    #[must_use]
    pub fn quote_identifier(&self, name: &str) -> String {
        let close = self.quote.close;
        let mut quoted = String::with_capacity(name.len() + 2);
        quoted.push(self.quote.open);
        for c in name.chars() {
            quoted.push(c);
            if c == close {
                quoted.push(close);
            }
        }
        quoted.push(close);
        quoted
    }

    /// Quotes a possibly schema-qualified object name.
    #[must_use]
    pub fn qualify(&self, name: &str, schema: Option<&str>) -> String {
        match schema {
            Some(schema) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(name)
            ),
            None => self.quote_identifier(name),
        }
    }

    /// Dotted, unquoted object path as catalog functions expect it
    /// (`dbo.People.Name`).
    #[must_use]
    pub fn object_path(parts: &[Option<&str>]) -> String {
        parts.iter().flatten().copied().collect::<Vec<_>>().join(".")
    }

    /// Renders a string literal, doubling embedded single quotes.
    ///
    /// Unicode literals carry the dialect's prefix (`N'...'`).
    #[must_use]
    pub fn string_literal(&self, value: &str, unicode: bool) -> String {
        let prefix = if unicode {
            self.literals.unicode_prefix.as_deref().unwrap_or("")
        } else {
            ""
        };
        format!("{prefix}'{}'", value.replace('\'', "''"))
    }

    /// Renders a value as a SQL literal.
    #[must_use]
    pub fn literal(&self, value: &SqlValue, unicode: bool) -> String {
        match value {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Boolean(true) => self.literals.boolean_true.clone(),
            SqlValue::Boolean(false) => self.literals.boolean_false.clone(),
            SqlValue::Integer(v) => v.to_string(),
            SqlValue::Float(v) => v.to_string(),
            SqlValue::Text(s) => self.string_literal(s, unicode),
            SqlValue::Bytes(bytes) => {
                let hex = bytes.iter().fold(String::new(), |mut out, b| {
                    let _ = write!(out, "{b:02X}");
                    out
                });
                match self.literals.binary {
                    BinaryLiteral::HexToRaw => format!("HEXTORAW('{hex}')"),
                    BinaryLiteral::HexPrefix => format!("0x{hex}"),
                }
            }
            SqlValue::Timestamp(ts) => self
                .timestamp_literal(ts)
                .unwrap_or_else(|| self.string_literal(&ts.to_string(), false)),
        }
    }

    /// Renders a timestamp with the dialect's format, or `None` when the
    /// format has a specifier chrono cannot render.
    #[must_use]
    pub fn timestamp_literal(&self, ts: &NaiveDateTime) -> Option<String> {
        let ticks = format!("{:07}", ts.nanosecond() / 100);
        let pattern = self.literals.timestamp_format.replace("%7f", &ticks);
        let mut out = String::new();
        write!(out, "{}", ts.format(&pattern)).ok()?;
        Some(out)
    }

    /// Renders a column default.
    #[must_use]
    pub fn default_sql(&self, default: &ColumnDefault, unicode: bool) -> String {
        match default {
            ColumnDefault::Value(value) => self.literal(value, unicode),
            ColumnDefault::Sql(expr) => expr.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_quote_doubles_closing_quote() {
        let oracle = DialectConfig::oracle();
        assert_eq!(oracle.quote_identifier("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(oracle.quote_identifier(""), "\"\"");
    }

    #[test]
    fn test_qualify() {
        let oracle = DialectConfig::oracle();
        assert_eq!(oracle.qualify("People", Some("dbo")), "\"dbo\".\"People\"");
        assert_eq!(oracle.qualify("People", None), "\"People\"");
        let mssql = DialectConfig::sql_server();
        assert_eq!(mssql.qualify("People", Some("dbo")), "[dbo].[People]");
    }

    #[test]
    fn test_object_path() {
        assert_eq!(
            DialectConfig::object_path(&[Some("dbo"), Some("People"), Some("Name")]),
            "dbo.People.Name"
        );
        assert_eq!(DialectConfig::object_path(&[None, Some("People")]), "People");
    }

    #[test]
    fn test_string_literals() {
        let oracle = DialectConfig::oracle();
        assert_eq!(oracle.string_literal("O'Brien", true), "N'O''Brien'");
        assert_eq!(oracle.string_literal("plain", false), "'plain'");
    }

    #[test]
    fn test_value_literals() {
        let oracle = DialectConfig::oracle();
        let mssql = DialectConfig::sql_server();
        assert_eq!(oracle.literal(&SqlValue::Null, true), "NULL");
        assert_eq!(oracle.literal(&SqlValue::Boolean(true), true), "1");
        assert_eq!(mssql.literal(&SqlValue::Boolean(false), true), "CAST(0 AS bit)");
        assert_eq!(oracle.literal(&SqlValue::Integer(-3), true), "-3");
        assert_eq!(oracle.literal(&SqlValue::Float(1.5), true), "1.5");
        assert_eq!(
            oracle.literal(&SqlValue::Bytes(vec![0x0a, 0xff]), true),
            "HEXTORAW('0AFF')"
        );
        assert_eq!(mssql.literal(&SqlValue::Bytes(vec![0x0a, 0xff]), true), "0x0AFF");
    }

    #[test]
    fn test_timestamp_literals() {
        let ts = NaiveDate::from_ymd_opt(2018, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        assert_eq!(
            DialectConfig::oracle().literal(&SqlValue::Timestamp(ts), true),
            "TIMESTAMP '2018-01-02 03:04:05.0000000'"
        );
        assert_eq!(
            DialectConfig::sql_server().literal(&SqlValue::Timestamp(ts), true),
            "'2018-01-02T03:04:05.0000000'"
        );
    }

    #[test]
    fn test_bad_timestamp_format_does_not_panic() {
        let ts = NaiveDate::from_ymd_opt(2018, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let mut oracle = DialectConfig::oracle();
        oracle.literals.timestamp_format = "TIMESTAMP '%Q'".to_string();
        assert_eq!(oracle.timestamp_literal(&ts), None);
        assert_eq!(
            oracle.literal(&SqlValue::Timestamp(ts), true),
            "'2018-01-02 03:04:05'"
        );
    }

    #[test]
    fn test_sql_default_is_verbatim() {
        assert_eq!(
            DialectConfig::oracle().default_sql(&ColumnDefault::sql("SYSDATE"), true),
            "SYSDATE"
        );
    }
}
