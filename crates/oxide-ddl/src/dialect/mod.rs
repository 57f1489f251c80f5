//! Dialect configuration.
//!
//! A [`DialectConfig`] is a plain value describing everything the generator
//! needs to know about a target database: quoting, type tables, identity
//! syntax, how defaults and renames work, batch separators and the
//! procedural syntax of administrative blocks. It is passed by value into
//! [`SqlGenerator`](crate::SqlGenerator); there is no global dialect.
//!
//! Two presets ship with the crate, [`DialectConfig::oracle`] and
//! [`DialectConfig::sql_server`]. Custom dialects can be loaded from JSON.

mod quote;
mod types;

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::column::LogicalType;
use crate::error::{DdlError, Result};

/// Identifier quote characters. The closing character is escaped by
/// doubling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotePair {
    /// Opening quote.
    pub open: char,
    /// Closing quote.
    pub close: char,
}

/// What a string column without a length maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsetLength {
    /// The bounded type sized to its cap, e.g. `NVARCHAR2(2000)`.
    Cap,
    /// The oversized type, e.g. `nvarchar(max)`.
    Oversized,
}

/// Native type table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTable {
    /// Bounded unicode string type name.
    pub unicode_string: String,
    /// Bounded ANSI string type name.
    pub ansi_string: String,
    /// Largest length the bounded unicode type accepts.
    pub unicode_cap: u32,
    /// Largest length the bounded ANSI type accepts.
    pub ansi_cap: u32,
    /// Mapping for strings without a length.
    pub unset_length: UnsetLength,
    /// Unicode type used past the cap.
    pub oversized_unicode: String,
    /// ANSI type used past the cap.
    pub oversized_ansi: String,
    /// Length used for key columns without an explicit length.
    pub key_length: Option<u32>,
    /// Bounded binary type name.
    pub binary: String,
    /// Largest length the bounded binary type accepts.
    pub binary_cap: u32,
    /// Binary type used past the cap or without a length.
    pub oversized_binary: String,
    /// Fixed-size type for row-version concurrency tokens.
    pub row_version: String,
    /// Exact numeric type name.
    pub decimal: String,
    /// Precision used when none is given.
    pub default_precision: u8,
    /// Scale used when no precision is given.
    pub default_scale: u8,
    /// Fixed native names for every scalar logical type.
    pub scalars: BTreeMap<LogicalType, String>,
}

/// How identity columns are declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySyntax {
    /// `GENERATED BY DEFAULT ON NULL AS IDENTITY`.
    GeneratedByDefaultOnNull,
    /// `IDENTITY` / `IDENTITY(seed, increment)` column property.
    IdentityProperty,
}

/// How column defaults are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultConstraintStyle {
    /// Defaults are part of the column definition.
    Inline,
    /// Defaults are separate constraints with system-generated names.
    SystemNamed,
}

/// How objects are renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameSyntax {
    /// `EXEC sp_rename N'old', N'new'[, N'KIND']`.
    StoredProcedure,
    /// `ALTER ... RENAME TO ...` statements.
    AlterStatement,
}

/// How DROP INDEX names its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropIndexSyntax {
    /// `DROP INDEX "ix" ON "table"`.
    OnTable,
    /// `DROP INDEX "schema"."ix"`.
    SchemaQualified,
}

/// Procedural syntax for administrative blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminSyntax {
    /// `BEGIN ... EXECUTE IMMEDIATE ...; END;`
    PlSql,
    /// T-SQL `BEGIN ... END;` with logins and `KILL`.
    TransactSql,
}

/// How binary literals are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryLiteral {
    /// `HEXTORAW('0A0B')`.
    HexToRaw,
    /// `0x0A0B`.
    HexPrefix,
}

/// Literal rendering rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiteralStyle {
    /// Prefix for unicode string literals (e.g. `N`).
    pub unicode_prefix: Option<String>,
    /// Literal for `true`.
    pub boolean_true: String,
    /// Literal for `false`.
    pub boolean_false: String,
    /// Binary literal form.
    pub binary: BinaryLiteral,
    /// `chrono` format string for timestamps, quotes included. `%7f` is
    /// replaced by seven fractional-second digits.
    pub timestamp_format: String,
}

/// Everything the generator needs to know about a target dialect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialectConfig {
    /// Dialect name.
    pub name: String,
    /// Identifier quotes.
    pub quote: QuotePair,
    /// Statement terminator.
    pub statement_terminator: String,
    /// Batch separator, if the dialect's tools understand one.
    pub batch_separator: Option<String>,
    /// The implicit default schema.
    pub default_schema: Option<String>,
    /// Whether schemas can be created.
    pub supports_schemas: bool,
    /// Whether computed columns are supported.
    pub supports_computed_columns: bool,
    /// Native types.
    pub types: TypeTable,
    /// Identity declaration syntax.
    pub identity: IdentitySyntax,
    /// How defaults are stored.
    pub default_constraints: DefaultConstraintStyle,
    /// Rename idiom.
    pub renames: RenameSyntax,
    /// DROP INDEX form.
    pub drop_index: DropIndexSyntax,
    /// Whether indexes must be dropped before narrowing a column they cover.
    pub rebuild_indexes: bool,
    /// Whether unique constraints are rebuilt like indexes.
    pub rebuild_unique_constraints: bool,
    /// Whether explicit identity values need `IDENTITY_INSERT`.
    pub identity_insert: bool,
    /// Administrative block syntax.
    pub admin: AdminSyntax,
    /// Grants given to a new principal that names none.
    #[serde(default)]
    pub default_grants: Vec<String>,
    /// Literal rendering.
    pub literals: LiteralStyle,
}

fn scalar_table(entries: [(LogicalType, &str); 12]) -> BTreeMap<LogicalType, String> {
    entries
        .into_iter()
        .map(|(t, name)| (t, name.to_string()))
        .collect()
}

impl DialectConfig {
    /// Oracle preset.
    ///
    /// Identifiers in double quotes, `NVARCHAR2(2000)` / `VARCHAR2(4000)`
    /// for strings without a length, `RAW(8)` row versions and
    /// `GENERATED BY DEFAULT ON NULL AS IDENTITY` columns.
    #[must_use]
    pub fn oracle() -> Self {
        Self {
            name: "oracle".to_string(),
            quote: QuotePair {
                open: '"',
                close: '"',
            },
            statement_terminator: ";".to_string(),
            batch_separator: Some("GO".to_string()),
            default_schema: Some("dbo".to_string()),
            supports_schemas: false,
            supports_computed_columns: true,
            types: TypeTable {
                unicode_string: "NVARCHAR2".to_string(),
                ansi_string: "VARCHAR2".to_string(),
                unicode_cap: 2000,
                ansi_cap: 4000,
                unset_length: UnsetLength::Cap,
                oversized_unicode: "NCLOB".to_string(),
                oversized_ansi: "CLOB".to_string(),
                key_length: Some(450),
                binary: "RAW".to_string(),
                binary_cap: 2000,
                oversized_binary: "BLOB".to_string(),
                row_version: "RAW(8)".to_string(),
                decimal: "DECIMAL".to_string(),
                default_precision: 29,
                default_scale: 4,
                scalars: scalar_table([
                    (LogicalType::Boolean, "NUMBER(1)"),
                    (LogicalType::Byte, "NUMBER(3)"),
                    (LogicalType::Int16, "NUMBER(6)"),
                    (LogicalType::Int32, "NUMBER(10)"),
                    (LogicalType::Int64, "NUMBER(19)"),
                    (LogicalType::Single, "BINARY_FLOAT"),
                    (LogicalType::Double, "BINARY_DOUBLE"),
                    (LogicalType::DateTime, "TIMESTAMP(7)"),
                    (LogicalType::DateTimeOffset, "TIMESTAMP(7) WITH TIME ZONE"),
                    (LogicalType::Date, "DATE"),
                    (LogicalType::Time, "INTERVAL DAY(2) TO SECOND(6)"),
                    (LogicalType::Guid, "RAW(16)"),
                ]),
            },
            identity: IdentitySyntax::GeneratedByDefaultOnNull,
            default_constraints: DefaultConstraintStyle::SystemNamed,
            renames: RenameSyntax::StoredProcedure,
            drop_index: DropIndexSyntax::OnTable,
            rebuild_indexes: true,
            rebuild_unique_constraints: false,
            identity_insert: true,
            admin: AdminSyntax::PlSql,
            default_grants: vec!["DBA".to_string()],
            literals: LiteralStyle {
                unicode_prefix: Some("N".to_string()),
                boolean_true: "1".to_string(),
                boolean_false: "0".to_string(),
                binary: BinaryLiteral::HexToRaw,
                timestamp_format: "TIMESTAMP '%Y-%m-%d %H:%M:%S.%7f'".to_string(),
            },
        }
    }

    /// SQL Server preset.
    ///
    /// Bracket-quoted identifiers, `nvarchar(max)` for strings without a
    /// length, `rowversion` and the `IDENTITY` column property.
    #[must_use]
    pub fn sql_server() -> Self {
        Self {
            name: "sqlserver".to_string(),
            quote: QuotePair {
                open: '[',
                close: ']',
            },
            statement_terminator: ";".to_string(),
            batch_separator: Some("GO".to_string()),
            default_schema: Some("dbo".to_string()),
            supports_schemas: true,
            supports_computed_columns: true,
            types: TypeTable {
                unicode_string: "nvarchar".to_string(),
                ansi_string: "varchar".to_string(),
                unicode_cap: 4000,
                ansi_cap: 8000,
                unset_length: UnsetLength::Oversized,
                oversized_unicode: "nvarchar(max)".to_string(),
                oversized_ansi: "varchar(max)".to_string(),
                key_length: Some(450),
                binary: "varbinary".to_string(),
                binary_cap: 8000,
                oversized_binary: "varbinary(max)".to_string(),
                row_version: "rowversion".to_string(),
                decimal: "decimal".to_string(),
                default_precision: 18,
                default_scale: 2,
                scalars: scalar_table([
                    (LogicalType::Boolean, "bit"),
                    (LogicalType::Byte, "tinyint"),
                    (LogicalType::Int16, "smallint"),
                    (LogicalType::Int32, "int"),
                    (LogicalType::Int64, "bigint"),
                    (LogicalType::Single, "real"),
                    (LogicalType::Double, "float"),
                    (LogicalType::DateTime, "datetime2"),
                    (LogicalType::DateTimeOffset, "datetimeoffset"),
                    (LogicalType::Date, "date"),
                    (LogicalType::Time, "time"),
                    (LogicalType::Guid, "uniqueidentifier"),
                ]),
            },
            identity: IdentitySyntax::IdentityProperty,
            default_constraints: DefaultConstraintStyle::SystemNamed,
            renames: RenameSyntax::StoredProcedure,
            drop_index: DropIndexSyntax::OnTable,
            rebuild_indexes: true,
            rebuild_unique_constraints: true,
            identity_insert: true,
            admin: AdminSyntax::TransactSql,
            default_grants: vec!["db_owner".to_string()],
            literals: LiteralStyle {
                unicode_prefix: Some("N".to_string()),
                boolean_true: "CAST(1 AS bit)".to_string(),
                boolean_false: "CAST(0 AS bit)".to_string(),
                binary: BinaryLiteral::HexPrefix,
                timestamp_format: "'%Y-%m-%dT%H:%M:%S.%7f'".to_string(),
            },
        }
    }

    /// Returns a preset by name (`oracle`, `sqlserver` / `sql-server` /
    /// `mssql`).
    #[must_use]
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "oracle" => Some(Self::oracle()),
            "sqlserver" | "sql-server" | "mssql" => Some(Self::sql_server()),
            _ => None,
        }
    }

    /// Checks that the type table is total and the caps are usable.
    ///
    /// # Errors
    ///
    /// Returns [`DdlError::InvalidDialectConfig`] naming the first problem.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| {
            Err(DdlError::InvalidDialectConfig {
                dialect: self.name.clone(),
                message,
            })
        };

        if self.name.trim().is_empty() {
            return fail("dialect name is empty".to_string());
        }
        let missing: Vec<String> = LogicalType::SCALARS
            .iter()
            .filter(|t| !self.types.scalars.contains_key(t))
            .map(ToString::to_string)
            .collect();
        if !missing.is_empty() {
            return fail(format!(
                "no native type for scalar type(s): {}",
                missing.join(", ")
            ));
        }
        if self.types.unicode_cap == 0 || self.types.ansi_cap == 0 || self.types.binary_cap == 0 {
            return fail("type length caps must be greater than zero".to_string());
        }
        if self.batch_separator.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return fail("batch separator is blank".to_string());
        }
        let sample = NaiveDate::from_ymd_opt(2000, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        if sample.is_some_and(|ts| self.timestamp_literal(&ts).is_none()) {
            return fail(format!(
                "timestamp format '{}' cannot be rendered",
                self.literals.timestamp_format
            ));
        }
        Ok(())
    }

    /// Parses and validates a dialect from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the dialect is invalid.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a dialect from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the dialect is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Returns true if `schema` is the implicit default.
    #[must_use]
    pub fn is_default_schema(&self, schema: &str) -> bool {
        self.default_schema.as_deref() == Some(schema)
    }

    /// Returns the other spelling of the same schema: the default schema
    /// for `None`, and `None` for the default schema.
    #[must_use]
    pub fn schema_alias<'s>(&'s self, schema: Option<&'s str>) -> Option<Option<&'s str>> {
        match schema {
            None => self.default_schema.as_deref().map(Some),
            Some(s) if self.is_default_schema(s) => Some(None),
            Some(_) => None,
        }
    }

    /// Returns true if both references name the same schema.
    #[must_use]
    pub fn same_schema(&self, a: Option<&str>, b: Option<&str>) -> bool {
        a == b || self.schema_alias(a) == Some(b)
    }
}
