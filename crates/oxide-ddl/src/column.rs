//! Column definitions shared by column-bearing operations.
//!
//! A [`ColumnDefinition`] carries the logical type plus the facets the type
//! mapper needs (length, unicode, precision, row-version) and the clauses
//! the generator renders (nullability, default, computed expression,
//! value generation).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value::ColumnDefault;

/// Dialect-neutral column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    /// Character data; sized by `max_length` and `unicode`.
    String,
    /// Binary data; sized by `max_length` or `row_version`.
    Binary,
    /// Exact numeric; sized by `precision` and `scale`.
    Decimal,
    /// Boolean.
    Boolean,
    /// 8-bit unsigned integer.
    Byte,
    /// 16-bit integer.
    Int16,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Single-precision float.
    Single,
    /// Double-precision float.
    Double,
    /// Date and time.
    DateTime,
    /// Date and time with offset.
    DateTimeOffset,
    /// Date only.
    Date,
    /// Time of day / interval.
    Time,
    /// 128-bit unique identifier.
    Guid,
}

impl LogicalType {
    /// Types that map to a single fixed native name.
    pub const SCALARS: [Self; 12] = [
        Self::Boolean,
        Self::Byte,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Single,
        Self::Double,
        Self::DateTime,
        Self::DateTimeOffset,
        Self::Date,
        Self::Time,
        Self::Guid,
    ];

    /// Returns whether this type maps through the scalar table.
    #[must_use]
    pub fn is_scalar(self) -> bool {
        !matches!(self, Self::String | Self::Binary | Self::Decimal)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Binary => "binary",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Single => "single",
            Self::Double => "double",
            Self::DateTime => "datetime",
            Self::DateTimeOffset => "datetimeoffset",
            Self::Date => "date",
            Self::Time => "time",
            Self::Guid => "guid",
        };
        f.write_str(name)
    }
}

/// How the database generates values for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueGeneration {
    /// Identity / auto-increment column.
    Identity,
    /// Values come from a sequence using the hi-lo pattern.
    SequenceHiLo,
}

impl fmt::Display for ValueGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("identity"),
            Self::SequenceHiLo => f.write_str("sequence hi-lo"),
        }
    }
}

/// Annotation key for the identity seed.
pub const IDENTITY_SEED: &str = "identity.seed";

/// Annotation key for the identity increment.
pub const IDENTITY_INCREMENT: &str = "identity.increment";

/// Dialect-specific annotations the generator does not interpret itself.
///
/// Holds at most [`Annotations::MAX`] entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Annotations(BTreeMap<String, String>);

impl Annotations {
    /// Maximum number of entries.
    pub const MAX: usize = 16;

    /// Creates an empty annotation map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry. Returns `false` if the map is full.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if self.0.len() >= Self::MAX && !self.0.contains_key(&key) {
            return false;
        }
        self.0.insert(key, value.into());
        true
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for Annotations {
    type Error = String;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        if map.len() > Self::MAX {
            return Err(format!(
                "at most {} annotations are allowed, got {}",
                Self::MAX,
                map.len()
            ));
        }
        Ok(Self(map))
    }
}

impl From<Annotations> for BTreeMap<String, String> {
    fn from(annotations: Annotations) -> Self {
        annotations.0
    }
}

/// A complete column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name.
    pub name: String,
    /// Logical type.
    pub logical_type: LogicalType,
    /// Explicit native type; bypasses type mapping when set.
    #[serde(default)]
    pub column_type: Option<String>,
    /// Whether the column allows NULL.
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    /// Default value or expression.
    #[serde(default)]
    pub default: Option<ColumnDefault>,
    /// Computed-column expression.
    #[serde(default)]
    pub computed: Option<String>,
    /// Maximum length for string and binary columns.
    #[serde(default)]
    pub max_length: Option<u32>,
    /// Unicode (`true`) or ANSI (`false`) storage; unset means unicode.
    #[serde(default)]
    pub unicode: Option<bool>,
    /// Whether this is a row-version concurrency token.
    #[serde(default)]
    pub row_version: bool,
    /// Numeric precision.
    #[serde(default)]
    pub precision: Option<u8>,
    /// Numeric scale.
    #[serde(default)]
    pub scale: Option<u8>,
    /// Value generation strategy.
    #[serde(default)]
    pub value_generation: Option<ValueGeneration>,
    /// Dialect-specific annotations.
    #[serde(default, skip_serializing_if = "Annotations::is_empty")]
    pub annotations: Annotations,
}

const fn default_nullable() -> bool {
    true
}

impl ColumnDefinition {
    /// Creates a nullable column of the given logical type.
    #[must_use]
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            column_type: None,
            nullable: true,
            default: None,
            computed: None,
            max_length: None,
            unicode: None,
            row_version: false,
            precision: None,
            scale: None,
            value_generation: None,
            annotations: Annotations::new(),
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Sets an explicit native type.
    #[must_use]
    pub fn column_type(mut self, column_type: impl Into<String>) -> Self {
        self.column_type = Some(column_type.into());
        self
    }

    /// Sets the default.
    #[must_use]
    pub fn default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self
    }

    /// Makes this a computed column.
    #[must_use]
    pub fn computed(mut self, expr: impl Into<String>) -> Self {
        self.computed = Some(expr.into());
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub fn max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    /// Sets unicode (`true`) or ANSI (`false`) storage.
    #[must_use]
    pub fn unicode(mut self, unicode: bool) -> Self {
        self.unicode = Some(unicode);
        self
    }

    /// Marks the column as a row-version concurrency token.
    #[must_use]
    pub fn row_version(mut self) -> Self {
        self.row_version = true;
        self
    }

    /// Sets numeric precision and scale.
    #[must_use]
    pub fn precision(mut self, precision: u8, scale: Option<u8>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    /// Makes this an identity column.
    #[must_use]
    pub fn identity(mut self) -> Self {
        self.value_generation = Some(ValueGeneration::Identity);
        self
    }

    /// Sets the value generation strategy.
    #[must_use]
    pub fn value_generation(mut self, strategy: ValueGeneration) -> Self {
        self.value_generation = Some(strategy);
        self
    }

    /// Adds an annotation. Entries past [`Annotations::MAX`] are ignored.
    #[must_use]
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key, value);
        self
    }

    /// Returns whether the column is an identity column.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.value_generation == Some(ValueGeneration::Identity)
    }

    /// Returns whether the column stores unicode text.
    #[must_use]
    pub fn is_unicode(&self) -> bool {
        self.unicode.unwrap_or(true)
    }
}
