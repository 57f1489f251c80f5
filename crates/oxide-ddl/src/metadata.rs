//! Minimal schema metadata used for dependency lookups.
//!
//! The generator never introspects a live database. Whatever it needs to
//! know about existing indexes, unique constraints and identity columns is
//! supplied through a [`MetadataView`].

use serde::{Deserialize, Serialize};

/// An index as it exists in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMetadata {
    /// Index name.
    pub name: String,
    /// Key columns, in order.
    pub columns: Vec<String>,
    /// Whether this is a UNIQUE index.
    #[serde(default)]
    pub unique: bool,
    /// Filter predicate for a partial index.
    #[serde(default)]
    pub filter: Option<String>,
}

impl IndexMetadata {
    /// Creates a non-unique index.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            columns,
            unique: false,
            filter: None,
        }
    }

    /// Makes this a unique index.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Returns whether `column` is one of the key columns.
    #[must_use]
    pub fn covers(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

/// A named UNIQUE constraint (distinct from a unique index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueConstraintMetadata {
    /// Constraint name.
    pub name: String,
    /// Constrained columns, in order.
    pub columns: Vec<String>,
}

/// A column as it exists in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Whether the column is an identity column.
    #[serde(default)]
    pub identity: bool,
    /// Whether the column has a default constraint; `None` when unknown.
    #[serde(default)]
    pub has_default: Option<bool>,
}

/// Everything known about one table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TableMetadata {
    /// Table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Known columns.
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
    /// Primary key columns.
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Indexes on the table.
    #[serde(default)]
    pub indexes: Vec<IndexMetadata>,
    /// Unique constraints on the table.
    #[serde(default)]
    pub unique_constraints: Vec<UniqueConstraintMetadata>,
}

impl TableMetadata {
    /// Creates metadata for a table with nothing on it.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Adds a column.
    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnMetadata {
            name: name.into(),
            identity: false,
            has_default: None,
        });
        self
    }

    /// Adds a column whose default constraint state is known.
    #[must_use]
    pub fn column_with_default(mut self, name: impl Into<String>, has_default: bool) -> Self {
        self.columns.push(ColumnMetadata {
            name: name.into(),
            identity: false,
            has_default: Some(has_default),
        });
        self
    }

    /// Adds an identity column.
    #[must_use]
    pub fn identity_column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnMetadata {
            name: name.into(),
            identity: true,
            has_default: Some(false),
        });
        self
    }

    /// Sets the primary key.
    #[must_use]
    pub fn primary_key(mut self, columns: Vec<String>) -> Self {
        self.primary_key = columns;
        self
    }

    /// Adds an index.
    #[must_use]
    pub fn index(mut self, index: IndexMetadata) -> Self {
        self.indexes.push(index);
        self
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique_constraint(mut self, name: impl Into<String>, columns: Vec<String>) -> Self {
        self.unique_constraints.push(UniqueConstraintMetadata {
            name: name.into(),
            columns,
        });
        self
    }

    /// Returns whether `column` is part of any key: primary key, index or
    /// unique constraint.
    #[must_use]
    pub fn is_key_column(&self, column: &str) -> bool {
        self.primary_key.iter().any(|c| c == column)
            || self.indexes.iter().any(|i| i.covers(column))
            || self
                .unique_constraints
                .iter()
                .any(|u| u.columns.iter().any(|c| c == column))
    }

    /// Returns whether `column` is known to be an identity column.
    #[must_use]
    pub fn is_identity_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c.name == column && c.identity)
    }

    /// Returns whether `column` has a default constraint, if known.
    #[must_use]
    pub fn has_default(&self, column: &str) -> Option<bool> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .and_then(|c| c.has_default)
    }
}

/// Read-only lookup of table metadata.
pub trait MetadataView {
    /// Returns the metadata for a table, if known.
    fn table(&self, name: &str, schema: Option<&str>) -> Option<&TableMetadata>;

    /// Returns the table that owns the index `name`, if known.
    fn index_owner(&self, _name: &str, _schema: Option<&str>) -> Option<&TableMetadata> {
        None
    }

    /// Returns the indexes whose key list includes `column`.
    fn indexes_on(&self, table: &str, schema: Option<&str>, column: &str) -> Vec<&IndexMetadata> {
        self.table(table, schema)
            .map(|t| t.indexes.iter().filter(|i| i.covers(column)).collect())
            .unwrap_or_default()
    }

    /// Returns the unique constraints that include `column`.
    fn unique_constraints_on(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &str,
    ) -> Vec<&UniqueConstraintMetadata> {
        self.table(table, schema)
            .map(|t| {
                t.unique_constraints
                    .iter()
                    .filter(|u| u.columns.iter().any(|c| c == column))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// In-memory schema metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMetadata {
    /// Known tables.
    #[serde(default)]
    pub tables: Vec<TableMetadata>,
}

impl SchemaMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table.
    #[must_use]
    pub fn with_table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    /// Parses metadata from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe schema metadata.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MetadataView for SchemaMetadata {
    fn table(&self, name: &str, schema: Option<&str>) -> Option<&TableMetadata> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.schema.as_deref() == schema)
    }

    fn index_owner(&self, name: &str, schema: Option<&str>) -> Option<&TableMetadata> {
        self.tables.iter().find(|t| {
            t.schema.as_deref() == schema && t.indexes.iter().any(|i| i.name == name)
        })
    }
}

/// A view that finds tables recorded under the default schema when no
/// schema is given, and the other way round.
pub struct DefaultSchemaView<'a> {
    inner: &'a dyn MetadataView,
    default_schema: Option<&'a str>,
}

impl<'a> DefaultSchemaView<'a> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: &'a dyn MetadataView, default_schema: Option<&'a str>) -> Self {
        Self {
            inner,
            default_schema,
        }
    }

    fn alias(&self, schema: Option<&str>) -> Option<Option<&'a str>> {
        match (schema, self.default_schema) {
            (None, Some(default)) => Some(Some(default)),
            (Some(s), Some(default)) if s == default => Some(None),
            _ => None,
        }
    }
}

impl MetadataView for DefaultSchemaView<'_> {
    fn table(&self, name: &str, schema: Option<&str>) -> Option<&TableMetadata> {
        self.inner
            .table(name, schema)
            .or_else(|| self.alias(schema).and_then(|s| self.inner.table(name, s)))
    }

    fn index_owner(&self, name: &str, schema: Option<&str>) -> Option<&TableMetadata> {
        self.inner
            .index_owner(name, schema)
            .or_else(|| self.alias(schema).and_then(|s| self.inner.index_owner(name, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schema_view() {
        let meta = SchemaMetadata::new()
            .with_table(
                TableMetadata::new("Person")
                    .schema("dbo")
                    .index(IndexMetadata::new("IX_Person_Name", vec!["Name".to_string()])),
            )
            .with_table(TableMetadata::new("Audit"));
        let view = DefaultSchemaView::new(&meta, Some("dbo"));

        assert!(meta.table("Person", None).is_none());
        assert!(view.table("Person", None).is_some());
        assert!(view.table("Audit", Some("dbo")).is_some());
        assert!(view.table("Audit", Some("hr")).is_none());
        assert_eq!(view.indexes_on("Person", None, "Name").len(), 1);
        assert_eq!(view.index_owner("IX_Person_Name", None).unwrap().name, "Person");
        assert!(view.index_owner("IX_Missing", None).is_none());
    }

    fn people() -> SchemaMetadata {
        SchemaMetadata::new().with_table(
            TableMetadata::new("Person")
                .identity_column("Id")
                .column("FirstName")
                .column("LastName")
                .primary_key(vec!["Id".to_string()])
                .index(IndexMetadata::new(
                    "IX_Person_FirstName_LastName",
                    vec!["FirstName".to_string(), "LastName".to_string()],
                ))
                .unique_constraint("AK_Person_Email", vec!["Email".to_string()]),
        )
    }

    #[test]
    fn test_indexes_on_column() {
        let meta = people();
        let found = meta.indexes_on("Person", None, "LastName");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "IX_Person_FirstName_LastName");
        assert!(meta.indexes_on("Person", None, "Id").is_empty());
        assert!(meta.indexes_on("Person", Some("dbo"), "LastName").is_empty());
    }

    #[test]
    fn test_key_and_identity_columns() {
        let meta = people();
        let table = meta.table("Person", None).unwrap();
        assert!(table.is_key_column("Id"));
        assert!(table.is_key_column("FirstName"));
        assert!(table.is_key_column("Email"));
        assert!(!table.is_key_column("Nickname"));
        assert!(table.is_identity_column("Id"));
        assert!(!table.is_identity_column("FirstName"));
    }

    #[test]
    fn test_default_state() {
        let meta = SchemaMetadata::new().with_table(
            TableMetadata::new("People")
                .column("Name")
                .column_with_default("Age", false)
                .column_with_default("Score", true),
        );
        let table = meta.table("People", None).unwrap();
        assert_eq!(table.has_default("Name"), None);
        assert_eq!(table.has_default("Age"), Some(false));
        assert_eq!(table.has_default("Score"), Some(true));
        assert_eq!(table.has_default("Missing"), None);
    }

    #[test]
    fn test_unique_constraints_on_column() {
        let meta = people();
        assert_eq!(meta.unique_constraints_on("Person", None, "Email").len(), 1);
        assert!(meta.unique_constraints_on("Missing", None, "Email").is_empty());
    }

    #[test]
    fn test_from_json() {
        let meta = SchemaMetadata::from_json(
            r#"{"tables": [{"name": "Person", "indexes": [
                {"name": "IX_Person_Name", "columns": ["Name"]}]}]}"#,
        )
        .unwrap();
        assert_eq!(meta.indexes_on("Person", None, "Name").len(), 1);
    }
}
