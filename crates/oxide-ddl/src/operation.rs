//! Schema-change operations.
//!
//! Operations are produced by a diff or migration builder and consumed once
//! by [`SqlGenerator::generate`](crate::SqlGenerator::generate). The
//! generator only reads them.

use serde::{Deserialize, Serialize};

use crate::column::ColumnDefinition;
use crate::value::SqlValue;

/// All operations the generator understands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    /// Create a table.
    CreateTable(CreateTableOp),
    /// Drop a table.
    DropTable(DropTableOp),
    /// Add a column to a table.
    AddColumn(AddColumnOp),
    /// Redefine an existing column.
    AlterColumn(AlterColumnOp),
    /// Drop a column.
    DropColumn(DropColumnOp),
    /// Rename a column.
    RenameColumn(RenameColumnOp),
    /// Add a primary key.
    AddPrimaryKey(AddPrimaryKeyOp),
    /// Create an index.
    CreateIndex(CreateIndexOp),
    /// Drop an index.
    DropIndex(DropIndexOp),
    /// Rename an index.
    RenameIndex(RenameIndexOp),
    /// Rename a table.
    RenameTable(RenameTableOp),
    /// Rename a sequence.
    RenameSequence(RenameSequenceOp),
    /// Ensure a schema exists.
    CreateSchema(CreateSchemaOp),
    /// Create a database principal (user/login).
    CreatePrincipal(CreatePrincipalOp),
    /// Drop a database principal.
    DropPrincipal(DropPrincipalOp),
    /// Pass SQL through.
    RawSql(RawSqlOp),
    /// Insert seed rows.
    InsertData(InsertDataOp),
}

impl Operation {
    /// Creates an add column operation.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: ColumnDefinition) -> Self {
        Self::AddColumn(AddColumnOp {
            table: table.into(),
            schema: None,
            column,
        })
    }

    /// Creates an alter column operation without a known old definition.
    #[must_use]
    pub fn alter_column(table: impl Into<String>, column: ColumnDefinition) -> Self {
        Self::AlterColumn(AlterColumnOp {
            table: table.into(),
            schema: None,
            column,
            old_column: None,
        })
    }

    /// Creates a drop column operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DropColumn(DropColumnOp {
            table: table.into(),
            schema: None,
            name: name.into(),
        })
    }

    /// Creates a rename column operation.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameColumn(RenameColumnOp {
            table: Some(table.into()),
            schema: None,
            name: name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates an add primary key operation.
    #[must_use]
    pub fn add_primary_key(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self::AddPrimaryKey(AddPrimaryKeyOp {
            table: table.into(),
            schema: None,
            name: None,
            columns,
        })
    }

    /// Creates a create index operation.
    #[must_use]
    pub fn create_index(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: Vec<String>,
        unique: bool,
    ) -> Self {
        Self::CreateIndex(CreateIndexOp {
            name: name.into(),
            table: table.into(),
            schema: None,
            columns,
            unique,
            filter: None,
        })
    }

    /// Creates a drop index operation.
    #[must_use]
    pub fn drop_index(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self::DropIndex(DropIndexOp {
            name: name.into(),
            table: table.into(),
            schema: None,
        })
    }

    /// Creates a rename index operation.
    #[must_use]
    pub fn rename_index(
        table: impl Into<String>,
        name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameIndex(RenameIndexOp {
            table: Some(table.into()),
            schema: None,
            name: name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates a rename table operation.
    #[must_use]
    pub fn rename_table(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::RenameTable(RenameTableOp {
            name: name.into(),
            schema: None,
            new_name: new_name.into(),
        })
    }

    /// Creates a rename sequence operation.
    #[must_use]
    pub fn rename_sequence(name: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::RenameSequence(RenameSequenceOp {
            name: name.into(),
            schema: None,
            new_name: new_name.into(),
        })
    }

    /// Creates a create schema operation.
    #[must_use]
    pub fn create_schema(name: impl Into<String>) -> Self {
        Self::CreateSchema(CreateSchemaOp { name: name.into() })
    }

    /// Creates a drop principal operation.
    #[must_use]
    pub fn drop_principal(name: impl Into<String>) -> Self {
        Self::DropPrincipal(DropPrincipalOp { name: name.into() })
    }

    /// Creates a raw SQL operation.
    #[must_use]
    pub fn raw_sql(sql: impl Into<String>) -> Self {
        Self::RawSql(RawSqlOp { sql: sql.into() })
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable(op) => format!("Create table '{}'", op.name),
            Self::DropTable(op) => format!("Drop table '{}'", op.name),
            Self::AddColumn(op) => {
                format!("Add column '{}' to table '{}'", op.column.name, op.table)
            }
            Self::AlterColumn(op) => {
                format!("Alter column '{}' in table '{}'", op.column.name, op.table)
            }
            Self::DropColumn(op) => {
                format!("Drop column '{}' from table '{}'", op.name, op.table)
            }
            Self::RenameColumn(op) => format!(
                "Rename column '{}' to '{}' in table '{}'",
                op.name,
                op.new_name,
                op.table.as_deref().unwrap_or("?")
            ),
            Self::AddPrimaryKey(op) => format!("Add primary key to table '{}'", op.table),
            Self::CreateIndex(op) => {
                format!("Create index '{}' on table '{}'", op.name, op.table)
            }
            Self::DropIndex(op) => format!("Drop index '{}' on table '{}'", op.name, op.table),
            Self::RenameIndex(op) => {
                format!("Rename index '{}' to '{}'", op.name, op.new_name)
            }
            Self::RenameTable(op) => {
                format!("Rename table '{}' to '{}'", op.name, op.new_name)
            }
            Self::RenameSequence(op) => {
                format!("Rename sequence '{}' to '{}'", op.name, op.new_name)
            }
            Self::CreateSchema(op) => format!("Create schema '{}'", op.name),
            Self::CreatePrincipal(op) => format!("Create principal '{}'", op.name),
            Self::DropPrincipal(op) => format!("Drop principal '{}'", op.name),
            Self::RawSql(_) => "Run custom SQL".to_string(),
            Self::InsertData(op) => format!(
                "Insert {} row(s) into table '{}'",
                op.rows.len(),
                op.table
            ),
        }
    }

    /// Returns true if this operation acts on `column` of the given table.
    #[must_use]
    pub fn touches_column(&self, table: &str, schema: Option<&str>, column: &str) -> bool {
        let same_table = |t: &str, s: Option<&str>| t == table && s == schema;
        match self {
            Self::AlterColumn(op) => {
                same_table(&op.table, op.schema.as_deref()) && op.column.name == column
            }
            Self::DropColumn(op) => {
                same_table(&op.table, op.schema.as_deref()) && op.name == column
            }
            Self::RenameColumn(op) => {
                op.table
                    .as_deref()
                    .is_some_and(|t| same_table(t, op.schema.as_deref()))
                    && op.name == column
            }
            Self::AddPrimaryKey(op) => {
                same_table(&op.table, op.schema.as_deref()) && op.columns.iter().any(|c| c == column)
            }
            Self::CreateIndex(op) => {
                same_table(&op.table, op.schema.as_deref()) && op.columns.iter().any(|c| c == column)
            }
            _ => false,
        }
    }
}

/// Primary key declared inline in a CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKeyDefinition {
    /// Optional constraint name.
    #[serde(default)]
    pub name: Option<String>,
    /// Key columns, in order.
    pub columns: Vec<String>,
}

/// Create table operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableOp {
    /// Table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Column definitions.
    pub columns: Vec<ColumnDefinition>,
    /// Primary key, if any.
    #[serde(default)]
    pub primary_key: Option<PrimaryKeyDefinition>,
}

/// Drop table operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableOp {
    /// Table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
}

/// Add column operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnOp {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// The new column.
    pub column: ColumnDefinition,
}

/// Alter column operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterColumnOp {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// The column as it should be after the alter.
    pub column: ColumnDefinition,
    /// The column as the diff step knew it before the alter, if known.
    #[serde(default)]
    pub old_column: Option<ColumnDefinition>,
}

impl AlterColumnOp {
    /// Sets the pre-change definition.
    #[must_use]
    pub fn with_old_column(mut self, old_column: ColumnDefinition) -> Self {
        self.old_column = Some(old_column);
        self
    }
}

/// Drop column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnOp {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Column name.
    pub name: String,
}

/// Rename column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnOp {
    /// Owning table; required.
    #[serde(default)]
    pub table: Option<String>,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Current column name.
    pub name: String,
    /// New column name.
    pub new_name: String,
}

/// Add primary key operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddPrimaryKeyOp {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Optional constraint name.
    #[serde(default)]
    pub name: Option<String>,
    /// Key columns, in order.
    pub columns: Vec<String>,
}

/// Create index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexOp {
    /// Index name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether this is a UNIQUE index.
    #[serde(default)]
    pub unique: bool,
    /// Filter predicate for a partial index.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Drop index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexOp {
    /// Index name.
    pub name: String,
    /// Owning table.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
}

/// Rename index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameIndexOp {
    /// Owning table; required.
    #[serde(default)]
    pub table: Option<String>,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Current index name.
    pub name: String,
    /// New index name.
    pub new_name: String,
}

/// Rename table operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOp {
    /// Current table name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// New table name.
    pub new_name: String,
}

/// Rename sequence operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameSequenceOp {
    /// Current sequence name.
    pub name: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// New sequence name.
    pub new_name: String,
}

/// Ensure-schema operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSchemaOp {
    /// Schema name.
    pub name: String,
}

/// Create principal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePrincipalOp {
    /// Principal name.
    pub name: String,
    /// Password; defaults to the principal name.
    #[serde(default)]
    pub password: Option<String>,
    /// Roles or privileges granted after creation.
    #[serde(default)]
    pub grants: Vec<String>,
}

impl CreatePrincipalOp {
    /// Creates a principal with no grants.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: None,
            grants: Vec::new(),
        }
    }

    /// Sets the password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Adds a grant.
    #[must_use]
    pub fn grant(mut self, role: impl Into<String>) -> Self {
        self.grants.push(role.into());
        self
    }
}

/// Drop principal operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropPrincipalOp {
    /// Principal name.
    pub name: String,
}

/// Raw SQL operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSqlOp {
    /// SQL text.
    pub sql: String,
}

/// Insert data operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertDataOp {
    /// Table name.
    pub table: String,
    /// Schema name.
    #[serde(default)]
    pub schema: Option<String>,
    /// Target columns.
    pub columns: Vec<String>,
    /// Rows, each with one value per column.
    pub rows: Vec<Vec<SqlValue>>,
}

impl InsertDataOp {
    /// Creates an insert with no rows.
    #[must_use]
    pub fn new(table: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table: table.into(),
            schema: None,
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row.
    #[must_use]
    pub fn row(mut self, values: Vec<SqlValue>) -> Self {
        self.rows.push(values);
        self
    }
}

macro_rules! impl_into_operation {
    ($($op:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$op> for Operation {
                fn from(op: $op) -> Self {
                    Self::$variant(op)
                }
            }
        )*
    };
}

impl_into_operation! {
    CreateTableOp => CreateTable,
    DropTableOp => DropTable,
    AddColumnOp => AddColumn,
    AlterColumnOp => AlterColumn,
    DropColumnOp => DropColumn,
    RenameColumnOp => RenameColumn,
    AddPrimaryKeyOp => AddPrimaryKey,
    CreateIndexOp => CreateIndex,
    DropIndexOp => DropIndex,
    RenameIndexOp => RenameIndex,
    RenameTableOp => RenameTable,
    RenameSequenceOp => RenameSequence,
    CreateSchemaOp => CreateSchema,
    CreatePrincipalOp => CreatePrincipal,
    DropPrincipalOp => DropPrincipal,
    RawSqlOp => RawSql,
    InsertDataOp => InsertData,
}
