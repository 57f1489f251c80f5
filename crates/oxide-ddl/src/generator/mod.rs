//! SQL generation for migration operations.
//!
//! [`SqlGenerator`] walks an operation list in order and dispatches each
//! operation to a producer. Producers are pure functions of the operation,
//! the metadata view and the dialect; they return statements in execution
//! order. The first failing operation aborts the whole pass, so a partial
//! script is never returned.

mod admin;
mod data;

use std::fmt::Write as _;

use tracing::{debug, info};

use crate::column::{ColumnDefinition, IDENTITY_INCREMENT, IDENTITY_SEED};
use crate::dialect::{DefaultConstraintStyle, DialectConfig, IdentitySyntax, RenameSyntax};
use crate::emitter::{Script, Statement};
use crate::error::{DdlError, Result};
use crate::fragments;
use crate::metadata::{DefaultSchemaView, MetadataView};
use crate::operation::{
    AddColumnOp, AddPrimaryKeyOp, AlterColumnOp, CreateIndexOp, CreateTableOp, DropColumnOp,
    DropIndexOp, DropTableOp, Operation, RenameColumnOp, RenameIndexOp, RenameSequenceOp,
    RenameTableOp,
};
use crate::resolver::{DependencyResolver, VariableCounter};

/// Generates dialect-specific SQL for operation lists.
///
/// # Example
///
/// ```
/// use oxide_ddl::{ColumnDefinition, LogicalType, Operation, SchemaMetadata, SqlGenerator};
///
/// let generator = SqlGenerator::oracle();
/// let ops = vec![Operation::add_column(
///     "Person",
///     ColumnDefinition::new("Name", LogicalType::String).unicode(false),
/// )];
/// let script = generator.generate(&ops, &SchemaMetadata::new()).unwrap();
/// assert_eq!(
///     script.statements(),
///     vec!["ALTER TABLE \"Person\" ADD \"Name\" VARCHAR2(4000) NULL"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct SqlGenerator {
    dialect: DialectConfig,
}

/// State shared by the producers of one generation pass.
struct Pass<'a> {
    dialect: &'a DialectConfig,
    resolver: DependencyResolver<'a>,
    metadata: &'a dyn MetadataView,
    operations: &'a [Operation],
    variables: VariableCounter,
}

impl Pass<'_> {
    /// Whether a column is part of a key, either in the metadata or in
    /// this operation list.
    fn is_key(&self, table: &str, schema: Option<&str>, column: &str) -> bool {
        let same = |t: &str, s: Option<&str>| t == table && self.dialect.same_schema(s, schema);
        let contains = |cols: &[String]| cols.iter().any(|c| c == column);

        self.metadata
            .table(table, schema)
            .is_some_and(|t| t.is_key_column(column))
            || self.operations.iter().any(|op| match op {
                Operation::AddPrimaryKey(pk) => {
                    same(&pk.table, pk.schema.as_deref()) && contains(&pk.columns)
                }
                Operation::CreateIndex(ix) => {
                    same(&ix.table, ix.schema.as_deref()) && contains(&ix.columns)
                }
                Operation::CreateTable(ct) => {
                    same(&ct.name, ct.schema.as_deref())
                        && ct.primary_key.as_ref().is_some_and(|pk| contains(&pk.columns))
                }
                _ => false,
            })
    }
}

impl SqlGenerator {
    /// Creates a generator for a dialect.
    #[must_use]
    pub const fn new(dialect: DialectConfig) -> Self {
        Self { dialect }
    }

    /// Creates a generator for the Oracle preset.
    #[must_use]
    pub fn oracle() -> Self {
        Self::new(DialectConfig::oracle())
    }

    /// Creates a generator for the SQL Server preset.
    #[must_use]
    pub fn sql_server() -> Self {
        Self::new(DialectConfig::sql_server())
    }

    /// Returns the dialect.
    #[must_use]
    pub const fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    /// Generates the script for an operation list.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any operation; no script is
    /// produced in that case.
    pub fn generate(
        &self,
        operations: &[Operation],
        metadata: &dyn MetadataView,
    ) -> Result<Script> {
        let metadata = DefaultSchemaView::new(metadata, self.dialect.default_schema.as_deref());
        let mut pass = Pass {
            dialect: &self.dialect,
            resolver: DependencyResolver::new(&self.dialect, &metadata),
            metadata: &metadata,
            operations,
            variables: VariableCounter::new(),
        };
        let mut script = Script::new(&self.dialect);

        for (i, op) in operations.iter().enumerate() {
            debug!("Generating SQL for: {}", op.description());
            let later = &operations[i + 1..];
            script.extend(self.operation(op, later, &mut pass)?);

            if let Operation::AlterColumn(alter) = op {
                if pass.resolver.needs_batch_boundary(
                    &alter.table,
                    alter.schema.as_deref(),
                    &alter.column.name,
                    later,
                ) {
                    debug!("Ending batch after alter of '{}'", alter.column.name);
                    script.end_batch();
                }
            }
        }

        info!(
            "Generated {} statement(s) for {} operation(s) ({})",
            script.len(),
            operations.len(),
            self.dialect.name
        );
        Ok(script)
    }

    fn operation(
        &self,
        op: &Operation,
        later: &[Operation],
        pass: &mut Pass<'_>,
    ) -> Result<Vec<Statement>> {
        let description = op.description();
        match op {
            Operation::CreateTable(op) => self.create_table(op, &description, pass),
            Operation::DropTable(op) => Ok(self.drop_table(op)),
            Operation::AddColumn(op) => self.add_column(op, &description, pass),
            Operation::AlterColumn(op) => self.alter_column(op, later, &description, pass),
            Operation::DropColumn(op) => Ok(self.drop_column(op, pass)),
            Operation::RenameColumn(op) => self.rename_column(op, &description),
            Operation::AddPrimaryKey(op) => self.add_primary_key(op, &description),
            Operation::CreateIndex(op) => self.create_index(op, &description),
            Operation::DropIndex(op) => Ok(self.drop_index(op)),
            Operation::RenameIndex(op) => self.rename_index(op, &description, pass.metadata),
            Operation::RenameTable(op) => Ok(self.rename_table(op)),
            Operation::RenameSequence(op) => Ok(self.rename_sequence(op)),
            Operation::CreateSchema(op) => Ok(self.create_schema(op)),
            Operation::CreatePrincipal(op) => self.create_principal(op, &description),
            Operation::DropPrincipal(op) => self.drop_principal(op, &description),
            Operation::RawSql(op) => Ok(self.raw_sql(op)),
            Operation::InsertData(op) => self.insert_data(op, &description, pass.metadata),
        }
    }

    fn create_table(
        &self,
        op: &CreateTableOp,
        description: &str,
        pass: &Pass<'_>,
    ) -> Result<Vec<Statement>> {
        if op.columns.is_empty() {
            return Err(DdlError::invalid(description, "a table needs at least one column"));
        }
        let schema = op.schema.as_deref();
        let mut body = Vec::with_capacity(op.columns.len() + 1);
        for column in &op.columns {
            let is_key = pass.is_key(&op.name, schema, &column.name);
            body.push(self.column_definition(column, is_key, description)?);
        }
        if let Some(pk) = &op.primary_key {
            if pk.columns.is_empty() {
                return Err(DdlError::invalid(description, "primary key has no columns"));
            }
            body.push(fragments::primary_key(
                &self.dialect,
                pk.name.as_deref(),
                &pk.columns,
            ));
        }
        Ok(vec![Statement::new(format!(
            "CREATE TABLE {} (\n    {}\n)",
            self.dialect.qualify(&op.name, schema),
            body.join(",\n    ")
        ))])
    }

    fn drop_table(&self, op: &DropTableOp) -> Vec<Statement> {
        vec![Statement::new(format!(
            "DROP TABLE {}",
            self.dialect.qualify(&op.name, op.schema.as_deref())
        ))]
    }

    fn add_column(
        &self,
        op: &AddColumnOp,
        description: &str,
        pass: &Pass<'_>,
    ) -> Result<Vec<Statement>> {
        let schema = op.schema.as_deref();
        let is_key = pass.is_key(&op.table, schema, &op.column.name);
        Ok(vec![Statement::new(format!(
            "ALTER TABLE {} ADD {}",
            self.dialect.qualify(&op.table, schema),
            self.column_definition(&op.column, is_key, description)?
        ))])
    }

    fn alter_column(
        &self,
        op: &AlterColumnOp,
        later: &[Operation],
        description: &str,
        pass: &mut Pass<'_>,
    ) -> Result<Vec<Statement>> {
        DependencyResolver::check_transition(op, description)?;
        let column = &op.column;
        self.check_column(column, description)?;

        let schema = op.schema.as_deref();
        let table = self.dialect.qualify(&op.table, schema);
        let name = self.dialect.quote_identifier(&column.name);
        let is_key = pass.is_key(&op.table, schema, &column.name);
        let deps = pass
            .resolver
            .resolve_alter(op, is_key, later, &mut pass.variables)?;

        let mut statements = deps.before;
        if let Some(expr) = &column.computed {
            statements.push(Statement::new(format!("ALTER TABLE {table} DROP COLUMN {name}")));
            statements.push(Statement::new(format!("ALTER TABLE {table} ADD {name} AS ({expr})")));
        } else {
            let ty = self.dialect.map_type(column, is_key)?;
            let mut sql = format!(
                "ALTER TABLE {table} ALTER COLUMN {name} {ty} {}",
                nullability(column)
            );
            let default = column
                .default
                .as_ref()
                .map(|d| self.dialect.default_sql(d, column.is_unicode()));
            match (default, self.dialect.default_constraints) {
                (Some(value), DefaultConstraintStyle::Inline) => {
                    let _ = write!(sql, " DEFAULT {value}");
                    statements.push(Statement::new(sql));
                }
                (Some(value), DefaultConstraintStyle::SystemNamed) => {
                    statements.push(Statement::new(sql));
                    statements.push(Statement::new(format!(
                        "ALTER TABLE {table} ADD DEFAULT {value} FOR {name}"
                    )));
                }
                (None, _) => statements.push(Statement::new(sql)),
            }
        }
        statements.extend(deps.after);
        Ok(statements)
    }

    fn drop_column(&self, op: &DropColumnOp, pass: &mut Pass<'_>) -> Vec<Statement> {
        let schema = op.schema.as_deref();
        let deps = pass
            .resolver
            .resolve_drop(&op.table, schema, &op.name, &mut pass.variables);
        let mut statements = deps.before;
        statements.push(Statement::new(format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.dialect.qualify(&op.table, schema),
            self.dialect.quote_identifier(&op.name)
        )));
        statements
    }

    fn rename_column(&self, op: &RenameColumnOp, description: &str) -> Result<Vec<Statement>> {
        let table = owning_table(op.table.as_deref(), description)?;
        let schema = op.schema.as_deref();
        let d = &self.dialect;
        let sql = match d.renames {
            RenameSyntax::StoredProcedure => format!(
                "EXEC sp_rename {}, {}, {}",
                d.string_literal(
                    &DialectConfig::object_path(&[schema, Some(table), Some(&op.name)]),
                    true
                ),
                d.string_literal(&op.new_name, true),
                d.string_literal("COLUMN", true)
            ),
            RenameSyntax::AlterStatement => format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                d.qualify(table, schema),
                d.quote_identifier(&op.name),
                d.quote_identifier(&op.new_name)
            ),
        };
        Ok(vec![Statement::new(sql)])
    }

    fn add_primary_key(&self, op: &AddPrimaryKeyOp, description: &str) -> Result<Vec<Statement>> {
        if op.columns.is_empty() {
            return Err(DdlError::invalid(description, "primary key has no columns"));
        }
        Ok(vec![Statement::new(format!(
            "ALTER TABLE {} ADD {}",
            self.dialect.qualify(&op.table, op.schema.as_deref()),
            fragments::primary_key(&self.dialect, op.name.as_deref(), &op.columns)
        ))])
    }

    fn create_index(&self, op: &CreateIndexOp, description: &str) -> Result<Vec<Statement>> {
        if op.columns.is_empty() {
            return Err(DdlError::invalid(description, "index has no columns"));
        }
        Ok(vec![Statement::new(fragments::create_index(
            &self.dialect,
            &op.name,
            &op.table,
            op.schema.as_deref(),
            &op.columns,
            op.unique,
            op.filter.as_deref(),
        ))])
    }

    fn drop_index(&self, op: &DropIndexOp) -> Vec<Statement> {
        vec![Statement::new(fragments::drop_index(
            &self.dialect,
            &op.name,
            &op.table,
            op.schema.as_deref(),
        ))]
    }

    fn rename_index(
        &self,
        op: &RenameIndexOp,
        description: &str,
        metadata: &dyn MetadataView,
    ) -> Result<Vec<Statement>> {
        let schema = op.schema.as_deref();
        let table = match op.table.as_deref().filter(|t| !t.is_empty()) {
            Some(table) => table,
            None => metadata
                .index_owner(&op.name, schema)
                .map(|t| t.name.as_str())
                .ok_or_else(|| DdlError::missing(description, "owning table"))?,
        };
        let d = &self.dialect;
        let sql = match d.renames {
            RenameSyntax::StoredProcedure => format!(
                "EXEC sp_rename {}, {}, {}",
                d.string_literal(
                    &DialectConfig::object_path(&[schema, Some(table), Some(&op.name)]),
                    true
                ),
                d.string_literal(&op.new_name, true),
                d.string_literal("INDEX", true)
            ),
            RenameSyntax::AlterStatement => format!(
                "ALTER INDEX {} RENAME TO {}",
                d.qualify(&op.name, schema),
                d.quote_identifier(&op.new_name)
            ),
        };
        Ok(vec![Statement::new(sql)])
    }

    fn rename_table(&self, op: &RenameTableOp) -> Vec<Statement> {
        vec![Statement::new(self.rename_object(
            "TABLE",
            &op.name,
            op.schema.as_deref(),
            &op.new_name,
        ))]
    }

    fn rename_sequence(&self, op: &RenameSequenceOp) -> Vec<Statement> {
        vec![Statement::new(self.rename_object(
            "SEQUENCE",
            &op.name,
            op.schema.as_deref(),
            &op.new_name,
        ))]
    }

    /// Renames a schema-scoped object that needs no owning table.
    fn rename_object(&self, kind: &str, name: &str, schema: Option<&str>, new_name: &str) -> String {
        let d = &self.dialect;
        match d.renames {
            RenameSyntax::StoredProcedure => format!(
                "EXEC sp_rename {}, {}",
                d.string_literal(&DialectConfig::object_path(&[schema, Some(name)]), true),
                d.string_literal(new_name, true)
            ),
            RenameSyntax::AlterStatement => format!(
                "ALTER {kind} {} RENAME TO {}",
                d.qualify(name, schema),
                d.quote_identifier(new_name)
            ),
        }
    }

    /// Rejects column definitions whose clauses exclude each other.
    fn check_column(&self, column: &ColumnDefinition, description: &str) -> Result<()> {
        if column.computed.is_some() {
            if column.default.is_some() {
                return Err(DdlError::invalid(
                    description,
                    format!(
                        "column '{}' cannot have both a computed expression and a default",
                        column.name
                    ),
                ));
            }
            if !self.dialect.supports_computed_columns {
                return Err(DdlError::UnmappableFacetCombination {
                    dialect: self.dialect.name.clone(),
                    logical_type: column.logical_type.to_string(),
                    facets: "computed".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Renders a column definition as used in CREATE TABLE and ADD.
    fn column_definition(
        &self,
        column: &ColumnDefinition,
        is_key: bool,
        description: &str,
    ) -> Result<String> {
        self.check_column(column, description)?;
        let name = self.dialect.quote_identifier(&column.name);
        if let Some(expr) = &column.computed {
            return Ok(format!("{name} AS ({expr})"));
        }

        let ty = self.dialect.map_type(column, is_key)?;
        let default = column
            .default
            .as_ref()
            .map(|d| self.dialect.default_sql(d, column.is_unicode()));
        let mut sql = format!("{name} {ty}");

        if column.is_identity() {
            let options = identity_options(column, description)?;
            match self.dialect.identity {
                IdentitySyntax::GeneratedByDefaultOnNull => {
                    if let Some(value) = default {
                        let _ = write!(sql, " DEFAULT {value}");
                    }
                    sql.push_str(" GENERATED BY DEFAULT ON NULL AS IDENTITY");
                    if let Some((seed, increment)) = options {
                        let _ = write!(sql, " (START WITH {seed} INCREMENT BY {increment})");
                    }
                }
                IdentitySyntax::IdentityProperty => {
                    sql.push(' ');
                    sql.push_str(nullability(column));
                    if let Some(value) = default {
                        let _ = write!(sql, " DEFAULT {value}");
                    }
                    sql.push_str(" IDENTITY");
                    if let Some((seed, increment)) = options {
                        let _ = write!(sql, "({seed}, {increment})");
                    }
                }
            }
        } else {
            sql.push(' ');
            sql.push_str(nullability(column));
            if let Some(value) = default {
                let _ = write!(sql, " DEFAULT {value}");
            }
        }
        Ok(sql)
    }
}

/// Identity columns are never nullable.
fn nullability(column: &ColumnDefinition) -> &'static str {
    if column.nullable && !column.is_identity() {
        "NULL"
    } else {
        "NOT NULL"
    }
}

fn owning_table<'a>(table: Option<&'a str>, description: &str) -> Result<&'a str> {
    table
        .filter(|t| !t.is_empty())
        .ok_or_else(|| DdlError::missing(description, "owning table"))
}

/// Seed and increment from the identity annotations, if either is set.
fn identity_options(column: &ColumnDefinition, description: &str) -> Result<Option<(i64, i64)>> {
    let seed = column.annotations.get(IDENTITY_SEED);
    let increment = column.annotations.get(IDENTITY_INCREMENT);
    if seed.is_none() && increment.is_none() {
        return Ok(None);
    }
    let parse = |key: &str, value: Option<&str>| -> Result<i64> {
        value.map_or(Ok(1), |v| {
            v.trim().parse().map_err(|_| {
                DdlError::invalid(
                    description,
                    format!("annotation '{key}' of column '{}' is not an integer: {v}", column.name),
                )
            })
        })
    };
    Ok(Some((
        parse(IDENTITY_SEED, seed)?,
        parse(IDENTITY_INCREMENT, increment)?,
    )))
}
