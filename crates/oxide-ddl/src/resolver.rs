//! Dependency resolution for column changes.
//!
//! Before a column can be altered or dropped, objects that depend on it may
//! have to go: default constraints with system-generated names, and indexes
//! or unique constraints that block a narrowing change. The resolver works
//! out which statements must run before and after the primary statement,
//! and whether a batch boundary is needed afterwards.

use tracing::{trace, warn};

use crate::column::ColumnDefinition;
use crate::dialect::{DefaultConstraintStyle, DialectConfig};
use crate::emitter::Statement;
use crate::error::{DdlError, Result};
use crate::fragments;
use crate::metadata::{IndexMetadata, MetadataView};
use crate::operation::{AlterColumnOp, Operation};

/// Hands out `@var0`, `@var1`, ... for one generation pass.
#[derive(Debug, Default)]
pub struct VariableCounter(usize);

impl VariableCounter {
    /// Creates a counter starting at `@var0`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next variable name.
    pub fn next_name(&mut self) -> String {
        let name = format!("@var{}", self.0);
        self.0 += 1;
        name
    }
}

/// Statements that surround a column change.
#[derive(Debug, Default)]
pub struct ColumnDependencies {
    /// Statements that must run before the change.
    pub before: Vec<Statement>,
    /// Statements that must run after the change.
    pub after: Vec<Statement>,
}

/// Resolves the dependents of a column change.
pub struct DependencyResolver<'a> {
    dialect: &'a DialectConfig,
    metadata: &'a dyn MetadataView,
}

impl<'a> DependencyResolver<'a> {
    /// Creates a resolver.
    #[must_use]
    pub fn new(dialect: &'a DialectConfig, metadata: &'a dyn MetadataView) -> Self {
        Self { dialect, metadata }
    }

    /// Rejects an alter that changes the value generation strategy.
    ///
    /// # Errors
    ///
    /// Returns [`DdlError::UnsupportedTransition`] when the old and new
    /// strategies differ.
    pub fn check_transition(op: &AlterColumnOp, operation: &str) -> Result<()> {
        let Some(old) = &op.old_column else {
            return Ok(());
        };
        if old.value_generation == op.column.value_generation {
            return Ok(());
        }
        let describe = |column: &ColumnDefinition| {
            column
                .value_generation
                .map_or_else(|| "none".to_string(), |g| g.to_string())
        };
        Err(DdlError::UnsupportedTransition {
            operation: operation.to_string(),
            column: op.column.name.clone(),
            from: describe(old),
            to: describe(&op.column),
        })
    }

    /// Returns whether the alter narrows the column.
    ///
    /// Unknown old facets count as narrowing.
    ///
    /// # Errors
    ///
    /// Propagates type mapping errors.
    pub fn is_narrowing(&self, op: &AlterColumnOp, is_key: bool) -> Result<bool> {
        let new = &op.column;
        let Some(old) = &op.old_column else {
            warn!(
                "Old definition of column '{}' in table '{}' unknown, assuming narrowing change",
                new.name, op.table
            );
            return Ok(true);
        };

        if new.computed.is_some() || old.computed != new.computed {
            trace!("Column '{}' computed expression present or changed", new.name);
            return Ok(true);
        }
        let old_type = self.dialect.map_type(old, is_key)?;
        let new_type = self.dialect.map_type(new, is_key)?;
        if old_type != new_type {
            trace!("Column '{}' type changes from {} to {}", new.name, old_type, new_type);
            return Ok(true);
        }
        Ok(old.nullable && !new.nullable)
    }

    /// Resolves the statements surrounding an AlterColumn.
    ///
    /// `later` holds the operations that follow in the same list; indexes
    /// they create or drop are left to them.
    ///
    /// # Errors
    ///
    /// Propagates type mapping errors.
    pub fn resolve_alter(
        &self,
        op: &AlterColumnOp,
        is_key: bool,
        later: &[Operation],
        variables: &mut VariableCounter,
    ) -> Result<ColumnDependencies> {
        let table = op.table.as_str();
        let schema = op.schema.as_deref();
        let column = op.column.name.as_str();
        let mut deps = ColumnDependencies::default();

        if self.dialect.rebuild_indexes && self.is_narrowing(op, is_key)? {
            for index in self.metadata.indexes_on(table, schema, column) {
                if handled_later(self.dialect, index, table, schema, later) {
                    trace!("Index '{}' handled by a later operation", index.name);
                    continue;
                }
                trace!("Rebuilding index '{}' around alter of '{}'", index.name, column);
                deps.before.push(Statement::new(fragments::drop_index(
                    self.dialect,
                    &index.name,
                    table,
                    schema,
                )));
                deps.after.push(Statement::new(fragments::create_index(
                    self.dialect,
                    &index.name,
                    table,
                    schema,
                    &index.columns,
                    index.unique,
                    index.filter.as_deref(),
                )));
            }
            if self.dialect.rebuild_unique_constraints {
                for uq in self.metadata.unique_constraints_on(table, schema, column) {
                    trace!("Rebuilding unique constraint '{}'", uq.name);
                    deps.before.push(Statement::new(fragments::drop_constraint(
                        self.dialect,
                        &uq.name,
                        table,
                        schema,
                    )));
                    deps.after.push(Statement::new(fragments::add_unique_constraint(
                        self.dialect,
                        &uq.name,
                        table,
                        schema,
                        &uq.columns,
                    )));
                }
            }
        }

        deps.before
            .extend(self.drop_default_constraint(table, schema, column, variables));
        Ok(deps)
    }

    /// Resolves the statements that must precede a DropColumn.
    #[must_use]
    pub fn resolve_drop(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &str,
        variables: &mut VariableCounter,
    ) -> ColumnDependencies {
        ColumnDependencies {
            before: self.drop_default_constraint(table, schema, column, variables),
            after: Vec::new(),
        }
    }

    /// Returns whether a batch must end after changing `column`.
    #[must_use]
    pub fn needs_batch_boundary(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &str,
        later: &[Operation],
    ) -> bool {
        let alias = self.dialect.schema_alias(schema);
        self.dialect.batch_separator.is_some()
            && later.iter().any(|op| {
                op.touches_column(table, schema, column)
                    || alias.is_some_and(|s| op.touches_column(table, s, column))
            })
    }

    /// Looks up and drops the system-named default constraint on a column.
    ///
    /// The constraint name is only known at run time, so the lookup goes
    /// through the catalog into a fresh variable.
    fn drop_default_constraint(
        &self,
        table: &str,
        schema: Option<&str>,
        column: &str,
        variables: &mut VariableCounter,
    ) -> Vec<Statement> {
        if self.dialect.default_constraints != DefaultConstraintStyle::SystemNamed {
            return Vec::new();
        }
        let known = self
            .metadata
            .table(table, schema)
            .and_then(|t| t.has_default(column));
        if known == Some(false) {
            trace!("Column '{}' has no default constraint", column);
            return Vec::new();
        }

        let d = self.dialect;
        let q = |name: &str| d.quote_identifier(name);
        let var = variables.next_name();
        let object = DialectConfig::object_path(&[schema, Some(table)]);

        let lookup = format!(
            "SELECT {var} = {d_}.{name}\n\
             FROM {sys}.{dc} {d_}\n\
             INNER JOIN {sys}.{cols} {c_} ON {d_}.{pcid} = {c_}.{cid} AND {d_}.{poid} = {c_}.{oid}\n\
             WHERE ({d_}.{poid} = OBJECT_ID({object}) AND {c_}.{name} = {column})",
            d_ = q("d"),
            c_ = q("c"),
            name = q("name"),
            sys = q("sys"),
            dc = q("default_constraints"),
            cols = q("columns"),
            pcid = q("parent_column_id"),
            cid = q("column_id"),
            poid = q("parent_object_id"),
            oid = q("object_id"),
            object = d.string_literal(&object, true),
            column = d.string_literal(column, true),
        );
        let head = format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            d.qualify(table, schema),
            d.quote.open
        );
        let tail = format!("{}{}", d.quote.close, d.statement_terminator);
        let exec = format!(
            "IF {var} IS NOT NULL EXEC({} + {var} + {})",
            d.string_literal(&head, true),
            d.string_literal(&tail, false)
        );

        vec![
            Statement::new(format!("DECLARE {var} sysname")),
            Statement::new(lookup),
            Statement::new(exec),
        ]
    }
}

fn handled_later(
    dialect: &DialectConfig,
    index: &IndexMetadata,
    table: &str,
    schema: Option<&str>,
    later: &[Operation],
) -> bool {
    later.iter().any(|op| match op {
        Operation::CreateIndex(c) => {
            c.name == index.name && c.table == table && dialect.same_schema(c.schema.as_deref(), schema)
        }
        Operation::DropIndex(d) => {
            d.name == index.name && d.table == table && dialect.same_schema(d.schema.as_deref(), schema)
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::LogicalType;
    use crate::metadata::{SchemaMetadata, TableMetadata};
    use crate::operation::DropIndexOp;

    fn person() -> SchemaMetadata {
        SchemaMetadata::new().with_table(
            TableMetadata::new("Person")
                .column("FirstName")
                .column_with_default("Nickname", false)
                .index(IndexMetadata::new(
                    "IX_Person_FirstName",
                    vec!["FirstName".to_string()],
                ))
                .unique_constraint("AK_Person_FirstName", vec!["FirstName".to_string()]),
        )
    }

    fn alter(column: ColumnDefinition) -> AlterColumnOp {
        AlterColumnOp {
            table: "Person".to_string(),
            schema: None,
            column,
            old_column: None,
        }
    }

    fn sql(statements: &[Statement]) -> Vec<&str> {
        statements.iter().map(Statement::sql).collect()
    }

    #[test]
    fn test_variables_are_numbered() {
        let mut vars = VariableCounter::new();
        assert_eq!(vars.next_name(), "@var0");
        assert_eq!(vars.next_name(), "@var1");
    }

    #[test]
    fn test_identity_transition_rejected() {
        let op = alter(ColumnDefinition::new("Id", LogicalType::Int32).identity())
            .with_old_column(ColumnDefinition::new("Id", LogicalType::Int32));
        let err = DependencyResolver::check_transition(&op, "alter").unwrap_err();
        assert!(err.to_string().contains("from none to identity"));
        let unchanged = alter(ColumnDefinition::new("Id", LogicalType::Int32))
            .with_old_column(ColumnDefinition::new("Id", LogicalType::Int32));
        assert!(DependencyResolver::check_transition(&unchanged, "alter").is_ok());
    }

    #[test]
    fn test_narrowing_rules() {
        let dialect = DialectConfig::oracle();
        let meta = SchemaMetadata::new();
        let resolver = DependencyResolver::new(&dialect, &meta);
        let col = || ColumnDefinition::new("FirstName", LogicalType::String).max_length(30);

        assert!(resolver.is_narrowing(&alter(col()), false).unwrap());
        let widened = alter(col()).with_old_column(col().not_null());
        assert!(!resolver.is_narrowing(&widened, false).unwrap());
        let tightened = alter(col().not_null()).with_old_column(col());
        assert!(resolver.is_narrowing(&tightened, false).unwrap());
        let resized = alter(col().max_length(20)).with_old_column(col());
        assert!(resolver.is_narrowing(&resized, false).unwrap());
    }

    #[test]
    fn test_alter_rebuilds_indexes_and_unique_constraints() {
        let dialect = DialectConfig::sql_server();
        let meta = person();
        let resolver = DependencyResolver::new(&dialect, &meta);
        let op = alter(ColumnDefinition::new("FirstName", LogicalType::String).not_null());
        let mut vars = VariableCounter::new();
        let deps = resolver.resolve_alter(&op, true, &[], &mut vars).unwrap();
        let before = sql(&deps.before);
        assert_eq!(before[0], "DROP INDEX [IX_Person_FirstName] ON [Person]");
        assert_eq!(
            before[1],
            "ALTER TABLE [Person] DROP CONSTRAINT [AK_Person_FirstName]"
        );
        assert_eq!(before[2], "DECLARE @var0 sysname");
        assert_eq!(
            sql(&deps.after),
            vec![
                "CREATE INDEX [IX_Person_FirstName] ON [Person] ([FirstName])",
                "ALTER TABLE [Person] ADD CONSTRAINT [AK_Person_FirstName] UNIQUE ([FirstName])",
            ]
        );
    }

    #[test]
    fn test_indexes_handled_later_are_skipped() {
        let dialect = DialectConfig::oracle();
        let meta = person();
        let resolver = DependencyResolver::new(&dialect, &meta);
        let op = alter(ColumnDefinition::new("FirstName", LogicalType::String));
        let later: [Operation; 1] = [DropIndexOp {
            name: "IX_Person_FirstName".to_string(),
            table: "Person".to_string(),
            schema: Some("dbo".to_string()),
        }
        .into()];
        let mut vars = VariableCounter::new();
        let deps = resolver.resolve_alter(&op, false, &later, &mut vars).unwrap();
        assert!(deps.after.is_empty());
        assert!(sql(&deps.before).iter().all(|s| !s.starts_with("DROP INDEX")));
    }

    #[test]
    fn test_default_lookup() {
        let dialect = DialectConfig::oracle();
        let meta = person();
        let resolver = DependencyResolver::new(&dialect, &meta);
        let mut vars = VariableCounter::new();
        let deps = resolver.resolve_drop("People", Some("dbo"), "LuckyNumber", &mut vars);
        assert_eq!(
            sql(&deps.before),
            vec![
                "DECLARE @var0 sysname",
                "SELECT @var0 = \"d\".\"name\"\n\
                 FROM \"sys\".\"default_constraints\" \"d\"\n\
                 INNER JOIN \"sys\".\"columns\" \"c\" ON \"d\".\"parent_column_id\" = \"c\".\"column_id\" AND \"d\".\"parent_object_id\" = \"c\".\"object_id\"\n\
                 WHERE (\"d\".\"parent_object_id\" = OBJECT_ID(N'dbo.People') AND \"c\".\"name\" = N'LuckyNumber')",
                "IF @var0 IS NOT NULL EXEC(N'ALTER TABLE \"dbo\".\"People\" DROP CONSTRAINT \"' + @var0 + '\";')",
            ]
        );
        let none = resolver.resolve_drop("Person", None, "Nickname", &mut vars);
        assert!(none.before.is_empty());
    }

    #[test]
    fn test_inline_defaults_need_no_lookup() {
        let mut dialect = DialectConfig::oracle();
        dialect.default_constraints = DefaultConstraintStyle::Inline;
        let meta = SchemaMetadata::new();
        let resolver = DependencyResolver::new(&dialect, &meta);
        let deps = resolver.resolve_drop("People", None, "Age", &mut VariableCounter::new());
        assert!(deps.before.is_empty());
    }

    #[test]
    fn test_batch_boundary() {
        let dialect = DialectConfig::oracle();
        let meta = SchemaMetadata::new();
        let resolver = DependencyResolver::new(&dialect, &meta);
        let later = [Operation::create_index(
            "IX_Person_Name",
            "Person",
            vec!["Name".to_string()],
            false,
        )];
        assert!(resolver.needs_batch_boundary("Person", None, "Name", &later));
        assert!(!resolver.needs_batch_boundary("Person", None, "Age", &later));
        assert!(!resolver.needs_batch_boundary("Person", None, "Name", &[]));
        assert!(resolver.needs_batch_boundary("Person", Some("dbo"), "Name", &later));
        assert!(!resolver.needs_batch_boundary("Person", Some("hr"), "Name", &later));
    }
}
