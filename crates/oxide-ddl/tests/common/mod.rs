#![allow(dead_code)]

use oxide_ddl::prelude::*;

pub fn oracle() -> SqlGenerator {
    SqlGenerator::oracle()
}

pub fn sql_server() -> SqlGenerator {
    SqlGenerator::sql_server()
}

/// Generates a script and returns its statements without terminators.
pub fn statements_with(
    generator: &SqlGenerator,
    ops: &[Operation],
    metadata: &SchemaMetadata,
) -> Vec<String> {
    generator
        .generate(ops, metadata)
        .unwrap_or_else(|e| panic!("Generation failed: {e}"))
        .statements()
        .into_iter()
        .map(ToString::to_string)
        .collect()
}

pub fn statements(generator: &SqlGenerator, ops: &[Operation]) -> Vec<String> {
    statements_with(generator, ops, &SchemaMetadata::new())
}

/// Generates the script for a single operation, which must yield exactly
/// one statement.
pub fn single(generator: &SqlGenerator, op: Operation) -> String {
    let mut sql = statements(generator, &[op]);
    assert_eq!(sql.len(), 1, "Expected one statement, got {sql:?}");
    sql.remove(0)
}

pub fn generate_err(generator: &SqlGenerator, ops: &[Operation]) -> DdlError {
    generator
        .generate(ops, &SchemaMetadata::new())
        .expect_err("Expected generation to fail")
}

pub fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// `Person` with a two-column name index.
pub fn person_with_name_index() -> SchemaMetadata {
    SchemaMetadata::new().with_table(
        TableMetadata::new("Person")
            .identity_column("Id")
            .column("FirstName")
            .column("LastName")
            .primary_key(cols(&["Id"]))
            .index(IndexMetadata::new(
                "IX_Person_FirstName_LastName",
                cols(&["FirstName", "LastName"]),
            )),
    )
}

/// The three statements that look up and drop a system-named default.
pub fn default_drop(
    generator: &SqlGenerator,
    var: &str,
    table: &str,
    schema: Option<&str>,
    column: &str,
) -> Vec<String> {
    let d = generator.dialect();
    let q = |s: &str| d.quote_identifier(s);
    let object = match schema {
        Some(schema) => format!("{schema}.{table}"),
        None => table.to_string(),
    };
    vec![
        format!("DECLARE {var} sysname"),
        format!(
            "SELECT {var} = {dq}.{nm}\nFROM {sys}.{dc} {dq}\nINNER JOIN {sys}.{cl} {cq} ON {dq}.{pc} = {cq}.{ci} AND {dq}.{po} = {cq}.{oi}\nWHERE ({dq}.{po} = OBJECT_ID(N'{object}') AND {cq}.{nm} = N'{column}')",
            dq = q("d"),
            cq = q("c"),
            nm = q("name"),
            sys = q("sys"),
            dc = q("default_constraints"),
            cl = q("columns"),
            pc = q("parent_column_id"),
            ci = q("column_id"),
            po = q("parent_object_id"),
            oi = q("object_id"),
        ),
        format!(
            "IF {var} IS NOT NULL EXEC(N'ALTER TABLE {} DROP CONSTRAINT {}' + {var} + '{};')",
            d.qualify(table, schema),
            d.quote.open,
            d.quote.close
        ),
    ]
}
