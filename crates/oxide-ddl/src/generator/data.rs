//! Seed data and pass-through SQL.

use super::SqlGenerator;
use crate::dialect::DialectConfig;
use crate::emitter::Statement;
use crate::error::{DdlError, Result};
use crate::fragments;
use crate::metadata::MetadataView;
use crate::operation::{InsertDataOp, RawSqlOp};

impl SqlGenerator {
    /// Passes SQL through after normalising line breaks.
    ///
    /// A backslash directly before a line break joins the two lines.
    pub(super) fn raw_sql(&self, op: &RawSqlOp) -> Vec<Statement> {
        let sql = op.sql.replace("\r\n", "\n").replace("\\\n", "");
        let sql = sql.trim_end();
        let sql = sql
            .strip_suffix(self.dialect.statement_terminator.as_str())
            .unwrap_or(sql)
            .trim_end();
        if sql.is_empty() {
            return Vec::new();
        }
        vec![Statement::new(sql)]
    }

    pub(super) fn insert_data(
        &self,
        op: &InsertDataOp,
        description: &str,
        metadata: &dyn MetadataView,
    ) -> Result<Vec<Statement>> {
        if op.columns.is_empty() {
            return Err(DdlError::invalid(description, "no columns to insert into"));
        }
        if let Some(row) = op.rows.iter().position(|r| r.len() != op.columns.len()) {
            return Err(DdlError::invalid(
                description,
                format!(
                    "row {row} has {} value(s) for {} column(s)",
                    op.rows[row].len(),
                    op.columns.len()
                ),
            ));
        }
        if op.rows.is_empty() {
            return Ok(Vec::new());
        }

        let d = &self.dialect;
        let schema = op.schema.as_deref();
        let table = d.qualify(&op.table, schema);
        let rows: Vec<String> = op
            .rows
            .iter()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| d.literal(v, true)).collect();
                format!("({})", values.join(", "))
            })
            .collect();
        let insert = Statement::new(format!(
            "INSERT INTO {table} ({})\nVALUES {}",
            fragments::column_list(d, &op.columns),
            rows.join(",\n       ")
        ));

        let identity_insert = d.identity_insert
            && metadata.table(&op.table, schema).is_none_or(|t| {
                op.columns.iter().any(|c| t.is_identity_column(c))
            });
        if !identity_insert {
            return Ok(vec![insert]);
        }

        let guard = |state: &str| {
            Statement::new(format!(
                "IF EXISTS (SELECT * FROM {}.{} WHERE {} = OBJECT_ID({}))\n    SET IDENTITY_INSERT {table} {state}",
                d.quote_identifier("sys"),
                d.quote_identifier("identity_columns"),
                d.quote_identifier("object_id"),
                d.string_literal(
                    &DialectConfig::object_path(&[schema, Some(&op.table)]),
                    true
                ),
            ))
        };
        Ok(vec![guard("ON"), insert, guard("OFF")])
    }
}

#[cfg(test)]
mod tests {
    use crate::metadata::{SchemaMetadata, TableMetadata};
    use crate::operation::{InsertDataOp, Operation};
    use crate::value::SqlValue;
    use crate::SqlGenerator;

    #[test]
    fn test_raw_sql_strips_trailing_terminator() {
        let script = SqlGenerator::oracle()
            .generate(&[Operation::raw_sql("DELETE FROM \"Logs\";  \r\n")], &SchemaMetadata::new())
            .unwrap();
        assert_eq!(script.statements(), vec!["DELETE FROM \"Logs\""]);
        assert_eq!(script.to_sql(), "DELETE FROM \"Logs\";\n");
    }

    #[test]
    fn test_blank_raw_sql_emits_nothing() {
        let script = SqlGenerator::oracle()
            .generate(&[Operation::raw_sql("  \n")], &SchemaMetadata::new())
            .unwrap();
        assert!(script.is_empty());
    }

    #[test]
    fn test_insert_without_identity_columns() {
        let meta = SchemaMetadata::new().with_table(
            TableMetadata::new("Tags").column("Name"),
        );
        let op = InsertDataOp::new("Tags", vec!["Name".to_string()])
            .row(vec![SqlValue::from("rust")]);
        let script = SqlGenerator::sql_server().generate(&[op.into()], &meta).unwrap();
        assert_eq!(
            script.statements(),
            vec!["INSERT INTO [Tags] ([Name])\nVALUES (N'rust')"]
        );
    }

    #[test]
    fn test_insert_row_width_mismatch() {
        let op = InsertDataOp::new("Tags", vec!["Id".to_string(), "Name".to_string()])
            .row(vec![SqlValue::from(1)]);
        let err = SqlGenerator::oracle()
            .generate(&[op.into()], &SchemaMetadata::new())
            .unwrap_err();
        assert!(err.to_string().contains("row 0 has 1 value(s) for 2 column(s)"));
    }
}
