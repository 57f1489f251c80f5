//! Schema and principal administration.

use super::SqlGenerator;
use crate::dialect::AdminSyntax;
use crate::emitter::Statement;
use crate::error::{DdlError, Result};
use crate::operation::{CreatePrincipalOp, CreateSchemaOp, DropPrincipalOp};

/// Escapes text for a single-quoted dynamic SQL string.
fn escape(sql: &str) -> String {
    sql.replace('\'', "''")
}

fn require_name<'a>(name: &'a str, description: &str) -> Result<&'a str> {
    if name.trim().is_empty() {
        return Err(DdlError::invalid(description, "principal name is empty"));
    }
    Ok(name)
}

impl SqlGenerator {
    /// Ensures a schema exists. Emits nothing for the default schema or on
    /// dialects without schemas.
    pub(super) fn create_schema(&self, op: &CreateSchemaOp) -> Vec<Statement> {
        let d = &self.dialect;
        if !d.supports_schemas || d.is_default_schema(&op.name) {
            return Vec::new();
        }
        let sql = match d.admin {
            AdminSyntax::TransactSql => {
                let create = format!(
                    "CREATE SCHEMA {}{}",
                    d.quote_identifier(&op.name),
                    d.statement_terminator
                );
                format!(
                    "IF SCHEMA_ID({}) IS NULL EXEC({})",
                    d.string_literal(&op.name, true),
                    d.string_literal(&create, true)
                )
            }
            AdminSyntax::PlSql => format!("CREATE SCHEMA {}", d.quote_identifier(&op.name)),
        };
        vec![Statement::new(sql)]
    }

    pub(super) fn create_principal(
        &self,
        op: &CreatePrincipalOp,
        description: &str,
    ) -> Result<Vec<Statement>> {
        let name = require_name(&op.name, description)?;
        let password = op.password.as_deref().unwrap_or(name);
        let d = &self.dialect;
        let grants = if op.grants.is_empty() {
            &d.default_grants
        } else {
            &op.grants
        };

        let block = match d.admin {
            AdminSyntax::PlSql => {
                let mut lines = vec![
                    "BEGIN".to_string(),
                    format!(
                        "  EXECUTE IMMEDIATE '{}';",
                        escape(&format!("CREATE USER {name} IDENTIFIED BY {password}"))
                    ),
                ];
                lines.extend(grants.iter().map(|grant| {
                    format!(
                        "  EXECUTE IMMEDIATE '{}';",
                        escape(&format!("GRANT {grant} TO {name}"))
                    )
                }));
                lines.push("END;".to_string());
                lines.join("\n")
            }
            AdminSyntax::TransactSql => {
                let principal = d.quote_identifier(name);
                let mut lines = vec![
                    "BEGIN".to_string(),
                    format!(
                        "    CREATE LOGIN {principal} WITH PASSWORD = {};",
                        d.string_literal(password, true)
                    ),
                    format!("    CREATE USER {principal} FOR LOGIN {principal};"),
                ];
                lines.extend(grants.iter().map(|role| {
                    format!(
                        "    ALTER ROLE {} ADD MEMBER {principal};",
                        d.quote_identifier(role)
                    )
                }));
                lines.push("END;".to_string());
                lines.join("\n")
            }
        };
        Ok(vec![Statement::block(block)])
    }

    pub(super) fn drop_principal(
        &self,
        op: &DropPrincipalOp,
        description: &str,
    ) -> Result<Vec<Statement>> {
        let name = require_name(&op.name, description)?;
        let d = &self.dialect;

        let block = match d.admin {
            AdminSyntax::PlSql => [
                "BEGIN".to_string(),
                format!(
                    "  FOR v_cur IN (SELECT sid, serial# FROM v$session WHERE username = '{}') LOOP",
                    escape(&name.to_uppercase())
                ),
                "    EXECUTE IMMEDIATE ('ALTER SYSTEM KILL SESSION ''' || v_cur.sid || ',' || v_cur.serial# || ''' IMMEDIATE');".to_string(),
                "  END LOOP;".to_string(),
                format!(
                    "  EXECUTE IMMEDIATE '{}';",
                    escape(&format!("DROP USER {name} CASCADE"))
                ),
                "END;".to_string(),
            ]
            .join("\n"),
            AdminSyntax::TransactSql => {
                let principal = d.quote_identifier(name);
                [
                    "BEGIN".to_string(),
                    "    DECLARE @sessions nvarchar(max) = N'';".to_string(),
                    format!(
                        "    SELECT @sessions = @sessions + N'KILL ' + CAST({} AS nvarchar(10)) + N';'",
                        d.quote_identifier("session_id")
                    ),
                    format!(
                        "    FROM {}.{}",
                        d.quote_identifier("sys"),
                        d.quote_identifier("dm_exec_sessions")
                    ),
                    format!(
                        "    WHERE {} = {};",
                        d.quote_identifier("login_name"),
                        d.string_literal(name, true)
                    ),
                    "    EXEC(@sessions);".to_string(),
                    format!("    DROP USER IF EXISTS {principal};"),
                    format!("    DROP LOGIN {principal};"),
                    "END;".to_string(),
                ]
                .join("\n")
            }
        };
        Ok(vec![Statement::block(block)])
    }
}

#[cfg(test)]
mod tests {
    use crate::dialect::DialectConfig;
    use crate::metadata::SchemaMetadata;
    use crate::operation::{CreatePrincipalOp, Operation};
    use crate::SqlGenerator;

    fn statements(generator: &SqlGenerator, op: Operation) -> Vec<String> {
        generator
            .generate(&[op], &SchemaMetadata::new())
            .unwrap()
            .statements()
            .into_iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_schema_creation() {
        let mssql = SqlGenerator::sql_server();
        assert_eq!(
            statements(&mssql, Operation::create_schema("my")),
            vec!["IF SCHEMA_ID(N'my') IS NULL EXEC(N'CREATE SCHEMA [my];')"]
        );
        assert!(statements(&mssql, Operation::create_schema("dbo")).is_empty());
        assert!(statements(&SqlGenerator::oracle(), Operation::create_schema("my")).is_empty());
    }

    #[test]
    fn test_plsql_schema_creation() {
        let mut dialect = DialectConfig::oracle();
        dialect.supports_schemas = true;
        assert_eq!(
            statements(&SqlGenerator::new(dialect), Operation::create_schema("hr")),
            vec!["CREATE SCHEMA \"hr\""]
        );
    }

    #[test]
    fn test_tsql_principal() {
        let op = CreatePrincipalOp::new("Northwind")
            .password("s3cr'et")
            .grant("db_owner");
        assert_eq!(
            statements(&SqlGenerator::sql_server(), op.into()),
            vec![
                "BEGIN\n    CREATE LOGIN [Northwind] WITH PASSWORD = N's3cr''et';\n    CREATE USER [Northwind] FOR LOGIN [Northwind];\n    ALTER ROLE [db_owner] ADD MEMBER [Northwind];\nEND;"
            ]
        );
    }

    #[test]
    fn test_principal_without_grants_gets_dialect_default() {
        let sql = statements(&SqlGenerator::oracle(), CreatePrincipalOp::new("Northwind").into());
        assert_eq!(
            sql,
            vec![
                "BEGIN\n  EXECUTE IMMEDIATE 'CREATE USER Northwind IDENTIFIED BY Northwind';\n  EXECUTE IMMEDIATE 'GRANT DBA TO Northwind';\nEND;"
            ]
        );

        let mut dialect = DialectConfig::sql_server();
        dialect.default_grants.clear();
        let sql = statements(&SqlGenerator::new(dialect), CreatePrincipalOp::new("Northwind").into());
        assert!(!sql[0].contains("ALTER ROLE"));
    }

    #[test]
    fn test_tsql_drop_principal() {
        let sql = statements(&SqlGenerator::sql_server(), Operation::drop_principal("Northwind"));
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("FROM [sys].[dm_exec_sessions]"));
        assert!(sql[0].contains("WHERE [login_name] = N'Northwind';"));
        assert!(sql[0].ends_with("DROP USER IF EXISTS [Northwind];\n    DROP LOGIN [Northwind];\nEND;"));
    }

    #[test]
    fn test_empty_principal_name() {
        let err = SqlGenerator::oracle()
            .generate(&[Operation::drop_principal(" ")], &SchemaMetadata::new())
            .unwrap_err();
        assert!(err.to_string().contains("principal name is empty"));
    }
}
