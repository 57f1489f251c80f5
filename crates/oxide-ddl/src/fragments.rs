//! Statement fragments shared by the generator and the dependency resolver.

use crate::dialect::{DialectConfig, DropIndexSyntax};

pub fn column_list(dialect: &DialectConfig, columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| dialect.quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn create_index(
    dialect: &DialectConfig,
    name: &str,
    table: &str,
    schema: Option<&str>,
    columns: &[String],
    unique: bool,
    filter: Option<&str>,
) -> String {
    let mut sql = format!(
        "CREATE {}INDEX {} ON {} ({})",
        if unique { "UNIQUE " } else { "" },
        dialect.quote_identifier(name),
        dialect.qualify(table, schema),
        column_list(dialect, columns)
    );
    if let Some(filter) = filter {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    sql
}

pub fn drop_index(
    dialect: &DialectConfig,
    name: &str,
    table: &str,
    schema: Option<&str>,
) -> String {
    match dialect.drop_index {
        DropIndexSyntax::OnTable => format!(
            "DROP INDEX {} ON {}",
            dialect.quote_identifier(name),
            dialect.qualify(table, schema)
        ),
        DropIndexSyntax::SchemaQualified => {
            format!("DROP INDEX {}", dialect.qualify(name, schema))
        }
    }
}

pub fn add_unique_constraint(
    dialect: &DialectConfig,
    name: &str,
    table: &str,
    schema: Option<&str>,
    columns: &[String],
) -> String {
    format!(
        "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
        dialect.qualify(table, schema),
        dialect.quote_identifier(name),
        column_list(dialect, columns)
    )
}

pub fn drop_constraint(
    dialect: &DialectConfig,
    name: &str,
    table: &str,
    schema: Option<&str>,
) -> String {
    format!(
        "ALTER TABLE {} DROP CONSTRAINT {}",
        dialect.qualify(table, schema),
        dialect.quote_identifier(name)
    )
}

pub fn primary_key(
    dialect: &DialectConfig,
    name: Option<&str>,
    columns: &[String],
) -> String {
    match name {
        Some(name) => format!(
            "CONSTRAINT {} PRIMARY KEY ({})",
            dialect.quote_identifier(name),
            column_list(dialect, columns)
        ),
        None => format!("PRIMARY KEY ({})", column_list(dialect, columns)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_create_index() {
        let oracle = DialectConfig::oracle();
        assert_eq!(
            create_index(
                &oracle,
                "IX_People_Name",
                "People",
                None,
                &cols(&["FirstName", "LastName"]),
                true,
                None
            ),
            "CREATE UNIQUE INDEX \"IX_People_Name\" ON \"People\" (\"FirstName\", \"LastName\")"
        );
        assert_eq!(
            create_index(
                &oracle,
                "IX_Active",
                "People",
                Some("dbo"),
                &cols(&["Active"]),
                false,
                Some("\"Active\" = 1")
            ),
            "CREATE INDEX \"IX_Active\" ON \"dbo\".\"People\" (\"Active\") WHERE \"Active\" = 1"
        );
    }

    #[test]
    fn test_drop_index_forms() {
        let mut dialect = DialectConfig::oracle();
        assert_eq!(
            drop_index(&dialect, "IX_People_Name", "People", None),
            "DROP INDEX \"IX_People_Name\" ON \"People\""
        );
        dialect.drop_index = DropIndexSyntax::SchemaQualified;
        assert_eq!(
            drop_index(&dialect, "IX_People_Name", "People", Some("hr")),
            "DROP INDEX \"hr\".\"IX_People_Name\""
        );
    }

    #[test]
    fn test_constraints() {
        let mssql = DialectConfig::sql_server();
        assert_eq!(
            add_unique_constraint(&mssql, "AK_Email", "People", None, &cols(&["Email"])),
            "ALTER TABLE [People] ADD CONSTRAINT [AK_Email] UNIQUE ([Email])"
        );
        assert_eq!(
            drop_constraint(&mssql, "AK_Email", "People", Some("dbo")),
            "ALTER TABLE [dbo].[People] DROP CONSTRAINT [AK_Email]"
        );
        assert_eq!(
            primary_key(&mssql, None, &cols(&["Id"])),
            "PRIMARY KEY ([Id])"
        );
    }
}
