//! Custom dialect configurations loaded from JSON.

mod common;

use common::*;
use oxide_ddl::prelude::*;

fn custom_dialect() -> DialectConfig {
    let mut config = DialectConfig::oracle();
    config.name = "oracle-native".to_string();
    config.batch_separator = None;
    config.renames = RenameSyntax::AlterStatement;
    config.drop_index = DropIndexSyntax::SchemaQualified;
    config.default_constraints = DefaultConstraintStyle::Inline;
    config.identity_insert = false;
    config
}

#[test]
fn load_custom_dialect_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("oracle-native.json");
    std::fs::write(&path, serde_json::to_string_pretty(&custom_dialect()).unwrap()).unwrap();

    let config = DialectConfig::load(&path).unwrap();
    assert_eq!(config, custom_dialect());

    let generator = SqlGenerator::new(config);
    let ops = [
        Operation::alter_column(
            "People",
            ColumnDefinition::new("Name", LogicalType::String).max_length(64),
        ),
        Operation::rename_column("People", "Name", "FullName"),
        DropIndexOp {
            name: "IX_People_Name".to_string(),
            table: "People".to_string(),
            schema: Some("hr".to_string()),
        }
        .into(),
        InsertDataOp::new("People", cols(&["Id"]))
            .row(vec![SqlValue::from(1)])
            .into(),
    ];
    let script = generator.generate(&ops, &SchemaMetadata::new()).unwrap();
    assert_eq!(script.batch_count(), 0);
    assert_eq!(
        script.statements(),
        vec![
            "ALTER TABLE \"People\" ALTER COLUMN \"Name\" NVARCHAR2(64) NULL",
            "ALTER TABLE \"People\" RENAME COLUMN \"Name\" TO \"FullName\"",
            "DROP INDEX \"hr\".\"IX_People_Name\"",
            "INSERT INTO \"People\" (\"Id\")\nVALUES (1)",
        ]
    );
}

#[test]
fn incomplete_dialect_is_rejected_on_load() {
    let mut json = serde_json::to_value(DialectConfig::sql_server()).unwrap();
    json["types"]["scalars"]
        .as_object_mut()
        .unwrap()
        .remove("time");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, json.to_string()).unwrap();

    let err = DialectConfig::load(&path).unwrap_err();
    assert!(matches!(err, DdlError::InvalidDialectConfig { .. }));
    assert!(err.to_string().contains("time"));
}

#[test]
fn malformed_dialect_json() {
    let err = DialectConfig::from_json("{\"name\": \"x\"}").unwrap_err();
    assert!(matches!(err, DdlError::Serialization(_)));
}

#[test]
fn generators_do_not_share_state() {
    let oracle_gen = oracle();
    let mssql_gen = sql_server();
    let op = Operation::drop_index("IX_People_Name", "People");
    assert_eq!(
        single(&oracle_gen, op.clone()),
        "DROP INDEX \"IX_People_Name\" ON \"People\""
    );
    assert_eq!(single(&mssql_gen, op.clone()), "DROP INDEX [IX_People_Name] ON [People]");
    assert_eq!(
        single(&oracle_gen, op),
        "DROP INDEX \"IX_People_Name\" ON \"People\""
    );
}
