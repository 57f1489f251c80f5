//! Dialect-specific DDL generation for schema migrations.
//!
//! `oxide-ddl` turns an ordered list of schema-change operations into the
//! SQL script that performs them on a target database. It never talks to a
//! database: anything it needs to know about existing objects comes from a
//! [`MetadataView`].
//!
//! # Architecture
//!
//! - **Operations** - `CreateTable`, `AlterColumn`, `RenameIndex`, ...
//!   (see [`Operation`])
//! - **Dialect** - A [`DialectConfig`] data bundle: quoting, native type
//!   tables, identity and default syntax, rename idioms
//! - **Resolver** - Works out the indexes, unique constraints and default
//!   constraints that must be dropped and recreated around a column change
//! - **Generator** - Dispatches each operation to its producer and collects
//!   the statements into a [`Script`]
//!
//! # Example
//!
//! ```rust
//! use oxide_ddl::prelude::*;
//!
//! let generator = SqlGenerator::oracle();
//! let ops = vec![
//!     Operation::add_column(
//!         "Person",
//!         ColumnDefinition::new("RowVersion", LogicalType::Binary).row_version(),
//!     ),
//!     Operation::create_index(
//!         "IX_People_Name",
//!         "People",
//!         vec!["FirstName".to_string(), "LastName".to_string()],
//!         true,
//!     ),
//! ];
//!
//! let script = generator.generate(&ops, &SchemaMetadata::new()).unwrap();
//! assert_eq!(
//!     script.statements(),
//!     vec![
//!         "ALTER TABLE \"Person\" ADD \"RowVersion\" RAW(8) NULL",
//!         "CREATE UNIQUE INDEX \"IX_People_Name\" ON \"People\" (\"FirstName\", \"LastName\")",
//!     ]
//! );
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Generate a script from a JSON operation list
//! oxide-ddl generate --dialect oracle --operations ops.json --metadata schema.json
//!
//! # Print a preset dialect configuration as JSON
//! oxide-ddl show-dialect --dialect sql-server
//! ```

pub mod column;
pub mod dialect;
pub mod emitter;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod operation;
pub mod resolver;
pub mod value;

mod fragments;

pub use column::{ColumnDefinition, LogicalType, ValueGeneration};
pub use dialect::DialectConfig;
pub use emitter::{Script, Statement};
pub use error::{DdlError, Result};
pub use generator::SqlGenerator;
pub use metadata::{MetadataView, SchemaMetadata, TableMetadata};
pub use operation::Operation;
pub use value::{ColumnDefault, SqlValue};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::column::{
        Annotations, ColumnDefinition, LogicalType, ValueGeneration, IDENTITY_INCREMENT,
        IDENTITY_SEED,
    };
    pub use crate::dialect::{
        AdminSyntax, DefaultConstraintStyle, DialectConfig, DropIndexSyntax, IdentitySyntax,
        RenameSyntax,
    };
    pub use crate::emitter::{Script, ScriptEntry, Statement, StatementKind};
    pub use crate::error::{DdlError, Result};
    pub use crate::generator::SqlGenerator;
    pub use crate::metadata::{
        DefaultSchemaView, IndexMetadata, MetadataView, SchemaMetadata, TableMetadata,
    };
    pub use crate::operation::{
        AddColumnOp, AddPrimaryKeyOp, AlterColumnOp, CreateIndexOp, CreatePrincipalOp,
        CreateSchemaOp, CreateTableOp, DropColumnOp, DropIndexOp, DropPrincipalOp, DropTableOp,
        InsertDataOp, Operation, PrimaryKeyDefinition, RawSqlOp, RenameColumnOp, RenameIndexOp,
        RenameSequenceOp, RenameTableOp,
    };
    pub use crate::value::{ColumnDefault, SqlValue};
}
