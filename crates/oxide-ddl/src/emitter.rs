//! Ordered statement buffer.
//!
//! A [`Script`] is append-only: statements are kept in emission order and
//! batch separators are inserted where a later statement must not share a
//! batch with an earlier one. Terminators are added only when rendering.

use std::fmt;

use crate::dialect::DialectConfig;

/// Whether the terminator is appended on render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// An ordinary statement; the dialect terminator is appended.
    Plain,
    /// A procedural block that carries its own terminator.
    Block,
}

/// One generated statement, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    kind: StatementKind,
}

impl Statement {
    /// Creates a plain statement.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: StatementKind::Plain,
        }
    }

    /// Creates a procedural block.
    #[must_use]
    pub fn block(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            kind: StatementKind::Block,
        }
    }

    /// Statement text.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Statement kind.
    #[must_use]
    pub const fn kind(&self) -> StatementKind {
        self.kind
    }

    /// Returns true if the last line carries a `--` comment.
    #[must_use]
    pub fn ends_in_line_comment(&self) -> bool {
        self.sql.lines().last().is_some_and(|line| line.contains("--"))
    }
}

/// An entry in a [`Script`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEntry {
    /// A statement.
    Statement(Statement),
    /// A batch separator.
    BatchSeparator,
}

/// The generated script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    entries: Vec<ScriptEntry>,
    terminator: String,
    separator: Option<String>,
}

impl Script {
    /// Creates an empty script using the dialect's terminator and separator.
    #[must_use]
    pub fn new(dialect: &DialectConfig) -> Self {
        Self {
            entries: Vec::new(),
            terminator: dialect.statement_terminator.clone(),
            separator: dialect.batch_separator.clone(),
        }
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.entries.push(ScriptEntry::Statement(statement));
    }

    /// Appends statements in order.
    pub fn extend(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.entries
            .extend(statements.into_iter().map(ScriptEntry::Statement));
    }

    /// Ends the current batch.
    ///
    /// Does nothing when the dialect has no separator, the script is empty
    /// or the batch was already ended.
    pub fn end_batch(&mut self) {
        if self.separator.is_none() {
            return;
        }
        if matches!(self.entries.last(), Some(ScriptEntry::Statement(_))) {
            self.entries.push(ScriptEntry::BatchSeparator);
        }
    }

    /// All entries in order.
    #[must_use]
    pub fn entries(&self) -> &[ScriptEntry] {
        &self.entries
    }

    /// Statement texts in order, without terminators or separators.
    #[must_use]
    pub fn statements(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                ScriptEntry::Statement(s) => Some(s.sql()),
                ScriptEntry::BatchSeparator => None,
            })
            .collect()
    }

    /// Number of batch separators.
    #[must_use]
    pub fn batch_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ScriptEntry::BatchSeparator))
            .count()
    }

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements().len()
    }

    /// Returns true if no statements were emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders the script as text.
    #[must_use]
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            match entry {
                ScriptEntry::Statement(s) => {
                    out.push_str(s.sql());
                    if s.kind() == StatementKind::Plain {
                        // A terminator after a line comment would be commented out.
                        if s.ends_in_line_comment() {
                            out.push('\n');
                        }
                        out.push_str(&self.terminator);
                    }
                    out.push('\n');
                }
                ScriptEntry::BatchSeparator => {
                    if let Some(sep) = &self.separator {
                        out.push_str(sep);
                        out.push_str("\n\n");
                    }
                }
            }
        }
        out
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_terminators_and_separators() {
        let mut script = Script::new(&DialectConfig::sql_server());
        script.push(Statement::new("ALTER TABLE [People] ALTER COLUMN [Name] int NULL"));
        script.end_batch();
        script.push(Statement::block("BEGIN\n    SELECT 1;\nEND;"));
        assert_eq!(
            script.to_sql(),
            "ALTER TABLE [People] ALTER COLUMN [Name] int NULL;\nGO\n\nBEGIN\n    SELECT 1;\nEND;\n"
        );
        assert_eq!(script.len(), 2);
        assert_eq!(script.batch_count(), 1);
    }

    #[test]
    fn test_terminator_after_trailing_line_comment() {
        let mut script = Script::new(&DialectConfig::oracle());
        script.push(Statement::new("UPDATE \"T\" SET \"A\" = 1 -- backfill"));
        script.push(Statement::new("-- Multiline comment\nSELECT 1 FROM DUAL"));
        assert_eq!(
            script.to_sql(),
            "UPDATE \"T\" SET \"A\" = 1 -- backfill\n;\n-- Multiline comment\nSELECT 1 FROM DUAL;\n"
        );
    }

    #[test]
    fn test_end_batch_is_idempotent() {
        let mut script = Script::new(&DialectConfig::oracle());
        script.end_batch();
        assert!(script.entries().is_empty());
        script.push(Statement::new("DROP TABLE \"People\""));
        script.end_batch();
        script.end_batch();
        assert_eq!(script.batch_count(), 1);
    }

    #[test]
    fn test_no_separator_dialect() {
        let mut dialect = DialectConfig::oracle();
        dialect.batch_separator = None;
        let mut script = Script::new(&dialect);
        script.push(Statement::new("DROP TABLE \"People\""));
        script.end_batch();
        assert_eq!(script.batch_count(), 0);
        assert_eq!(script.to_sql(), "DROP TABLE \"People\";\n");
    }

    #[test]
    fn test_empty_script() {
        let script = Script::new(&DialectConfig::oracle());
        assert!(script.is_empty());
        assert_eq!(script.to_string(), "");
    }
}
