//! Error types for DDL generation.

use thiserror::Error;

/// Errors that can occur while generating a migration script.
///
/// Generation is all-or-nothing: when any operation fails, no script is
/// returned for the list it belongs to.
#[derive(Debug, Error)]
pub enum DdlError {
    /// A column's value-generation strategy was changed by an alter.
    #[error(
        "{operation}: cannot change the value generation strategy of column '{column}' \
         from {from} to {to}; identity columns must be dropped and re-created"
    )]
    UnsupportedTransition {
        /// Description of the failing operation.
        operation: String,
        /// The altered column.
        column: String,
        /// Strategy before the alter.
        from: String,
        /// Strategy requested by the alter.
        to: String,
    },

    /// An operation lacks context it cannot be generated without.
    #[error("{operation}: {missing} is required but was not supplied")]
    MissingRequiredContext {
        /// Description of the failing operation.
        operation: String,
        /// What is missing (e.g. "owning table").
        missing: String,
    },

    /// A logical type and facet combination has no native mapping.
    #[error("no native type for {logical_type} with {facets} in dialect '{dialect}'")]
    UnmappableFacetCombination {
        /// Dialect name.
        dialect: String,
        /// Logical type being mapped.
        logical_type: String,
        /// The offending facets.
        facets: String,
    },

    /// The operation itself is malformed.
    #[error("{operation}: {message}")]
    InvalidOperation {
        /// Description of the failing operation.
        operation: String,
        /// What is wrong with it.
        message: String,
    },

    /// A dialect configuration is incomplete or inconsistent.
    #[error("invalid dialect configuration '{dialect}': {message}")]
    InvalidDialectConfig {
        /// Dialect name.
        dialect: String,
        /// What is wrong with it.
        message: String,
    },

    /// IO error (reading operation, metadata or dialect files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DdlError {
    /// Creates a [`DdlError::MissingRequiredContext`].
    pub(crate) fn missing(operation: impl Into<String>, missing: impl Into<String>) -> Self {
        Self::MissingRequiredContext {
            operation: operation.into(),
            missing: missing.into(),
        }
    }

    /// Creates a [`DdlError::InvalidOperation`].
    pub(crate) fn invalid(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Result type for DDL generation.
pub type Result<T> = std::result::Result<T, DdlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_transition_message() {
        let err = DdlError::UnsupportedTransition {
            operation: "Alter column 'Id' in table 'Person'".to_string(),
            column: "Id".to_string(),
            from: "none".to_string(),
            to: "identity".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Alter column 'Id' in table 'Person'"));
        assert!(msg.contains("from none to identity"));
    }

    #[test]
    fn test_missing_context_message() {
        let err = DdlError::missing("Rename index 'IX_Old'", "owning table");
        assert_eq!(
            err.to_string(),
            "Rename index 'IX_Old': owning table is required but was not supplied"
        );
    }
}
