//! Table error types
//!
//! Error codes:
//! - TABLEDB_UNKNOWN_ATTRIBUTE (ERROR)
//! - TABLEDB_SCHEMA_MISMATCH (ERROR)
//! - TABLEDB_INVALID_CONFIG (ERROR)
//! - TABLEDB_INDEX_* (severity of the underlying index error)
//! - TABLEDB_INDEX_INCONSISTENT (FATAL)
//!
//! Every ERROR is raised before the table is mutated.

use std::fmt;

use crate::index::{IndexError, IndexErrorCode};

/// Severity levels for table errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller contract violation; table unchanged
    Error,
    /// Index and storage diverged; indicates a bug
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Table-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableErrorCode {
    /// Attribute not in the table's attribute set
    UnknownAttribute,
    /// Tuple columns differ from the attribute set
    SchemaMismatch,
    /// Invalid construction parameters
    InvalidConfig,
    /// Error raised by an index
    Index(IndexErrorCode),
    /// Index contents disagree with storage
    IndexInconsistent,
}

impl TableErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            TableErrorCode::UnknownAttribute => "TABLEDB_UNKNOWN_ATTRIBUTE",
            TableErrorCode::SchemaMismatch => "TABLEDB_SCHEMA_MISMATCH",
            TableErrorCode::InvalidConfig => "TABLEDB_INVALID_CONFIG",
            TableErrorCode::Index(code) => code.code(),
            TableErrorCode::IndexInconsistent => "TABLEDB_INDEX_INCONSISTENT",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            TableErrorCode::Index(IndexErrorCode::Corruption) | TableErrorCode::IndexInconsistent => {
                Severity::Fatal
            }
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for TableErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Table error type with full context
#[derive(Debug, Clone)]
pub struct TableError {
    code: TableErrorCode,
    message: String,
}

impl TableError {
    /// Create an unknown attribute error
    pub fn unknown_attribute(table: &str, attribute: &str) -> Self {
        Self {
            code: TableErrorCode::UnknownAttribute,
            message: format!("Table '{}' has no attribute '{}'", table, attribute),
        }
    }

    /// Create a schema mismatch error
    pub fn schema_mismatch(table: &str, reason: impl Into<String>) -> Self {
        Self {
            code: TableErrorCode::SchemaMismatch,
            message: format!("Tuple does not match table '{}': {}", table, reason.into()),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self {
            code: TableErrorCode::InvalidConfig,
            message: reason.into(),
        }
    }

    /// Create an index/storage divergence error (FATAL)
    pub fn index_inconsistent(attribute: &str, reason: impl Into<String>) -> Self {
        Self {
            code: TableErrorCode::IndexInconsistent,
            message: format!("Index on '{}' diverged from storage: {}", attribute, reason.into()),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> TableErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl From<IndexError> for TableError {
    fn from(err: IndexError) -> Self {
        Self {
            code: TableErrorCode::Index(err.code()),
            message: err.message().to_string(),
        }
    }
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for TableError {}

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(TableErrorCode::UnknownAttribute.code(), "TABLEDB_UNKNOWN_ATTRIBUTE");
        assert_eq!(TableErrorCode::SchemaMismatch.code(), "TABLEDB_SCHEMA_MISMATCH");
        assert_eq!(TableErrorCode::InvalidConfig.code(), "TABLEDB_INVALID_CONFIG");
        assert_eq!(
            TableErrorCode::Index(IndexErrorCode::InvalidOrder).code(),
            "TABLEDB_INDEX_INVALID_ORDER"
        );
    }

    #[test]
    fn test_index_error_keeps_severity() {
        let err = TableError::from(IndexError::corruption("bad separator"));
        assert!(err.is_fatal());
        assert_eq!(err.code().code(), "TABLEDB_INDEX_CORRUPTION");

        let err = TableError::from(IndexError::invalid_order(1));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = TableError::unknown_attribute("t", "Z");
        let display = err.to_string();
        assert!(display.starts_with("[ERROR] TABLEDB_UNKNOWN_ATTRIBUTE"));
        assert!(display.contains("'Z'"));
    }
}
