//! Index error types
//!
//! Error codes:
//! - TABLEDB_INDEX_INVALID_ORDER (ERROR)
//! - TABLEDB_INDEX_UNSORTED_INPUT (ERROR)
//! - TABLEDB_INDEX_CORRUPTION (FATAL)

use std::fmt;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller contract violation, nothing was mutated
    Error,
    /// Structural invariant broken; indicates a maintenance bug
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

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Branching factor below 2
    InvalidOrder,
    /// Bulk construction input not sorted by key
    UnsortedInput,
    /// Validation found a broken invariant
    Corruption,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::InvalidOrder => "TABLEDB_INDEX_INVALID_ORDER",
            IndexErrorCode::UnsortedInput => "TABLEDB_INDEX_UNSORTED_INPUT",
            IndexErrorCode::Corruption => "TABLEDB_INDEX_CORRUPTION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            IndexErrorCode::Corruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug, Clone)]
pub struct IndexError {
    code: IndexErrorCode,
    message: String,
}

impl IndexError {
    /// Create an invalid order error
    pub fn invalid_order(order: usize) -> Self {
        Self {
            code: IndexErrorCode::InvalidOrder,
            message: format!("B+Tree order must be at least 2, got {}", order),
        }
    }

    /// Create an unsorted bulk input error
    pub fn unsorted_input(position: usize, previous: i32, key: i32) -> Self {
        Self {
            code: IndexErrorCode::UnsortedInput,
            message: format!(
                "Bulk load input not sorted at position {}: {} follows {}",
                position, key, previous
            ),
        }
    }

    /// Create a corruption error (FATAL)
    pub fn corruption(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::Corruption,
            message: reason.into(),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
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

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(IndexErrorCode::InvalidOrder.code(), "TABLEDB_INDEX_INVALID_ORDER");
        assert_eq!(IndexErrorCode::UnsortedInput.code(), "TABLEDB_INDEX_UNSORTED_INPUT");
        assert_eq!(IndexErrorCode::Corruption.code(), "TABLEDB_INDEX_CORRUPTION");
    }

    #[test]
    fn test_only_corruption_is_fatal() {
        assert!(!IndexError::invalid_order(1).is_fatal());
        assert!(!IndexError::unsorted_input(3, 9, 2).is_fatal());
        assert!(IndexError::corruption("leaf depth mismatch").is_fatal());
    }

    #[test]
    fn test_error_display() {
        let err = IndexError::corruption("keys out of order");
        let display = format!("{}", err);
        assert!(display.contains("TABLEDB_INDEX_CORRUPTION"));
        assert!(display.contains("FATAL"));
        assert!(display.contains("keys out of order"));
    }
}
