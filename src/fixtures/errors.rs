//! Fixture errors

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

use crate::index::IndexError;
use crate::table::TableError;

/// Result type for fixture operations
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Fixture errors
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}, field {field}: '{value}' is not an integer")]
    Parse {
        line: usize,
        field: usize,
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("CSV error at line {line}: {source}")]
    Csv {
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Line {line} has {found} fields, expected {expected}")]
    RaggedRow {
        line: usize,
        found: usize,
        expected: usize,
    },

    #[error("Check failed: {0}")]
    CheckFailed(String),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

impl FixtureError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FixtureError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(source: csv::Error) -> Self {
        let line = source.position().map_or(0, |pos| pos.line());
        FixtureError::Csv { line, source }
    }
}
