//! Benchmark errors

use std::path::PathBuf;

use thiserror::Error;

use crate::table::TableError;

/// Result type for benchmark runs
pub type BenchResult<T> = Result<T, BenchError>;

/// Benchmark errors
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Failed to write results to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}
