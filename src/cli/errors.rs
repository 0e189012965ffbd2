//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero status.

use std::fmt;
use std::io;

use crate::bench::BenchError;
use crate::config::ConfigError;
use crate::fixtures::FixtureError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdout, result files)
    IoError,
    /// A benchmark could not run
    BenchFailed,
    /// A fixture could not be loaded or exported
    FixtureFailed,
    /// One or more scenario checks failed
    ChecksFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "TABLEDB_CLI_CONFIG_ERROR",
            Self::IoError => "TABLEDB_CLI_IO_ERROR",
            Self::BenchFailed => "TABLEDB_CLI_BENCH_FAILED",
            Self::FixtureFailed => "TABLEDB_CLI_FIXTURE_FAILED",
            Self::ChecksFailed => "TABLEDB_CLI_CHECKS_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Scenario checks failed
    pub fn checks_failed(failed: usize, total: usize) -> Self {
        Self::new(
            CliErrorCode::ChecksFailed,
            format!("{} of {} scenarios failed", failed, total),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

impl From<BenchError> for CliError {
    fn from(e: BenchError) -> Self {
        Self::new(CliErrorCode::BenchFailed, e.to_string())
    }
}

impl From<FixtureError> for CliError {
    fn from(e: FixtureError) -> Self {
        Self::new(CliErrorCode::FixtureFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
