//! CLI module for tabledb
//!
//! Provides command-line interface for:
//! - bench: Run the benchmark suite and write SQL result rows
//! - test-table: Export filter/delete scenarios over a CSV fixture
//! - test-tree: Randomized B+Tree workload checked against a model

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{bench, run, run_command, test_table, test_tree};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::write_response;
