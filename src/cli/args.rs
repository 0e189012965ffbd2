//! CLI argument definitions using clap
//!
//! Commands:
//! - tabledb bench [--config <path>] [--results <path>]
//! - tabledb test-table [--data <path>] [--out <dir>] [--config <path>]
//! - tabledb test-tree [--order <n>] [--seed <n>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tabledb - a single-table storage engine with B+Tree indexes
#[derive(Parser, Debug)]
#[command(name = "tabledb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every benchmark and write SQL result rows
    Bench {
        /// Benchmark configuration (JSON); defaults apply when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the results file from the configuration
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Load a CSV fixture and export the table scenarios
    TestTable {
        /// CSV file of integer tuples
        #[arg(long, default_value = "data_validation/data")]
        data: PathBuf,

        /// Directory receiving one CSV per scenario
        #[arg(long, default_value = "data_validation/results")]
        out: PathBuf,

        /// Engine configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run the randomized B+Tree scenarios
    TestTree {
        /// Branching factor of the tree under test
        #[arg(long, default_value_t = 10)]
        order: usize,

        /// Seed for key generation
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
