//! CLI command implementations
//!
//! Commands are thin drivers: they load configuration, hand work to the
//! bench and fixtures modules and print a JSON summary. A failed scenario
//! turns into a non-zero exit through `CliError`.

use std::path::{Path, PathBuf};

use serde_json::json;

use crate::bench::Benchmarks;
use crate::config::{BenchConfig, EngineConfig};
use crate::fixtures::{run_table_scenarios, run_tree_scenarios, ScenarioReport};
use crate::observability::Logger;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Bench { config, results } => bench(config.as_deref(), results),
        Command::TestTable { data, out, config } => test_table(&data, &out, config.as_deref()),
        Command::TestTree { order, seed } => test_tree(order, seed),
    }
}

/// Run every benchmark and write the SQL result rows
pub fn bench(config_path: Option<&Path>, results: Option<PathBuf>) -> CliResult<()> {
    let mut config = match config_path {
        Some(path) => BenchConfig::load_from_path(path)?,
        None => BenchConfig::default(),
    };
    if let Some(results) = results {
        config.results_path = results;
    }

    let results_path = config.results_path.clone();
    let mut benchmarks = Benchmarks::new(config);
    benchmarks.run_all()?;
    benchmarks.write_results(&results_path)?;

    let results_field = results_path.display().to_string();
    Logger::info("BENCH_COMPLETE", &[("results", results_field.as_str())]);
    write_response(serde_json::to_value(benchmarks.report())?)
}

/// Load a CSV fixture and export every table scenario into `out`
pub fn test_table(data: &Path, out: &Path, config_path: Option<&Path>) -> CliResult<()> {
    let config = match config_path {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::default(),
    };
    let reports = run_table_scenarios(data, out, config)?;
    finish(reports)
}

/// Run the randomized tree scenarios
pub fn test_tree(order: usize, seed: u64) -> CliResult<()> {
    let reports = run_tree_scenarios(order, seed)?;
    finish(reports)
}

fn finish(reports: Vec<ScenarioReport>) -> CliResult<()> {
    let failed = reports.iter().filter(|report| !report.passed).count();
    let total = reports.len();
    write_response(json!({
        "passed": total - failed,
        "failed": failed,
        "scenarios": reports,
    }))?;

    if failed > 0 {
        return Err(CliError::checks_failed(failed, total));
    }
    Ok(())
}
