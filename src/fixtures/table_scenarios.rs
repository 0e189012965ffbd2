//! Table scenarios over a CSV fixture
//!
//! Each scenario filters the loaded table, materializes every column and
//! exports the result:
//! - between.csv: A in [500, 600]
//! - lt.csv: A <= 600
//! - gt.csv: A >= 500
//! - composite.csv: A in [500, 600] AND B in [100, 200]
//! - delete.csv: every tuple left after deleting A in [500, 600]

use std::path::{Path, PathBuf};

use super::csv_io::{read_csv, TupleCollection};
use super::errors::FixtureResult;
use super::report::ScenarioReport;
use crate::config::EngineConfig;
use crate::filter::Filter;
use crate::observability::ObservationScope;
use crate::table::Table;
use crate::tuple::Tuple;

const TABLE_NAME: &str = "test_table";
const DEFAULT_ATTRIBUTES: [&str; 3] = ["A", "B", "C"];

/// One export produced by `run_table_scenarios`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableScenario {
    Between,
    LessThan,
    GreaterThan,
    Composite,
    Delete,
}

impl TableScenario {
    /// Run order; `Delete` mutates the table so it goes last
    pub const ALL: [TableScenario; 5] = [
        TableScenario::Between,
        TableScenario::GreaterThan,
        TableScenario::LessThan,
        TableScenario::Composite,
        TableScenario::Delete,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TableScenario::Between => "between",
            TableScenario::LessThan => "lt",
            TableScenario::GreaterThan => "gt",
            TableScenario::Composite => "composite",
            TableScenario::Delete => "delete",
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }

    /// The selection the scenario filters on
    pub fn filter(&self) -> Filter {
        match self {
            TableScenario::Between | TableScenario::Delete => Filter::between("A", 500, 600),
            TableScenario::LessThan => Filter::at_most("A", 600),
            TableScenario::GreaterThan => Filter::at_least("A", 500),
            TableScenario::Composite => {
                Filter::between("A", 500, 600).and(Filter::between("B", 100, 200))
            }
        }
    }
}

/// A table loaded from fixture tuples
#[derive(Debug)]
pub struct TableFixture {
    table: Table,
}

impl TableFixture {
    /// Loads `tuples`, taking the attribute set from the first one
    pub fn from_tuples(tuples: Vec<Tuple>, config: EngineConfig) -> FixtureResult<Self> {
        let attributes: Vec<String> = match tuples.first() {
            Some(first) => first.columns().map(String::from).collect(),
            None => DEFAULT_ATTRIBUTES.iter().map(|a| a.to_string()).collect(),
        };
        let mut table = Table::with_config(TABLE_NAME, attributes, config)?;
        table.load(tuples)?;
        Ok(Self { table })
    }

    pub fn from_csv(path: &Path, config: EngineConfig) -> FixtureResult<Self> {
        Self::from_tuples(read_csv(path)?, config)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    /// Filters, then materializes every attribute of the matches
    pub fn select(&self, filter: &Filter) -> FixtureResult<TupleCollection> {
        let ids = self.table.filter(filter)?;
        let columns: Vec<&str> = self.table.attributes().collect();
        let results = self.table.materialize(&columns, Some(&ids))?;
        Ok(results.into_iter().collect())
    }

    /// Deletes the matches of `filter` and returns every remaining tuple
    pub fn delete_matching(&mut self, filter: &Filter) -> FixtureResult<TupleCollection> {
        let ids = self.table.filter(filter)?;
        self.table.delete(&ids);
        Ok(self.table.materialize_all().into_iter().collect())
    }

    pub fn run(&mut self, scenario: TableScenario) -> FixtureResult<TupleCollection> {
        match scenario {
            TableScenario::Delete => self.delete_matching(&scenario.filter()),
            _ => self.select(&scenario.filter()),
        }
    }
}

/// Loads `data` and writes one CSV per scenario into `out_dir`
pub fn run_table_scenarios(
    data: &Path,
    out_dir: &Path,
    config: EngineConfig,
) -> FixtureResult<Vec<ScenarioReport>> {
    let data_display = data.display().to_string();
    let load = ObservationScope::new("TABLE_FIXTURE_LOAD", &[("data", data_display.as_str())]);
    let mut fixture = match TableFixture::from_csv(data, config) {
        Ok(fixture) => fixture,
        Err(err) => {
            load.fail(&err.to_string());
            return Err(err);
        }
    };
    let loaded = fixture.table().len().to_string();
    load.complete(&[("tuples", loaded.as_str())]);

    let mut reports = Vec::new();
    for scenario in TableScenario::ALL {
        let scope = ObservationScope::new("TABLE_SCENARIO", &[("name", scenario.name())]);
        let path: PathBuf = out_dir.join(scenario.file_name());
        let written = fixture
            .run(scenario)
            .and_then(|rows| rows.write_csv(&path).map(|_| rows.len()));
        match written {
            Ok(rows) => {
                let rows = rows.to_string();
                scope.complete(&[("rows", rows.as_str())]);
                reports.push(ScenarioReport::pass(
                    scenario.name(),
                    format!("{} rows -> {}", rows, path.display()),
                ));
            }
            Err(err) => {
                scope.fail(&err.to_string());
                reports.push(ScenarioReport::fail(scenario.name(), err.to_string()));
            }
        }
    }
    Ok(reports)
}
