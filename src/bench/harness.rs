//! Benchmark harness
//!
//! Each benchmark builds fresh tables from seeded random tuples, times only
//! the operation under test and records the mean nanoseconds per iteration.
//! The generator is owned by the harness, so one seed reproduces a whole run.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::errors::{BenchError, BenchResult};
use crate::config::BenchConfig;
use crate::filter::Filter;
use crate::observability::Logger;
use crate::table::Table;
use crate::tuple::{IdSet, Tuple, TupleId};

const TABLE_NAME: &str = "test_table";
const ATTRIBUTES: [&str; 3] = ["A", "B", "C"];

/// Which column an update benchmark rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTarget {
    /// A, the clustering attribute
    Clustered,
    /// B, carrying a secondary index
    Secondary,
    /// C, no index
    Unindexed,
}

impl UpdateTarget {
    pub const ALL: [UpdateTarget; 3] = [
        UpdateTarget::Clustered,
        UpdateTarget::Secondary,
        UpdateTarget::Unindexed,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            UpdateTarget::Clustered => "A",
            UpdateTarget::Secondary => "B",
            UpdateTarget::Unindexed => "C",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UpdateTarget::Clustered => "clustered update",
            UpdateTarget::Secondary => "secondary update",
            UpdateTarget::Unindexed => "unindexed update",
        }
    }
}

/// Mean cost of one benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub label: String,
    pub nanos_per_iteration: f64,
    pub iterations: u32,
}

impl Measurement {
    /// One `INSERT INTO BENCHMARKS` row
    pub fn to_sql(&self, banner: &str, timestamp: &str) -> String {
        format!(
            "INSERT INTO BENCHMARKS VALUES ('{}','{}',{:.1},'{}');",
            banner, timestamp, self.nanos_per_iteration, self.label
        )
    }
}

/// Summary of a full run
#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub banner: String,
    pub started_at: String,
    pub data_size: u32,
    pub iterations: u32,
    pub measurements: Vec<Measurement>,
}

/// Seeded benchmark runner
#[derive(Debug)]
pub struct Benchmarks {
    config: BenchConfig,
    rng: StdRng,
    /// (min, max) of each column in the most recently generated data
    bounds: BTreeMap<&'static str, (i32, i32)>,
    started_at: String,
    measurements: Vec<Measurement>,
}

impl Benchmarks {
    pub fn new(config: BenchConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            rng,
            bounds: BTreeMap::new(),
            started_at: chrono::Utc::now().to_rfc3339(),
            measurements: Vec::new(),
        }
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    /// (min, max) of `column` in the last generated data set
    pub fn bounds(&self, column: &str) -> Option<(i32, i32)> {
        self.bounds.get(column).copied()
    }

    // ==================== Data generation ====================

    fn setup_table(&mut self) -> BenchResult<Table> {
        self.bounds.clear();
        Ok(Table::with_config(
            TABLE_NAME,
            ATTRIBUTES,
            self.config.engine.clone(),
        )?)
    }

    fn setup_tuples(&mut self) -> Vec<Tuple> {
        let mut tuples = Vec::with_capacity(self.config.data_size as usize);
        for _ in 0..self.config.data_size {
            let mut tuple = Tuple::new();
            for column in ATTRIBUTES {
                let value: i32 = self.rng.gen();
                self.bounds
                    .entry(column)
                    .and_modify(|(min, max)| {
                        *min = (*min).min(value);
                        *max = (*max).max(value);
                    })
                    .or_insert((value, value));
                tuple.put(column, value);
            }
            tuples.push(tuple);
        }
        tuples
    }

    fn loaded_table(&mut self) -> BenchResult<Table> {
        let mut table = self.setup_table()?;
        let tuples = self.setup_tuples();
        table.load(tuples)?;
        Ok(table)
    }

    fn random_range(&mut self) -> (i32, i32) {
        let x: i32 = self.rng.gen();
        let y: i32 = self.rng.gen();
        (x.min(y), x.max(y))
    }

    fn random_ids(&mut self, count: usize) -> IdSet {
        let size = TupleId::from(self.config.data_size);
        let count = count.min(self.config.data_size as usize);
        let mut ids = IdSet::new();
        while ids.len() < count {
            ids.insert(self.rng.gen_range(0..size));
        }
        ids
    }

    fn all_ids(&self) -> IdSet {
        (0..TupleId::from(self.config.data_size)).collect()
    }

    fn record(&mut self, label: &str, total: Duration) {
        let iterations = self.config.iterations;
        let nanos = total.as_nanos() as f64 / f64::from(iterations);
        let nanos_field = format!("{:.1}", nanos);
        let iterations_field = iterations.to_string();
        Logger::info(
            "BENCHMARK",
            &[
                ("label", label),
                ("ns_per_iteration", nanos_field.as_str()),
                ("iterations", iterations_field.as_str()),
            ],
        );
        self.measurements.push(Measurement {
            label: label.to_string(),
            nanos_per_iteration: nanos,
            iterations,
        });
    }

    // ==================== Benchmarks ====================

    /// Repeated single-tuple inserts into a fresh table
    pub fn insert(&mut self) -> BenchResult<()> {
        let mut total = Duration::ZERO;
        for _ in 0..self.config.iterations {
            let mut table = self.setup_table()?;
            let tuples = self.setup_tuples();
            let start = Instant::now();
            for tuple in tuples {
                table.insert(tuple)?;
            }
            total += start.elapsed();
        }
        self.record("insert", total);
        Ok(())
    }

    /// One `load` call into a fresh table
    pub fn bulk_load(&mut self) -> BenchResult<()> {
        let mut total = Duration::ZERO;
        for _ in 0..self.config.iterations {
            let mut table = self.setup_table()?;
            let tuples = self.setup_tuples();
            let start = Instant::now();
            table.load(tuples)?;
            total += start.elapsed();
        }
        self.record("bulkload", total);
        Ok(())
    }

    fn filter_warmup(&mut self, table: &Table, column: &str) -> BenchResult<()> {
        for _ in 0..self.config.iterations {
            let (low, high) = self.random_range();
            let ids = table.filter(&Filter::between(column, low, high))?;
            table.materialize(&ATTRIBUTES, Some(&ids))?;
        }
        Ok(())
    }

    fn timed_filters(&mut self, table: &Table, column: &str, label: &str) -> BenchResult<()> {
        self.filter_warmup(table, column)?;
        let mut total = Duration::ZERO;
        for _ in 0..self.config.iterations {
            let (low, high) = self.random_range();
            let filter = Filter::between(column, low, high);
            let start = Instant::now();
            let ids = table.filter(&filter)?;
            table.materialize(&ATTRIBUTES, Some(&ids))?;
            total += start.elapsed();
        }
        self.record(label, total);
        Ok(())
    }

    /// Range filter on B with no index (full scans)
    pub fn filter_no_index(&mut self) -> BenchResult<()> {
        let table = self.loaded_table()?;
        self.timed_filters(&table, "B", "filter no index")
    }

    /// Range filter on B through a secondary index
    ///
    /// B is declared clustered after A, so it lands as a secondary index.
    pub fn filter_secondary_index(&mut self) -> BenchResult<()> {
        let mut table = self.loaded_table()?;
        table.declare_clustered_index("A")?;
        table.declare_clustered_index("B")?;
        self.timed_filters(&table, "B", "filter secondary index")
    }

    /// Range filter on A through the clustered index
    pub fn filter_clustered_index(&mut self) -> BenchResult<()> {
        let mut table = self.loaded_table()?;
        table.declare_clustered_index("A")?;
        self.timed_filters(&table, "A", "filter clustered index")
    }

    /// Deleting every tuple of a loaded table
    pub fn delete(&mut self) -> BenchResult<()> {
        let ids = self.all_ids();
        let mut total = Duration::ZERO;
        for _ in 0..self.config.iterations {
            let mut table = self.loaded_table()?;
            let start = Instant::now();
            table.delete(&ids);
            total += start.elapsed();
        }
        self.record("delete", total);
        Ok(())
    }

    fn indexed_table(&mut self) -> BenchResult<Table> {
        let mut table = self.loaded_table()?;
        table.declare_clustered_index("A")?;
        table.declare_secondary_index("B")?;
        Ok(table)
    }

    fn update_rounds(&mut self, table: &mut Table, target: UpdateTarget) -> BenchResult<Duration> {
        let half = self.config.data_size as usize / 2;
        let mut total = Duration::ZERO;
        for _ in 0..self.config.iterations {
            let ids = self.random_ids(half);
            let value: i32 = self.rng.gen();
            let start = Instant::now();
            table.update(target.column(), &ids, value)?;
            total += start.elapsed();
        }
        Ok(total)
    }

    /// Rewriting one column on a random half of the tuples per iteration
    ///
    /// The table is clustered on A with a secondary index on B.
    pub fn update(&mut self, target: UpdateTarget) -> BenchResult<()> {
        let mut warmup = self.indexed_table()?;
        self.update_rounds(&mut warmup, target)?;

        let mut table = self.indexed_table()?;
        let total = self.update_rounds(&mut table, target)?;
        self.record(target.label(), total);
        Ok(())
    }

    /// Every benchmark in a fixed order
    pub fn run_all(&mut self) -> BenchResult<()> {
        self.insert()?;
        self.bulk_load()?;
        self.filter_no_index()?;
        self.filter_secondary_index()?;
        self.filter_clustered_index()?;
        self.delete()?;
        for target in UpdateTarget::ALL {
            self.update(target)?;
        }
        Ok(())
    }

    // ==================== Results ====================

    /// SQL rows for every measurement, one per line
    pub fn to_sql(&self) -> String {
        self.measurements
            .iter()
            .map(|m| m.to_sql(&self.config.banner, &self.started_at) + "\n")
            .collect()
    }

    pub fn write_results(&self, path: &Path) -> BenchResult<()> {
        let write_err = |source| BenchError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, self.to_sql()).map_err(write_err)
    }

    pub fn report(&self) -> BenchReport {
        BenchReport {
            banner: self.config.banner.clone(),
            started_at: self.started_at.clone(),
            data_size: self.config.data_size,
            iterations: self.config.iterations,
            measurements: self.measurements.clone(),
        }
    }
}
