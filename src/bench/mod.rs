//! Benchmark harness for tabledb
//!
//! Times insert, bulk load, filters under each access path, delete and
//! updates of clustered, secondary and unindexed columns. Results are logged
//! per benchmark and written as SQL `INSERT INTO BENCHMARKS` rows.

mod errors;
mod harness;

pub use errors::{BenchError, BenchResult};
pub use harness::{BenchReport, Benchmarks, Measurement, UpdateTarget};
