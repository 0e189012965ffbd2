//! Fixture drivers for tabledb
//!
//! - CSV import (`read_csv`) and deterministic CSV export (`TupleCollection`)
//! - Table scenarios: filter a loaded CSV and export each selection
//! - Tree scenarios: seeded insert/get/delete/mix workloads checked against
//!   a reference model
//!
//! Fixtures sit outside the core: they own all file I/O and randomness.

mod csv_io;
mod errors;
mod report;
mod table_scenarios;
mod tree_scenarios;

pub use csv_io::{column_name, parse_csv, read_csv, TupleCollection};
pub use errors::{FixtureError, FixtureResult};
pub use report::{all_passed, ScenarioReport};
pub use table_scenarios::{run_table_scenarios, TableFixture, TableScenario};
pub use tree_scenarios::{run_tree_scenarios, TreeFixture, KEY_SPAN};
