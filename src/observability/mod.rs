//! Observability subsystem for tabledb
//!
//! - Structured logging (JSON lines)
//! - Per-table operation counters
//!
//! Observability is read-only: nothing here changes the outcome of a table
//! operation.
//!
//! ```ignore
//! use tabledb::observability::Logger;
//!
//! Logger::info("INDEX_DECLARED", &[("attribute", "A"), ("kind", "clustered")]);
//! ```

mod logger;
mod metrics;
mod scope;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsSnapshot, TableMetrics};
pub use scope::ObservationScope;
