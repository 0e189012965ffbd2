//! Table subsystem for tabledb
//!
//! A table stores integer-valued tuples under stable identifiers and keeps
//! any number of B+Tree indexes in step with its storage.
//!
//! Design principles:
//! - Identifiers are dense, assigned in insertion order and never reused
//! - At most one clustered index; physical order follows its key
//! - Deletion tombstones the slot and removes index entries immediately
//! - Validation precedes mutation: an error leaves the table unchanged
//! - Filter results are ascending identifier sets whichever path answered them

mod errors;
mod evaluate;
mod materialize;
mod storage;
mod table;

pub use errors::{Severity, TableError, TableErrorCode, TableResult};
pub use materialize::MaterializedResults;
pub use table::{IndexKind, Table};
