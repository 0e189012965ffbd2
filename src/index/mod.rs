//! Ordered index subsystem for tabledb
//!
//! A B+Tree mapping integer attribute values to identifier sets.
//!
//! # Operations
//!
//! - `insert` / `delete`: incremental maintenance with split, borrow, merge
//! - `get` / `range_query`: leaf-chain scans, inclusive bounds
//! - `bulk_load`: linear bottom-up construction from key-sorted pairs
//! - `validate`: full structural check, FATAL on failure
//!
//! # Invariants
//!
//! - All leaves at the same depth
//! - In-order leaf keys strictly ascending
//! - Every non-root node within its occupancy bounds

mod btree;
mod bulk;
mod errors;
mod validate;

pub use btree::{BPlusTree, Iter};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
