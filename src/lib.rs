//! tabledb - a minimal single-table storage engine
//!
//! Tuples of integer attributes live under stable identifiers. A table can be
//! clustered on one attribute and carry secondary B+Tree indexes on others;
//! range filters combined with AND / OR use an index where one exists and
//! fall back to a full scan otherwise.

pub mod bench;
pub mod cli;
pub mod config;
pub mod filter;
pub mod fixtures;
pub mod index;
pub mod observability;
pub mod table;
pub mod tuple;
