//! Filter subsystem for tabledb
//!
//! Predicate trees over integer attributes: inclusive range leaves combined
//! with AND / OR. `FilterPlan` describes which access path each leaf takes.

mod ast;
mod explain;

pub use ast::{Filter, FilterOp, RangePredicate};
pub use explain::{AccessPath, FilterPlan};
