//! Record primitives for tabledb
//!
//! - `Tuple`: a fixed-schema record of integer attributes
//! - `IdSet`: the ordered, duplicate-free set of tuple identifiers exchanged
//!   between filtering, materialization, deletion and update
//!
//! # Invariants
//!
//! - Tuple equality and hashing are structural (same column -> value mapping)
//! - IdSet iteration is always ascending by identifier

mod id_set;
mod tuple;

pub use id_set::IdSet;
pub use tuple::{Tuple, TupleId};
