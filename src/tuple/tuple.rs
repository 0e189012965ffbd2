//! Tuple record type
//!
//! Columns are kept in a BTreeMap so iteration, equality, ordering and
//! hashing are all deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable handle for a tuple within one table instance.
///
/// Assigned at insertion, monotonically increasing, never reused.
pub type TupleId = u64;

/// A fixed-schema record mapping column name to a 32-bit integer value.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tuple {
    values: BTreeMap<String, i32>,
}

impl Tuple {
    /// Creates an empty tuple
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tuple from `(column, value)` pairs.
    ///
    /// A column repeated later in the list overwrites the earlier value.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Builder-style column assignment
    pub fn with(mut self, column: impl Into<String>, value: i32) -> Self {
        self.put(column, value);
        self
    }

    /// Sets a column value, returning the previous one
    pub fn put(&mut self, column: impl Into<String>, value: i32) -> Option<i32> {
        self.values.insert(column.into(), value)
    }

    /// Returns the value of a column
    pub fn get(&self, column: &str) -> Option<i32> {
        self.values.get(column).copied()
    }

    /// Returns true if the tuple carries this column
    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    /// Column names in ascending order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// `(column, value)` pairs in ascending column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the tuple has no columns
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copies only the requested columns into a new tuple.
    ///
    /// Columns the tuple does not carry are left out.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Tuple {
        let mut out = Tuple::new();
        for column in columns {
            let column = column.as_ref();
            if let Some(v) = self.get(column) {
                out.put(column, v);
            }
        }
        out
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        write!(f, "}}")
    }
}

impl<S: Into<String>> FromIterator<(S, i32)> for Tuple {
    fn from_iter<I: IntoIterator<Item = (S, i32)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
