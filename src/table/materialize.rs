//! Materialization: identifiers back into projected tuples

use std::slice;

use super::errors::TableResult;
use super::table::Table;
use crate::tuple::{IdSet, Tuple, TupleId};

/// Projected tuples in ascending identifier order
///
/// Owns its tuples; later table mutations do not affect it and it can be
/// iterated any number of times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializedResults {
    columns: Vec<String>,
    ids: Vec<TupleId>,
    tuples: Vec<Tuple>,
}

impl MaterializedResults {
    /// Projected column names, sorted
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Identifier of each tuple, parallel to `iter()`
    pub fn ids(&self) -> &[TupleId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    /// (identifier, tuple) pairs
    pub fn entries(&self) -> impl Iterator<Item = (TupleId, &Tuple)> {
        self.ids.iter().copied().zip(self.tuples.iter())
    }

    pub fn into_tuples(self) -> Vec<Tuple> {
        self.tuples
    }
}

impl<'a> IntoIterator for &'a MaterializedResults {
    type Item = &'a Tuple;
    type IntoIter = slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

impl IntoIterator for MaterializedResults {
    type Item = Tuple;
    type IntoIter = std::vec::IntoIter<Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.into_iter()
    }
}

impl Table {
    /// Projects `columns` of the tuples in `ids`, or of every live tuple
    ///
    /// Deleted and never-assigned identifiers are skipped. An unknown column
    /// is an error.
    pub fn materialize<S: AsRef<str>>(
        &self,
        columns: &[S],
        ids: Option<&IdSet>,
    ) -> TableResult<MaterializedResults> {
        for column in columns {
            self.check_attribute(column.as_ref())?;
        }
        let mut columns: Vec<String> = columns.iter().map(|c| c.as_ref().to_string()).collect();
        columns.sort();
        columns.dedup();

        let (ids, tuples) = match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.store.get(id).map(|tuple| (id, tuple.project(columns.as_slice()))))
                .unzip(),
            None => self
                .store
                .by_id()
                .map(|(id, tuple)| (id, tuple.project(columns.as_slice())))
                .unzip(),
        };

        Ok(MaterializedResults {
            columns,
            ids,
            tuples,
        })
    }

    /// Every column of every live tuple
    pub fn materialize_all(&self) -> MaterializedResults {
        let (ids, tuples) = self
            .store
            .by_id()
            .map(|(id, tuple)| (id, tuple.clone()))
            .unzip();

        MaterializedResults {
            columns: self.attributes().map(String::from).collect(),
            ids,
            tuples,
        }
    }
}
