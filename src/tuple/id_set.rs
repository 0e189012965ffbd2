//! Ordered identifier set

use std::collections::btree_set;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::tuple::TupleId;

/// Ordered, duplicate-free collection of tuple identifiers.
///
/// Returned sets are independent copies; holding one never borrows the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdSet {
    ids: BTreeSet<TupleId>,
}

impl IdSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an identifier; returns false if it was already present
    pub fn insert(&mut self, id: TupleId) -> bool {
        self.ids.insert(id)
    }

    /// Removes an identifier; returns true if it was present
    pub fn remove(&mut self, id: TupleId) -> bool {
        self.ids.remove(&id)
    }

    /// Membership test
    pub fn contains(&self, id: TupleId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterates identifiers in ascending order
    pub fn iter(&self) -> impl Iterator<Item = TupleId> + '_ {
        self.ids.iter().copied()
    }

    /// Set union
    pub fn union(&self, other: &IdSet) -> IdSet {
        Self {
            ids: self.ids.union(&other.ids).copied().collect(),
        }
    }

    /// Set intersection
    pub fn intersection(&self, other: &IdSet) -> IdSet {
        // Probe the larger set with the smaller one.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        Self {
            ids: small.ids.iter().filter(|id| large.ids.contains(id)).copied().collect(),
        }
    }

    /// Identifiers in `self` but not in `other`
    pub fn difference(&self, other: &IdSet) -> IdSet {
        Self {
            ids: self.ids.difference(&other.ids).copied().collect(),
        }
    }

    /// Merges `other` into `self`
    pub fn extend_from(&mut self, other: &IdSet) {
        self.ids.extend(other.ids.iter().copied());
    }

    /// Keeps only identifiers matching the predicate
    pub fn retain<F: FnMut(TupleId) -> bool>(&mut self, mut keep: F) {
        self.ids.retain(|id| keep(*id));
    }

    /// Collects the identifiers into an ascending vector
    pub fn to_vec(&self) -> Vec<TupleId> {
        self.iter().collect()
    }
}

impl FromIterator<TupleId> for IdSet {
    fn from_iter<I: IntoIterator<Item = TupleId>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

impl Extend<TupleId> for IdSet {
    fn extend<I: IntoIterator<Item = TupleId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

impl IntoIterator for IdSet {
    type Item = TupleId;
    type IntoIter = btree_set::IntoIter<TupleId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.into_iter()
    }
}

impl<'a> IntoIterator for &'a IdSet {
    type Item = &'a TupleId;
    type IntoIter = btree_set::Iter<'a, TupleId>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}
