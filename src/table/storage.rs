//! Physical tuple storage
//!
//! Rows live in a vector in physical order. Identifiers are assigned densely
//! and never reused; `positions[id]` maps an identifier to its row. When a
//! clustering attribute is set, rows are kept sorted by (value, id), dead rows
//! included, so the physical order always matches the clustered index.

use crate::tuple::{IdSet, Tuple, TupleId};

#[derive(Debug, Clone)]
struct Row {
    id: TupleId,
    tuple: Tuple,
    live: bool,
}

impl Row {
    fn sort_key(&self, attribute: &str) -> (Option<i32>, TupleId) {
        (self.tuple.get(attribute), self.id)
    }
}

#[derive(Debug, Clone, Default)]
pub(super) struct TupleStore {
    rows: Vec<Row>,
    positions: Vec<usize>,
    live: usize,
}

impl TupleStore {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Identifier the next stored tuple will receive
    pub(super) fn next_id(&self) -> TupleId {
        self.positions.len() as TupleId
    }

    pub(super) fn live_count(&self) -> usize {
        self.live
    }

    /// Appends at the physical end
    pub(super) fn append(&mut self, tuple: Tuple) -> TupleId {
        let id = self.next_id();
        self.positions.push(self.rows.len());
        self.rows.push(Row {
            id,
            tuple,
            live: true,
        });
        self.live += 1;
        id
    }

    /// Inserts at the position implied by `attribute`, keeping rows sorted
    pub(super) fn insert_clustered(&mut self, tuple: Tuple, attribute: &str) -> TupleId {
        let id = self.next_id();
        let key = (tuple.get(attribute), id);
        let at = self
            .rows
            .partition_point(|row| row.sort_key(attribute) < key);

        self.positions.push(at);
        self.rows.insert(
            at,
            Row {
                id,
                tuple,
                live: true,
            },
        );
        self.live += 1;
        self.reindex_from(at + 1);
        id
    }

    /// Re-sorts every row by (value, id)
    pub(super) fn cluster_by(&mut self, attribute: &str) {
        // Stable and near-linear on mostly sorted rows.
        self.rows.sort_by_key(|row| row.sort_key(attribute));
        self.reindex_from(0);
    }

    pub(super) fn is_clustered_by(&self, attribute: &str) -> bool {
        self.rows
            .windows(2)
            .all(|pair| pair[0].sort_key(attribute) < pair[1].sort_key(attribute))
    }

    fn reindex_from(&mut self, start: usize) {
        for (offset, row) in self.rows[start..].iter().enumerate() {
            self.positions[row.id as usize] = start + offset;
        }
    }

    fn position(&self, id: TupleId) -> Option<usize> {
        self.positions.get(usize::try_from(id).ok()?).copied()
    }

    fn row(&self, id: TupleId) -> Option<&Row> {
        self.rows.get(self.position(id)?)
    }

    /// Live tuple by identifier
    pub(super) fn get(&self, id: TupleId) -> Option<&Tuple> {
        self.row(id).filter(|row| row.live).map(|row| &row.tuple)
    }

    pub(super) fn value(&self, id: TupleId, attribute: &str) -> Option<i32> {
        self.get(id).and_then(|tuple| tuple.get(attribute))
    }

    /// Marks a live tuple dead and returns it; `None` if absent or already dead
    pub(super) fn tombstone(&mut self, id: TupleId) -> Option<&Tuple> {
        let position = self.position(id)?;
        let row = self.rows.get_mut(position).filter(|row| row.live)?;
        row.live = false;
        self.live -= 1;
        Some(&row.tuple)
    }

    /// Overwrites one value of a live tuple, returning the old value
    pub(super) fn set_value(&mut self, id: TupleId, attribute: &str, value: i32) -> Option<i32> {
        let position = self.position(id)?;
        let row = self.rows.get_mut(position).filter(|row| row.live)?;
        row.tuple.put(attribute, value)
    }

    /// Live tuples in physical order
    pub(super) fn physical(&self) -> impl Iterator<Item = (TupleId, &Tuple)> {
        self.rows
            .iter()
            .filter(|row| row.live)
            .map(|row| (row.id, &row.tuple))
    }

    /// Live tuples in ascending identifier order
    pub(super) fn by_id(&self) -> impl Iterator<Item = (TupleId, &Tuple)> {
        (0..self.next_id()).filter_map(move |id| self.get(id).map(|tuple| (id, tuple)))
    }

    pub(super) fn live_ids(&self) -> IdSet {
        self.physical().map(|(id, _)| id).collect()
    }

    /// Live (value, id) pairs for `attribute`, sorted for bulk index builds
    pub(super) fn sorted_pairs(&self, attribute: &str) -> Vec<(i32, TupleId)> {
        let mut pairs: Vec<(i32, TupleId)> = self
            .physical()
            .filter_map(|(id, tuple)| tuple.get(attribute).map(|value| (value, id)))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}
