//! Bottom-up bulk construction
//!
//! Builds leaves straight from key-sorted input and then stacks internal
//! levels on top, one pass per level. Linear in the input size.

use crate::tuple::{IdSet, TupleId};

use super::btree::{BPlusTree, Node, NodeId};
use super::errors::{IndexError, IndexResult};

/// Splits `total` items into the fewest chunks of at most `capacity`,
/// with sizes differing by at most one.
fn even_chunks(total: usize, capacity: usize) -> Vec<usize> {
    if total == 0 {
        return Vec::new();
    }
    let count = total.div_ceil(capacity);
    let base = total / count;
    let extra = total % count;
    (0..count).map(|i| if i < extra { base + 1 } else { base }).collect()
}

impl BPlusTree {
    /// Builds a tree from `(key, id)` pairs sorted ascending by key.
    ///
    /// Pairs sharing a key are grouped; repeated pairs collapse. Input that
    /// goes backwards is rejected before anything is built.
    pub fn bulk_load<I>(order: usize, sorted: I) -> IndexResult<Self>
    where
        I: IntoIterator<Item = (i32, TupleId)>,
    {
        let mut tree = Self::new(order)?;

        let mut groups: Vec<(i32, IdSet)> = Vec::new();
        for (position, (key, id)) in sorted.into_iter().enumerate() {
            match groups.last_mut() {
                Some((last, ids)) if *last == key => {
                    ids.insert(id);
                }
                Some((last, _)) if *last > key => {
                    return Err(IndexError::unsorted_input(position, *last, key));
                }
                _ => groups.push((key, IdSet::from_iter([id]))),
            }
        }
        if groups.is_empty() {
            return Ok(tree);
        }

        tree.nodes.clear();
        tree.key_count = groups.len();
        tree.entry_count = groups.iter().map(|(_, ids)| ids.len()).sum();

        // Leaf level, chained left to right. Each entry remembers the
        // smallest key below it for use as a separator one level up.
        let mut level: Vec<(i32, NodeId)> = Vec::new();
        let mut previous: Option<NodeId> = None;
        let mut groups = groups.into_iter();
        for size in even_chunks(tree.key_count, tree.max_leaf_keys()) {
            let (keys, values): (Vec<i32>, Vec<IdSet>) = groups.by_ref().take(size).unzip();
            let min = keys[0];
            let id = tree.alloc(Node::leaf(keys, values));
            if let Some(prev) = previous {
                tree.nodes[prev].next = Some(id);
            }
            previous = Some(id);
            level.push((min, id));
        }

        let mut height = 1;
        while level.len() > 1 {
            let sizes = even_chunks(level.len(), tree.max_children());
            let mut below = level.into_iter();
            level = Vec::with_capacity(sizes.len());
            for size in sizes {
                let chunk: Vec<(i32, NodeId)> = below.by_ref().take(size).collect();
                let min = chunk[0].0;
                let keys = chunk[1..].iter().map(|(k, _)| *k).collect();
                let children = chunk.iter().map(|(_, c)| *c).collect();
                level.push((min, tree.alloc(Node::internal(keys, children))));
            }
            height += 1;
        }

        tree.root = level[0].1;
        tree.height = height;
        Ok(tree)
    }
}
