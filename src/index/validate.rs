//! Structural validation for `BPlusTree`
//!
//! Walks every reachable node and checks:
//! - keys sorted and unique within each node
//! - occupancy bounds for non-root nodes, root fanout >= 2
//! - all leaves at depth `height`
//! - keys of child i within `[keys[i-1], keys[i])`
//! - the leaf chain visits exactly the in-order leaves
//! - no key maps to an empty identifier set
//! - cached key and entry counts agree with the nodes
//!
//! Used by tests and the tree test runner, never on the hot path.

use super::btree::{BPlusTree, NodeId};
use super::errors::{IndexError, IndexResult};

struct Walk {
    leaves: Vec<NodeId>,
    keys: usize,
    entries: usize,
}

impl BPlusTree {
    /// Checks every structural invariant.
    ///
    /// A failure is FATAL: it means index maintenance has a bug.
    pub fn validate(&self) -> IndexResult<()> {
        let mut walk = Walk {
            leaves: Vec::new(),
            keys: 0,
            entries: 0,
        };
        self.check_node(self.root, 1, None, None, &mut walk)?;

        let mut chained = Vec::with_capacity(walk.leaves.len());
        let mut cursor = Some(self.leftmost_leaf());
        while let Some(id) = cursor {
            if chained.len() > walk.leaves.len() {
                return Err(IndexError::corruption("leaf chain longer than tree"));
            }
            chained.push(id);
            cursor = self.nodes[id].next;
        }
        if chained != walk.leaves {
            return Err(IndexError::corruption(format!(
                "leaf chain {:?} does not match in-order leaves {:?}",
                chained, walk.leaves
            )));
        }

        let mut previous: Option<i32> = None;
        for (key, _) in self.iter() {
            if previous.is_some_and(|p| p >= key) {
                return Err(IndexError::corruption(format!(
                    "leaf keys not strictly ascending at {}",
                    key
                )));
            }
            previous = Some(key);
        }

        if walk.keys != self.key_count {
            return Err(IndexError::corruption(format!(
                "key count {} but tree holds {}",
                self.key_count, walk.keys
            )));
        }
        if walk.entries != self.entry_count {
            return Err(IndexError::corruption(format!(
                "entry count {} but tree holds {}",
                self.entry_count, walk.entries
            )));
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        depth: usize,
        lower: Option<i32>,
        upper: Option<i32>,
        walk: &mut Walk,
    ) -> IndexResult<()> {
        let node = &self.nodes[id];
        let is_root = id == self.root;

        if node.keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(IndexError::corruption(format!(
                "node {} keys not sorted and unique: {:?}",
                id, node.keys
            )));
        }
        let out_of_bounds = node
            .keys
            .iter()
            .find(|k| lower.is_some_and(|l| **k < l) || upper.is_some_and(|u| **k >= u));
        if let Some(key) = out_of_bounds {
            return Err(IndexError::corruption(format!(
                "node {} key {} outside separator bounds {:?}..{:?}",
                id, key, lower, upper
            )));
        }

        if node.leaf {
            if depth != self.height {
                return Err(IndexError::corruption(format!(
                    "leaf {} at depth {} but height is {}",
                    id, depth, self.height
                )));
            }
            if node.values.len() != node.keys.len() || !node.children.is_empty() {
                return Err(IndexError::corruption(format!("leaf {} has mismatched slots", id)));
            }
            let entries = node.keys.len();
            if entries > self.max_leaf_keys() || (!is_root && entries < self.min_leaf_keys()) {
                return Err(IndexError::corruption(format!(
                    "leaf {} holds {} keys, allowed {}..={}",
                    id,
                    entries,
                    self.min_leaf_keys(),
                    self.max_leaf_keys()
                )));
            }
            if node.values.iter().any(|ids| ids.is_empty()) {
                return Err(IndexError::corruption(format!("leaf {} has a key with no ids", id)));
            }
            walk.leaves.push(id);
            walk.keys += entries;
            walk.entries += node.values.iter().map(|ids| ids.len()).sum::<usize>();
            return Ok(());
        }

        let fanout = node.children.len();
        if fanout != node.keys.len() + 1 {
            return Err(IndexError::corruption(format!(
                "internal node {} has {} keys for {} children",
                id,
                node.keys.len(),
                fanout
            )));
        }
        let min = if is_root { 2 } else { self.min_children() };
        if fanout > self.max_children() || fanout < min {
            return Err(IndexError::corruption(format!(
                "internal node {} has {} children, allowed {}..={}",
                id,
                fanout,
                min,
                self.max_children()
            )));
        }

        for (i, child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(node.keys[i - 1]) };
            let child_upper = if i == node.keys.len() { upper } else { Some(node.keys[i]) };
            self.check_node(*child, depth + 1, child_lower, child_upper, walk)?;
        }
        Ok(())
    }
}
