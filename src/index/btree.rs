//! B+Tree ordered index
//!
//! Maps an `i32` attribute value to the `IdSet` of tuples holding that value.
//! Nodes live in an arena (`Vec<Node>`) and refer to each other by position,
//! so the tree owns every node exclusively and no node is shared.
//!
//! Occupancy (entries are keys for a leaf, children for an internal node):
//! - leaf: at most `order` keys, non-root at least ceil(order/2)
//! - internal: at most `max(order, 3)` children, non-root at least half of
//!   that, root at least 2. A fanout of 2 cannot split into two legal
//!   halves, so order 2 trees use internal fanout 3.
//!
//! Separator rule: every key in child `i` lies in `[keys[i-1], keys[i])`.

use crate::tuple::{IdSet, TupleId};

use super::errors::{IndexError, IndexResult};

/// Arena position of a node
pub(super) type NodeId = usize;

/// A B+Tree node. Leaves use `values` and `next`; internal nodes use
/// `children`.
#[derive(Debug, Clone, Default)]
pub(super) struct Node {
    pub(super) leaf: bool,
    pub(super) keys: Vec<i32>,
    pub(super) children: Vec<NodeId>,
    pub(super) values: Vec<IdSet>,
    pub(super) next: Option<NodeId>,
}

impl Node {
    pub(super) fn leaf(keys: Vec<i32>, values: Vec<IdSet>) -> Self {
        Self {
            leaf: true,
            keys,
            values,
            ..Self::default()
        }
    }

    pub(super) fn internal(keys: Vec<i32>, children: Vec<NodeId>) -> Self {
        Self {
            leaf: false,
            keys,
            children,
            ..Self::default()
        }
    }

    /// Occupancy measure used by the split/merge rules
    pub(super) fn entries(&self) -> usize {
        if self.leaf {
            self.keys.len()
        } else {
            self.children.len()
        }
    }
}

/// Index of the child whose key range contains `key`.
pub(super) fn child_index(keys: &[i32], key: i32) -> usize {
    keys.partition_point(|sep| *sep <= key)
}

/// Ordered index over one integer attribute.
#[derive(Debug, Clone)]
pub struct BPlusTree {
    pub(super) order: usize,
    pub(super) nodes: Vec<Node>,
    pub(super) free: Vec<NodeId>,
    pub(super) root: NodeId,
    /// Levels including the leaf level; 1 when the root is a leaf
    pub(super) height: usize,
    pub(super) key_count: usize,
    pub(super) entry_count: usize,
}

impl BPlusTree {
    /// Creates an empty tree with the given branching factor.
    ///
    /// Orders below 2 are rejected.
    pub fn new(order: usize) -> IndexResult<Self> {
        if order < 2 {
            return Err(IndexError::invalid_order(order));
        }
        Ok(Self {
            order,
            nodes: vec![Node::leaf(Vec::new(), Vec::new())],
            free: Vec::new(),
            root: 0,
            height: 1,
            key_count: 0,
            entry_count: 0,
        })
    }

    /// Branching factor the tree was built with
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of levels, leaves included
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of `(key, id)` pairs
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    pub(super) fn max_leaf_keys(&self) -> usize {
        self.order
    }

    pub(super) fn min_leaf_keys(&self) -> usize {
        self.order.div_ceil(2)
    }

    pub(super) fn max_children(&self) -> usize {
        self.order.max(3)
    }

    pub(super) fn min_children(&self) -> usize {
        self.max_children().div_ceil(2)
    }

    fn min_entries(&self, node: NodeId) -> usize {
        if self.nodes[node].leaf {
            self.min_leaf_keys()
        } else {
            self.min_children()
        }
    }

    pub(super) fn alloc(&mut self, node: Node) -> NodeId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        self.nodes[id] = Node::default();
        self.free.push(id);
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    fn find_leaf(&self, key: i32) -> NodeId {
        let mut id = self.root;
        while !self.nodes[id].leaf {
            let node = &self.nodes[id];
            id = node.children[child_index(&node.keys, key)];
        }
        id
    }

    pub(super) fn leftmost_leaf(&self) -> NodeId {
        let mut id = self.root;
        while !self.nodes[id].leaf {
            id = self.nodes[id].children[0];
        }
        id
    }

    /// Identifiers stored under exactly `key`
    pub fn get(&self, key: i32) -> IdSet {
        self.range_query(Some(key), Some(key))
    }

    /// Identifiers for every key in the inclusive range `[low, high]`.
    ///
    /// `None` on either side scans to that end of the tree.
    pub fn range_query(&self, low: Option<i32>, high: Option<i32>) -> IdSet {
        let mut out = IdSet::new();
        if let (Some(l), Some(h)) = (low, high) {
            if l > h {
                return out;
            }
        }

        let mut leaf = match low {
            Some(k) => self.find_leaf(k),
            None => self.leftmost_leaf(),
        };
        loop {
            let node = &self.nodes[leaf];
            let start = match low {
                Some(k) => node.keys.partition_point(|key| *key < k),
                None => 0,
            };
            for (key, ids) in node.keys[start..].iter().zip(&node.values[start..]) {
                if high.is_some_and(|h| *key > h) {
                    return out;
                }
                out.extend_from(ids);
            }
            match node.next {
                Some(next) => leaf = next,
                None => return out,
            }
        }
    }

    /// Iterates `(key, ids)` in ascending key order along the leaf chain
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            tree: self,
            leaf: Some(self.leftmost_leaf()),
            pos: 0,
        }
    }

    /// All keys in ascending order
    pub fn keys(&self) -> Vec<i32> {
        self.iter().map(|(k, _)| k).collect()
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Adds `id` under `key`. Returns false if the pair was already present.
    pub fn insert(&mut self, key: i32, id: TupleId) -> bool {
        let (inserted, split) = self.insert_into(self.root, key, id);
        if let Some((separator, right)) = split {
            let root = Node::internal(vec![separator], vec![self.root, right]);
            self.root = self.alloc(root);
            self.height += 1;
        }
        if inserted {
            self.entry_count += 1;
        }
        inserted
    }

    /// Returns whether the pair was added, plus the separator and new right
    /// sibling when `node_id` split.
    fn insert_into(&mut self, node_id: NodeId, key: i32, id: TupleId) -> (bool, Option<(i32, NodeId)>) {
        if self.nodes[node_id].leaf {
            let node = &mut self.nodes[node_id];
            let (inserted, new_key) = match node.keys.binary_search(&key) {
                Ok(pos) => (node.values[pos].insert(id), false),
                Err(pos) => {
                    node.keys.insert(pos, key);
                    node.values.insert(pos, IdSet::from_iter([id]));
                    (true, true)
                }
            };
            if new_key {
                self.key_count += 1;
            }
            if self.nodes[node_id].entries() > self.max_leaf_keys() {
                return (inserted, Some(self.split_leaf(node_id)));
            }
            return (inserted, None);
        }

        let pos = child_index(&self.nodes[node_id].keys, key);
        let child = self.nodes[node_id].children[pos];
        let (inserted, split) = self.insert_into(child, key, id);
        if let Some((separator, right)) = split {
            let max = self.max_children();
            let node = &mut self.nodes[node_id];
            node.keys.insert(pos, separator);
            node.children.insert(pos + 1, right);
            if node.children.len() > max {
                return (inserted, Some(self.split_internal(node_id)));
            }
        }
        (inserted, None)
    }

    fn split_leaf(&mut self, node_id: NodeId) -> (i32, NodeId) {
        let node = &mut self.nodes[node_id];
        let keep = node.keys.len().div_ceil(2);
        let mut right = Node::leaf(node.keys.split_off(keep), node.values.split_off(keep));
        right.next = node.next;
        let separator = right.keys[0];

        let right_id = self.alloc(right);
        self.nodes[node_id].next = Some(right_id);
        (separator, right_id)
    }

    fn split_internal(&mut self, node_id: NodeId) -> (i32, NodeId) {
        let node = &mut self.nodes[node_id];
        let keep = node.children.len().div_ceil(2);
        let children = node.children.split_off(keep);
        let mut keys = node.keys.split_off(keep - 1);
        let separator = keys.remove(0);

        let right_id = self.alloc(Node::internal(keys, children));
        (separator, right_id)
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Removes `id` from `key`. Returns false if the pair was not present.
    pub fn delete(&mut self, key: i32, id: TupleId) -> bool {
        let removed = self.delete_from(self.root, key, id);
        if !removed {
            return false;
        }
        self.entry_count -= 1;

        while !self.nodes[self.root].leaf && self.nodes[self.root].children.len() == 1 {
            let old = self.root;
            self.root = self.nodes[old].children[0];
            self.release(old);
            self.height -= 1;
        }
        true
    }

    fn delete_from(&mut self, node_id: NodeId, key: i32, id: TupleId) -> bool {
        if self.nodes[node_id].leaf {
            let node = &mut self.nodes[node_id];
            let Ok(pos) = node.keys.binary_search(&key) else {
                return false;
            };
            if !node.values[pos].remove(id) {
                return false;
            }
            if node.values[pos].is_empty() {
                node.keys.remove(pos);
                node.values.remove(pos);
                self.key_count -= 1;
            }
            return true;
        }

        let pos = child_index(&self.nodes[node_id].keys, key);
        let child = self.nodes[node_id].children[pos];
        let removed = self.delete_from(child, key, id);
        if removed && self.nodes[child].entries() < self.min_entries(child) {
            self.rebalance_child(node_id, pos);
        }
        removed
    }

    /// Restores occupancy of `children[pos]` of `parent`: borrow from a
    /// sibling above the minimum (left first), otherwise merge.
    fn rebalance_child(&mut self, parent: NodeId, pos: usize) {
        let siblings = self.nodes[parent].children.len();
        let min = self.min_entries(self.nodes[parent].children[pos]);

        if pos > 0 {
            let left = self.nodes[parent].children[pos - 1];
            if self.nodes[left].entries() > min {
                self.borrow_from_left(parent, pos);
                return;
            }
        }
        if pos + 1 < siblings {
            let right = self.nodes[parent].children[pos + 1];
            if self.nodes[right].entries() > min {
                self.borrow_from_right(parent, pos);
                return;
            }
        }
        if pos > 0 {
            self.merge_children(parent, pos - 1);
        } else if pos + 1 < siblings {
            self.merge_children(parent, pos);
        }
    }

    fn borrow_from_left(&mut self, parent: NodeId, pos: usize) {
        let left_id = self.nodes[parent].children[pos - 1];
        let node_id = self.nodes[parent].children[pos];
        let mut left = std::mem::take(&mut self.nodes[left_id]);
        let mut node = std::mem::take(&mut self.nodes[node_id]);

        if node.leaf {
            if let (Some(key), Some(ids)) = (left.keys.pop(), left.values.pop()) {
                node.keys.insert(0, key);
                node.values.insert(0, ids);
                self.nodes[parent].keys[pos - 1] = key;
            }
        } else if let (Some(child), Some(key)) = (left.children.pop(), left.keys.pop()) {
            let separator = std::mem::replace(&mut self.nodes[parent].keys[pos - 1], key);
            node.children.insert(0, child);
            node.keys.insert(0, separator);
        }

        self.nodes[left_id] = left;
        self.nodes[node_id] = node;
    }

    fn borrow_from_right(&mut self, parent: NodeId, pos: usize) {
        let node_id = self.nodes[parent].children[pos];
        let right_id = self.nodes[parent].children[pos + 1];
        let mut node = std::mem::take(&mut self.nodes[node_id]);
        let mut right = std::mem::take(&mut self.nodes[right_id]);

        if node.leaf {
            node.keys.push(right.keys.remove(0));
            node.values.push(right.values.remove(0));
            self.nodes[parent].keys[pos] = right.keys[0];
        } else {
            let key = right.keys.remove(0);
            let separator = std::mem::replace(&mut self.nodes[parent].keys[pos], key);
            node.children.push(right.children.remove(0));
            node.keys.push(separator);
        }

        self.nodes[node_id] = node;
        self.nodes[right_id] = right;
    }

    /// Folds `children[pos + 1]` into `children[pos]`.
    fn merge_children(&mut self, parent: NodeId, pos: usize) {
        let separator = self.nodes[parent].keys.remove(pos);
        let right_id = self.nodes[parent].children.remove(pos + 1);
        let left_id = self.nodes[parent].children[pos];
        let right = std::mem::take(&mut self.nodes[right_id]);

        let left = &mut self.nodes[left_id];
        if left.leaf {
            left.keys.extend(right.keys);
            left.values.extend(right.values);
            left.next = right.next;
        } else {
            left.keys.push(separator);
            left.keys.extend(right.keys);
            left.children.extend(right.children);
        }
        self.release(right_id);
    }
}

/// Ascending iterator over `(key, ids)` pairs
pub struct Iter<'a> {
    tree: &'a BPlusTree,
    leaf: Option<NodeId>,
    pos: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (i32, &'a IdSet);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = &self.tree.nodes[self.leaf?];
            if self.pos < node.keys.len() {
                let item = (node.keys[self.pos], &node.values[self.pos]);
                self.pos += 1;
                return Some(item);
            }
            self.leaf = node.next;
            self.pos = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[TupleId]) -> Vec<TupleId> {
        values.to_vec()
    }

    #[test]
    fn test_order_below_two_rejected() {
        assert!(BPlusTree::new(0).is_err());
        let err = BPlusTree::new(1).unwrap_err();
        assert_eq!(err.code().code(), "TABLEDB_INDEX_INVALID_ORDER");
        assert!(BPlusTree::new(2).is_ok());
    }

    #[test]
    fn test_insert_and_get() {
        let mut tree = BPlusTree::new(4).unwrap();
        assert!(tree.insert(10, 1));
        assert!(tree.insert(10, 2));
        assert!(!tree.insert(10, 2));
        assert!(tree.insert(20, 3));

        assert_eq!(tree.get(10).to_vec(), ids(&[1, 2]));
        assert_eq!(tree.get(20).to_vec(), ids(&[3]));
        assert!(tree.get(15).is_empty());
        assert_eq!(tree.key_count(), 2);
        assert_eq!(tree.entry_count(), 3);
    }

    #[test]
    fn test_root_split_grows_height() {
        let mut tree = BPlusTree::new(3).unwrap();
        for k in 0..3 {
            tree.insert(k, k as TupleId);
        }
        assert_eq!(tree.height(), 1);
        tree.insert(3, 3);
        assert_eq!(tree.height(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn test_range_query_bounds() {
        let mut tree = BPlusTree::new(3).unwrap();
        for k in 1..=20 {
            tree.insert(k * 10, k as TupleId);
        }

        assert_eq!(tree.range_query(Some(35), Some(70)).to_vec(), ids(&[4, 5, 6, 7]));
        assert_eq!(tree.range_query(None, Some(30)).to_vec(), ids(&[1, 2, 3]));
        assert_eq!(tree.range_query(Some(185), None).to_vec(), ids(&[19, 20]));
        assert_eq!(tree.range_query(None, None).len(), 20);
        assert!(tree.range_query(Some(70), Some(35)).is_empty());
        assert!(tree.range_query(Some(201), None).is_empty());
    }

    #[test]
    fn test_delete_removes_key_when_empty() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.insert(5, 1);
        tree.insert(5, 2);

        assert!(tree.delete(5, 1));
        assert_eq!(tree.get(5).to_vec(), ids(&[2]));
        assert!(!tree.delete(5, 1));

        assert!(tree.delete(5, 2));
        assert!(tree.is_empty());
        assert!(!tree.delete(99, 1));
    }

    #[test]
    fn test_delete_shrinks_height() {
        let mut tree = BPlusTree::new(3).unwrap();
        for k in 0..50 {
            tree.insert(k, k as TupleId);
        }
        let tall = tree.height();
        assert!(tall > 2);

        for k in 0..50 {
            assert!(tree.delete(k, k as TupleId));
            tree.validate().unwrap();
        }
        assert_eq!(tree.height(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_iter_ascending() {
        let mut tree = BPlusTree::new(2).unwrap();
        for k in [7, -3, 12, 0, 5, -9] {
            tree.insert(k, 1);
        }
        assert_eq!(tree.keys(), vec![-9, -3, 0, 5, 7, 12]);
    }

    #[test]
    fn test_extreme_keys() {
        let mut tree = BPlusTree::new(4).unwrap();
        tree.insert(i32::MIN, 1);
        tree.insert(i32::MAX, 2);
        tree.insert(0, 3);

        assert_eq!(tree.range_query(Some(i32::MIN), Some(i32::MIN)).to_vec(), ids(&[1]));
        assert_eq!(tree.range_query(Some(i32::MAX), None).to_vec(), ids(&[2]));
        assert_eq!(tree.range_query(None, None).to_vec(), ids(&[1, 2, 3]));
    }
}
