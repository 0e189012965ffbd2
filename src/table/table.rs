//! Table: tuple storage plus its indexes
//!
//! Every mutating operation validates its input before touching storage, so a
//! returned error always leaves the table unchanged.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::errors::{TableError, TableResult};
use super::storage::TupleStore;
use crate::config::EngineConfig;
use crate::index::BPlusTree;
use crate::observability::{Logger, TableMetrics};
use crate::tuple::{IdSet, Tuple, TupleId};

/// Kind of index an attribute carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Physical storage is ordered by this attribute
    Clustered,
    /// Index only; storage order untouched
    Secondary,
}

impl IndexKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexKind::Clustered => "clustered",
            IndexKind::Secondary => "secondary",
        }
    }
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single table of integer-valued tuples
#[derive(Debug)]
pub struct Table {
    name: String,
    attributes: BTreeSet<String>,
    config: EngineConfig,
    pub(super) store: TupleStore,
    clustered: Option<String>,
    /// Every index, the clustered one included
    pub(super) indexes: BTreeMap<String, BPlusTree>,
    pub(super) metrics: TableMetrics,
}

impl Table {
    /// Creates an empty table with the default engine config
    pub fn new<I, S>(name: impl Into<String>, attributes: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_config(name, attributes, EngineConfig::default())
    }

    pub fn with_config<I, S>(
        name: impl Into<String>,
        attributes: I,
        config: EngineConfig,
    ) -> TableResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let attributes: BTreeSet<String> = attributes.into_iter().map(Into::into).collect();
        if attributes.is_empty() {
            return Err(TableError::invalid_config(format!(
                "Table '{}' needs at least one attribute",
                name
            )));
        }
        if attributes.iter().any(|attribute| attribute.is_empty()) {
            return Err(TableError::invalid_config(format!(
                "Table '{}' has an empty attribute name",
                name
            )));
        }
        config
            .validate()
            .map_err(|err| TableError::invalid_config(err.to_string()))?;

        Ok(Self {
            name,
            attributes,
            config,
            store: TupleStore::new(),
            clustered: None,
            indexes: BTreeMap::new(),
            metrics: TableMetrics::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute names in ascending order
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attributes.contains(attribute)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &TableMetrics {
        &self.metrics
    }

    /// Number of live tuples
    pub fn len(&self) -> usize {
        self.store.live_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifier the next inserted tuple will receive
    pub fn next_id(&self) -> TupleId {
        self.store.next_id()
    }

    /// Live tuple by identifier
    pub fn get(&self, id: TupleId) -> Option<&Tuple> {
        self.store.get(id)
    }

    pub fn live_ids(&self) -> IdSet {
        self.store.live_ids()
    }

    /// Live identifiers in physical storage order
    pub fn physical_order(&self) -> Vec<TupleId> {
        self.store.physical().map(|(id, _)| id).collect()
    }

    pub fn clustered_attribute(&self) -> Option<&str> {
        self.clustered.as_deref()
    }

    pub fn index_kind(&self, attribute: &str) -> Option<IndexKind> {
        if self.clustered.as_deref() == Some(attribute) {
            Some(IndexKind::Clustered)
        } else if self.indexes.contains_key(attribute) {
            Some(IndexKind::Secondary)
        } else {
            None
        }
    }

    pub fn index(&self, attribute: &str) -> Option<&BPlusTree> {
        self.indexes.get(attribute)
    }

    pub(super) fn check_attribute(&self, attribute: &str) -> TableResult<()> {
        if self.attributes.contains(attribute) {
            Ok(())
        } else {
            Err(TableError::unknown_attribute(&self.name, attribute))
        }
    }

    fn check_schema(&self, tuple: &Tuple) -> TableResult<()> {
        if let Some(extra) = tuple.columns().find(|column| !self.attributes.contains(*column)) {
            return Err(TableError::schema_mismatch(
                &self.name,
                format!("unexpected column '{}'", extra),
            ));
        }
        if let Some(missing) = self.attributes.iter().find(|attribute| !tuple.contains(attribute)) {
            return Err(TableError::schema_mismatch(
                &self.name,
                format!("missing column '{}'", missing),
            ));
        }
        Ok(())
    }

    // ==================== Insert & load ====================

    /// Stores one tuple and adds it to every index incrementally
    pub fn insert(&mut self, tuple: Tuple) -> TableResult<TupleId> {
        self.check_schema(&tuple)?;

        let id = match &self.clustered {
            Some(attribute) => self.store.insert_clustered(tuple, attribute),
            None => self.store.append(tuple),
        };
        for (attribute, index) in self.indexes.iter_mut() {
            if let Some(value) = self.store.value(id, attribute) {
                index.insert(value, id);
            }
        }

        self.metrics.add_inserted(1);
        Ok(id)
    }

    /// Stores many tuples at once
    ///
    /// Equivalent to inserting each tuple in order, but existing indexes are
    /// rebuilt once by bulk construction instead of updated per tuple. Every
    /// tuple is validated first; on error nothing is stored.
    pub fn load<I>(&mut self, tuples: I) -> TableResult<IdSet>
    where
        I: IntoIterator<Item = Tuple>,
    {
        let tuples: Vec<Tuple> = tuples.into_iter().collect();
        for tuple in &tuples {
            self.check_schema(tuple)?;
        }
        if tuples.is_empty() {
            return Ok(IdSet::new());
        }

        // Build replacement indexes before storage changes.
        let first_id = self.store.next_id();
        let mut rebuilt = BTreeMap::new();
        for attribute in self.indexes.keys() {
            let mut pairs = self.store.sorted_pairs(attribute);
            pairs.extend(
                tuples
                    .iter()
                    .zip(first_id..)
                    .filter_map(|(tuple, id)| tuple.get(attribute).map(|value| (value, id))),
            );
            pairs.sort_unstable();
            let index = BPlusTree::bulk_load(self.config.btree_order, pairs)?;
            rebuilt.insert(attribute.clone(), index);
        }

        let count = tuples.len();
        let ids: IdSet = tuples.into_iter().map(|tuple| self.store.append(tuple)).collect();
        if let Some(attribute) = &self.clustered {
            self.store.cluster_by(attribute);
        }
        for (attribute, index) in rebuilt {
            let keys = index.key_count().to_string();
            Logger::trace(
                "INDEX_REBUILT",
                &[
                    ("table", self.name.as_str()),
                    ("attribute", attribute.as_str()),
                    ("keys", keys.as_str()),
                ],
            );
            self.metrics.increment_index_rebuilds();
            self.indexes.insert(attribute, index);
        }

        self.metrics.add_loaded(count as u64);
        Ok(ids)
    }

    // ==================== Index declaration ====================

    /// Clusters storage on `attribute` and indexes it
    ///
    /// Only one attribute can cluster a table. Declaring a second one builds a
    /// secondary index instead and reports `IndexKind::Secondary`.
    pub fn declare_clustered_index(&mut self, attribute: &str) -> TableResult<IndexKind> {
        self.check_attribute(attribute)?;
        match self.clustered.as_deref() {
            Some(existing) if existing == attribute => return Ok(IndexKind::Clustered),
            Some(existing) => {
                Logger::warn(
                    "CLUSTERED_INDEX_EXISTS",
                    &[
                        ("table", self.name.as_str()),
                        ("clustered", existing),
                        ("attribute", attribute),
                    ],
                );
                return self.declare_secondary_index(attribute);
            }
            None => {}
        }

        let index = self.build_index(attribute)?;
        self.store.cluster_by(attribute);
        self.register_index(attribute, index, IndexKind::Clustered);
        self.clustered = Some(attribute.to_string());
        Ok(IndexKind::Clustered)
    }

    /// Indexes `attribute` without reordering storage
    pub fn declare_secondary_index(&mut self, attribute: &str) -> TableResult<IndexKind> {
        self.check_attribute(attribute)?;
        if let Some(kind) = self.index_kind(attribute) {
            return Ok(kind);
        }

        let index = self.build_index(attribute)?;
        self.register_index(attribute, index, IndexKind::Secondary);
        Ok(IndexKind::Secondary)
    }

    fn build_index(&self, attribute: &str) -> TableResult<BPlusTree> {
        let pairs = self.store.sorted_pairs(attribute);
        Ok(BPlusTree::bulk_load(self.config.btree_order, pairs)?)
    }

    fn register_index(&mut self, attribute: &str, index: BPlusTree, kind: IndexKind) {
        let keys = index.key_count().to_string();
        let height = index.height().to_string();
        Logger::info(
            "INDEX_DECLARED",
            &[
                ("table", self.name.as_str()),
                ("attribute", attribute),
                ("kind", kind.as_str()),
                ("keys", keys.as_str()),
                ("height", height.as_str()),
            ],
        );
        self.indexes.insert(attribute.to_string(), index);
    }

    // ==================== Delete & update ====================

    /// Deletes every live tuple in `ids`, returning how many were removed
    ///
    /// Unknown and already-deleted identifiers are ignored.
    pub fn delete(&mut self, ids: &IdSet) -> usize {
        let mut deleted = 0;
        for id in ids.iter() {
            let Some(tuple) = self.store.tombstone(id) else {
                continue;
            };
            for (attribute, index) in self.indexes.iter_mut() {
                if let Some(value) = tuple.get(attribute) {
                    let removed = index.delete(value, id);
                    debug_assert!(removed, "tuple {} missing from index on {}", id, attribute);
                }
            }
            deleted += 1;
        }

        self.metrics.add_deleted(deleted as u64);
        deleted
    }

    /// Sets `attribute` to `value` on every live tuple in `ids`
    ///
    /// Identifiers stay stable. Changing the clustering attribute moves the
    /// tuple's physical slot so storage order keeps matching the index.
    pub fn update(&mut self, attribute: &str, ids: &IdSet, value: i32) -> TableResult<usize> {
        self.check_attribute(attribute)?;

        let mut updated = 0;
        let mut moved = false;
        for id in ids.iter() {
            let Some(old) = self.store.set_value(id, attribute, value) else {
                continue;
            };
            if old != value {
                if let Some(index) = self.indexes.get_mut(attribute) {
                    let removed = index.delete(old, id);
                    debug_assert!(removed, "tuple {} missing from index on {}", id, attribute);
                    index.insert(value, id);
                }
                moved = true;
            }
            updated += 1;
        }

        if moved && self.clustered.as_deref() == Some(attribute) {
            self.store.cluster_by(attribute);
        }

        self.metrics.add_updated(updated as u64);
        Ok(updated)
    }

    // ==================== Consistency ====================

    /// Validates every index and cross-checks it against storage
    ///
    /// Any failure is FATAL: it means an index and storage diverged.
    pub fn validate(&self) -> TableResult<()> {
        let live = self.store.live_count();
        for (attribute, index) in &self.indexes {
            index.validate()?;
            if index.entry_count() != live {
                return Err(TableError::index_inconsistent(
                    attribute,
                    format!("{} entries for {} live tuples", index.entry_count(), live),
                ));
            }
            for (id, tuple) in self.store.physical() {
                let Some(value) = tuple.get(attribute) else {
                    return Err(TableError::index_inconsistent(
                        attribute,
                        format!("tuple {} has no value", id),
                    ));
                };
                if !index.get(value).contains(id) {
                    return Err(TableError::index_inconsistent(
                        attribute,
                        format!("tuple {} missing under key {}", id, value),
                    ));
                }
            }
        }

        if let Some(attribute) = &self.clustered {
            if !self.store.is_clustered_by(attribute) {
                return Err(TableError::index_inconsistent(
                    attribute,
                    "physical order does not follow the clustered index",
                ));
            }
        }
        Ok(())
    }
}
