//! Randomized B+Tree scenarios
//!
//! A `TreeFixture` drives a tree with seeded random keys and mirrors every
//! operation in a plain `BTreeMap`, so each check compares the tree against
//! an obviously-correct model.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::errors::{FixtureError, FixtureResult};
use super::report::ScenarioReport;
use crate::index::BPlusTree;
use crate::observability::ObservationScope;
use crate::tuple::TupleId;

/// Keys are drawn from `-KEY_SPAN..KEY_SPAN`
pub const KEY_SPAN: i32 = 10_000;

/// Seeded tree workload with a reference model
#[derive(Debug)]
pub struct TreeFixture {
    tree: BPlusTree,
    rng: StdRng,
    model: BTreeMap<i32, BTreeSet<TupleId>>,
    live: Vec<(i32, TupleId)>,
    next_id: TupleId,
}

impl TreeFixture {
    pub fn new(order: usize, seed: u64) -> FixtureResult<Self> {
        Ok(Self {
            tree: BPlusTree::new(order)?,
            rng: StdRng::seed_from_u64(seed),
            model: BTreeMap::new(),
            live: Vec::new(),
            next_id: 0,
        })
    }

    pub fn tree(&self) -> &BPlusTree {
        &self.tree
    }

    /// Pairs currently stored
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    fn insert_one(&mut self) -> FixtureResult<()> {
        let key = self.rng.gen_range(-KEY_SPAN..KEY_SPAN);
        let id = self.next_id;
        self.next_id += 1;

        if !self.tree.insert(key, id) {
            return Err(FixtureError::CheckFailed(format!(
                "fresh pair ({}, {}) reported as present",
                key, id
            )));
        }
        self.model.entry(key).or_default().insert(id);
        self.live.push((key, id));
        Ok(())
    }

    fn delete_one(&mut self) -> FixtureResult<()> {
        if self.live.is_empty() {
            return Ok(());
        }
        let (key, id) = self.live.swap_remove(self.rng.gen_range(0..self.live.len()));

        if !self.tree.delete(key, id) {
            return Err(FixtureError::CheckFailed(format!(
                "stored pair ({}, {}) not found on delete",
                key, id
            )));
        }
        if let Some(ids) = self.model.get_mut(&key) {
            ids.remove(&id);
            if ids.is_empty() {
                self.model.remove(&key);
            }
        }
        Ok(())
    }

    /// Inserts `count` random keys under fresh identifiers
    pub fn insert(&mut self, count: usize) -> FixtureResult<()> {
        for _ in 0..count {
            self.insert_one()?;
        }
        Ok(())
    }

    /// Deletes up to `count` randomly chosen stored pairs
    pub fn delete(&mut self, count: usize) -> FixtureResult<()> {
        for _ in 0..count.min(self.live.len()) {
            self.delete_one()?;
        }
        Ok(())
    }

    /// Runs `count` operations, each an insert with probability
    /// `insert_percent`% and otherwise a delete
    pub fn mix(&mut self, count: usize, insert_percent: u32) -> FixtureResult<()> {
        for _ in 0..count {
            if self.live.is_empty() || self.rng.gen_range(0..100) < insert_percent {
                self.insert_one()?;
            } else {
                self.delete_one()?;
            }
        }
        Ok(())
    }

    /// Looks up every stored key and a sample of absent ones
    pub fn check_gets(&mut self) -> FixtureResult<()> {
        for (key, expected) in &self.model {
            let found: BTreeSet<TupleId> = self.tree.get(*key).iter().collect();
            if &found != expected {
                return Err(FixtureError::CheckFailed(format!(
                    "get({}) returned {:?}, expected {:?}",
                    key, found, expected
                )));
            }
        }
        for _ in 0..100 {
            let key = self.rng.gen_range(-2 * KEY_SPAN..2 * KEY_SPAN);
            if !self.model.contains_key(&key) && !self.tree.get(key).is_empty() {
                return Err(FixtureError::CheckFailed(format!(
                    "get({}) found ids for an absent key",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Structural validation plus a full comparison with the model
    pub fn validate(&self) -> FixtureResult<()> {
        self.tree.validate()?;

        if self.tree.entry_count() != self.live.len() {
            return Err(FixtureError::CheckFailed(format!(
                "tree holds {} ids, expected {}",
                self.tree.entry_count(),
                self.live.len()
            )));
        }
        let contents: BTreeMap<i32, BTreeSet<TupleId>> = self
            .tree
            .iter()
            .map(|(key, ids)| (key, ids.iter().collect()))
            .collect();
        if contents != self.model {
            return Err(FixtureError::CheckFailed(
                "tree contents differ from the reference model".to_string(),
            ));
        }
        Ok(())
    }
}

/// Insert 1000, get, delete 500, 1000 mixed ops at 80% inserts, validate
pub fn run_tree_scenarios(order: usize, seed: u64) -> FixtureResult<Vec<ScenarioReport>> {
    let mut fixture = TreeFixture::new(order, seed)?;
    let steps: [(&str, fn(&mut TreeFixture) -> FixtureResult<()>); 5] = [
        ("insert", |f| f.insert(1000)),
        ("get", |f| f.check_gets()),
        ("delete", |f| f.delete(500)),
        ("mix", |f| f.mix(1000, 80)),
        ("validate", |f| f.validate()),
    ];

    let order_field = order.to_string();
    let mut reports = Vec::new();
    for (name, step) in steps {
        let scope = ObservationScope::new(
            "TREE_SCENARIO",
            &[("name", name), ("order", order_field.as_str())],
        );
        match step(&mut fixture) {
            Ok(()) => {
                let detail = format!(
                    "{} pairs, {} keys, height {}",
                    fixture.len(),
                    fixture.tree().key_count(),
                    fixture.tree().height()
                );
                scope.complete(&[("pairs", fixture.len().to_string().as_str())]);
                reports.push(ScenarioReport::pass(name, detail));
            }
            Err(err) => {
                scope.fail(&err.to_string());
                reports.push(ScenarioReport::fail(name, err.to_string()));
            }
        }
    }
    Ok(reports)
}
