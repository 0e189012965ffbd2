//! B+Tree Invariant Tests
//!
//! Tests for the ordered index:
//! - get reflects every insert and delete
//! - Bulk construction validates and answers ranges like incremental inserts
//! - Random insert/delete interleavings validate after every step
//! - Height grows and shrinks with the data

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabledb::index::{BPlusTree, IndexErrorCode};
use tabledb::tuple::TupleId;

const ORDERS: [usize; 5] = [2, 3, 4, 5, 16];

// =============================================================================
// Helper Functions
// =============================================================================

type Model = BTreeMap<i32, BTreeSet<TupleId>>;

fn model_range(model: &Model, low: Option<i32>, high: Option<i32>) -> Vec<TupleId> {
    let mut ids: Vec<TupleId> = model
        .iter()
        .filter(|(k, _)| low.map_or(true, |l| **k >= l) && high.map_or(true, |h| **k <= h))
        .flat_map(|(_, ids)| ids.iter().copied())
        .collect();
    ids.sort_unstable();
    ids
}

fn random_pairs(seed: u64, count: usize, span: i32) -> Vec<(i32, TupleId)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count as TupleId)
        .map(|id| (rng.gen_range(0..span), id))
        .collect()
}

// =============================================================================
// Insert / Get / Delete
// =============================================================================

/// get(k) contains id after insert(k, id) and not after delete(k, id).
#[test]
fn test_get_tracks_insert_and_delete() {
    for order in ORDERS {
        let mut tree = BPlusTree::new(order).unwrap();
        let pairs = random_pairs(order as u64, 400, 100);

        for &(key, id) in &pairs {
            tree.insert(key, id);
            assert!(tree.get(key).contains(id));
        }
        for &(key, id) in pairs.iter().step_by(2) {
            assert!(tree.delete(key, id));
            assert!(!tree.get(key).contains(id));
            assert!(!tree.delete(key, id));
        }
        tree.validate().unwrap();
        assert_eq!(tree.entry_count(), 200);
    }
}

/// Deleting everything returns the tree to a single empty leaf.
#[test]
fn test_delete_all_collapses_height() {
    let mut tree = BPlusTree::new(3).unwrap();
    let pairs = random_pairs(9, 300, 1000);
    for &(key, id) in &pairs {
        tree.insert(key, id);
    }
    assert!(tree.height() > 2);

    for &(key, id) in &pairs {
        assert!(tree.delete(key, id));
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 1);
    tree.validate().unwrap();
}

// =============================================================================
// Bulk Construction
// =============================================================================

/// Bulk load validates and matches incremental insertion on every range.
#[test]
fn test_bulk_matches_incremental() {
    let mut rng = StdRng::seed_from_u64(77);
    for order in ORDERS {
        for count in [0, 1, 2, 7, 64, 500] {
            let mut pairs = random_pairs(count as u64 + order as u64, count, 120);
            pairs.sort_unstable();

            let bulk = BPlusTree::bulk_load(order, pairs.iter().copied()).unwrap();
            bulk.validate().unwrap();

            let mut incremental = BPlusTree::new(order).unwrap();
            for &(key, id) in &pairs {
                incremental.insert(key, id);
            }

            assert_eq!(bulk.keys(), incremental.keys());
            assert_eq!(bulk.entry_count(), incremental.entry_count());
            for _ in 0..30 {
                let low = rng.gen_range(-10..130);
                let high = rng.gen_range(-10..130);
                assert_eq!(
                    bulk.range_query(Some(low), Some(high)),
                    incremental.range_query(Some(low), Some(high))
                );
            }
            assert_eq!(bulk.range_query(None, None), incremental.range_query(None, None));
        }
    }
}

/// Unsorted input is rejected before anything is built.
#[test]
fn test_bulk_rejects_unsorted() {
    let err = BPlusTree::bulk_load(4, vec![(1, 0), (5, 1), (3, 2)]).unwrap_err();
    assert_eq!(err.code(), IndexErrorCode::UnsortedInput);
    assert!(!err.is_fatal());
}

/// A bulk-built tree keeps its invariants under further mutation.
#[test]
fn test_bulk_then_mutate() {
    for order in ORDERS {
        let mut pairs = random_pairs(5, 300, 50);
        pairs.sort_unstable();
        let mut tree = BPlusTree::bulk_load(order, pairs.clone()).unwrap();

        for &(key, id) in pairs.iter().rev().step_by(3) {
            assert!(tree.delete(key, id));
        }
        for id in 300..400 {
            tree.insert((id % 70) as i32, id);
        }
        tree.validate().unwrap();
    }
}

// =============================================================================
// Random Interleavings
// =============================================================================

/// Every step of a random insert/delete mix leaves a valid tree that
/// matches the model.
#[test]
fn test_random_interleavings_validate_every_step() {
    for order in ORDERS {
        let mut rng = StdRng::seed_from_u64(1000 + order as u64);
        let mut tree = BPlusTree::new(order).unwrap();
        let mut model = Model::new();
        let mut live: Vec<(i32, TupleId)> = Vec::new();
        let mut next_id: TupleId = 0;

        for _ in 0..1500 {
            if live.is_empty() || rng.gen_bool(0.6) {
                let key = rng.gen_range(-200..200);
                tree.insert(key, next_id);
                model.entry(key).or_default().insert(next_id);
                live.push((key, next_id));
                next_id += 1;
            } else {
                let (key, id) = live.swap_remove(rng.gen_range(0..live.len()));
                assert!(tree.delete(key, id));
                let ids = model.get_mut(&key).unwrap();
                ids.remove(&id);
                if ids.is_empty() {
                    model.remove(&key);
                }
            }
            tree.validate().unwrap();
        }

        assert_eq!(tree.keys(), model.keys().copied().collect::<Vec<_>>());
        for _ in 0..50 {
            let low = rng.gen_range(-250..250);
            let high = low + rng.gen_range(0..100);
            assert_eq!(
                tree.range_query(Some(low), Some(high)).to_vec(),
                model_range(&model, Some(low), Some(high))
            );
        }
        assert_eq!(
            tree.range_query(None, Some(0)).to_vec(),
            model_range(&model, None, Some(0))
        );
    }
}
