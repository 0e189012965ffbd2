//! Table Scenario Tests
//!
//! End-to-end behavior of the table API:
//! - Filter then materialize returns projected tuples in identifier order
//! - Clustered index stays valid across updates of the clustering attribute
//! - Composite AND equals the intersection of its sides
//! - Filter/delete round-trip and materialize idempotence
//! - Bulk load is equivalent to repeated insert

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tabledb::config::EngineConfig;
use tabledb::filter::Filter;
use tabledb::table::{IndexKind, Table, TableErrorCode};
use tabledb::tuple::{IdSet, Tuple};

// =============================================================================
// Helper Functions
// =============================================================================

fn abc(a: i32, b: i32, c: i32) -> Tuple {
    Tuple::new().with("A", a).with("B", b).with("C", c)
}

fn empty_table() -> Table {
    Table::with_config("test_table", ["A", "B", "C"], EngineConfig::with_order(4)).unwrap()
}

fn random_tuples(count: usize, seed: u64, span: i32) -> Vec<Tuple> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            abc(
                rng.gen_range(0..span),
                rng.gen_range(0..span),
                rng.gen_range(0..span),
            )
        })
        .collect()
}

fn ids(values: &[u64]) -> IdSet {
    values.iter().copied().collect()
}

// =============================================================================
// Filter & Materialize
// =============================================================================

/// Filter on A then project A only.
#[test]
fn test_filter_then_materialize_projection() {
    let mut table = empty_table();
    let first = table.insert(abc(10, 20, 30)).unwrap();
    let second = table.insert(abc(15, 25, 35)).unwrap();
    table.insert(abc(5, 5, 5)).unwrap();

    let result = table.filter(&Filter::between("A", 10, 15)).unwrap();
    assert_eq!(result.to_vec(), vec![first, second]);

    let rows: Vec<Tuple> = table
        .materialize(&["A"], Some(&result))
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        rows,
        vec![Tuple::new().with("A", 10), Tuple::new().with("A", 15)]
    );
}

/// Same answer with and without a clustered index.
#[test]
fn test_filter_same_with_clustered_index() {
    let mut table = empty_table();
    table.load(random_tuples(300, 11, 100)).unwrap();
    let filter = Filter::between("A", 20, 40);
    let before = table.filter(&filter).unwrap();

    assert_eq!(table.declare_clustered_index("A").unwrap(), IndexKind::Clustered);
    assert_eq!(table.filter(&filter).unwrap(), before);
}

/// Repeating materialize without mutation yields the same sequence.
#[test]
fn test_materialize_idempotent() {
    let mut table = empty_table();
    table.load(random_tuples(200, 3, 50)).unwrap();
    table.declare_clustered_index("B").unwrap();

    let matched = table.filter(&Filter::at_least("C", 25)).unwrap();
    let first = table.materialize(&["A", "B", "C"], Some(&matched)).unwrap();
    let second = table.materialize(&["A", "B", "C"], Some(&matched)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.iter().count(), first.iter().count());
}

// =============================================================================
// Clustered Index & Update
// =============================================================================

/// Updating the clustering attribute keeps the clustered index valid.
#[test]
fn test_update_clustering_attribute() {
    let mut table = empty_table();
    let five = table.insert(abc(5, 0, 0)).unwrap();
    table.insert(abc(10, 0, 0)).unwrap();
    let fifteen = table.insert(abc(15, 0, 0)).unwrap();
    table.declare_clustered_index("A").unwrap();

    let updated = table
        .update("A", &table.filter(&Filter::eq("A", 5)).unwrap(), 20)
        .unwrap();
    assert_eq!(updated, 1);

    let result = table.filter(&Filter::between("A", 10, 20)).unwrap();
    assert!(result.contains(fifteen));
    assert!(result.contains(five));
    assert_eq!(result.len(), 3);

    table.index("A").unwrap().validate().unwrap();
    table.validate().unwrap();
    assert_eq!(table.physical_order().last(), Some(&five));
}

/// Second clustered declaration on another attribute becomes secondary.
#[test]
fn test_second_clustered_declaration() {
    let mut table = empty_table();
    table.load(random_tuples(50, 5, 20)).unwrap();

    assert_eq!(table.declare_clustered_index("A").unwrap(), IndexKind::Clustered);
    assert_eq!(table.declare_clustered_index("B").unwrap(), IndexKind::Secondary);
    assert_eq!(table.clustered_attribute(), Some("A"));
    assert_eq!(table.index_kind("B"), Some(IndexKind::Secondary));
    table.validate().unwrap();
}

/// Mixed updates keep every index consistent with storage.
#[test]
fn test_random_updates_keep_indexes_consistent() {
    let mut table = empty_table();
    table.load(random_tuples(400, 8, 1000)).unwrap();
    table.declare_clustered_index("A").unwrap();
    table.declare_secondary_index("B").unwrap();

    let mut rng = StdRng::seed_from_u64(99);
    for round in 0..30 {
        let column = ["A", "B", "C"][round % 3];
        let chosen: IdSet = (0..50).map(|_| rng.gen_range(0..400u64)).collect();
        table.update(column, &chosen, rng.gen_range(0..1000)).unwrap();
        table.validate().unwrap();
    }
}

// =============================================================================
// Composite Filters
// =============================================================================

/// AND over two ranges equals the intersection of the single filters.
#[test]
fn test_composite_is_intersection() {
    let mut table = empty_table();
    table.load(random_tuples(1000, 42, 1000)).unwrap();

    let a = Filter::between("A", 500, 600);
    let b = Filter::between("B", 100, 200);
    let composite = table.filter(&a.clone().and(b.clone())).unwrap();

    let expected = table.filter(&a).unwrap().intersection(&table.filter(&b).unwrap());
    assert_eq!(composite, expected);

    for id in composite.iter() {
        let tuple = table.get(id).unwrap();
        assert!((500..=600).contains(&tuple.get("A").unwrap()));
        assert!((100..=200).contains(&tuple.get("B").unwrap()));
    }

    table.declare_secondary_index("B").unwrap();
    assert_eq!(table.filter(&a.and(b)).unwrap(), expected);
}

/// An unknown attribute anywhere in the tree is rejected.
#[test]
fn test_composite_with_unknown_attribute() {
    let mut table = empty_table();
    table.load(random_tuples(10, 1, 10)).unwrap();

    let filter = Filter::eq("A", 1).and(Filter::eq("B", 2).or(Filter::eq("Q", 3)));
    let err = table.filter(&filter).unwrap_err();
    assert_eq!(err.code(), TableErrorCode::UnknownAttribute);
}

// =============================================================================
// Delete Round-Trip
// =============================================================================

/// filter + delete removes exactly the matches; the filter then matches nothing.
#[test]
fn test_filter_delete_round_trip() {
    let mut table = empty_table();
    table.load(random_tuples(500, 17, 1000)).unwrap();
    table.declare_clustered_index("A").unwrap();
    table.declare_secondary_index("C").unwrap();

    let filter = Filter::between("A", 200, 400);
    let matched = table.filter(&filter).unwrap();
    let before = table.live_ids();

    assert_eq!(table.delete(&matched), matched.len());
    assert!(table.filter(&filter).unwrap().is_empty());
    assert_eq!(table.live_ids(), before.difference(&matched));
    table.validate().unwrap();
}

/// Deleted and unknown ids are ignored; ids are never reused.
#[test]
fn test_delete_ignores_unknown_ids() {
    let mut table = empty_table();
    table.load(vec![abc(1, 1, 1), abc(2, 2, 2)]).unwrap();

    assert_eq!(table.delete(&ids(&[0, 7, 8])), 1);
    assert_eq!(table.delete(&ids(&[0])), 0);
    assert_eq!(table.insert(abc(3, 3, 3)).unwrap(), 2);
}

// =============================================================================
// Load vs Insert
// =============================================================================

/// Bulk load and repeated insert produce the same table.
#[test]
fn test_load_matches_repeated_insert() {
    let tuples = random_tuples(600, 23, 200);

    let mut loaded = empty_table();
    loaded.declare_clustered_index("A").unwrap();
    loaded.declare_secondary_index("B").unwrap();
    let loaded_ids = loaded.load(tuples.clone()).unwrap();

    let mut inserted = empty_table();
    inserted.declare_clustered_index("A").unwrap();
    inserted.declare_secondary_index("B").unwrap();
    let inserted_ids: IdSet = tuples
        .into_iter()
        .map(|t| inserted.insert(t).unwrap())
        .collect();

    assert_eq!(loaded_ids, inserted_ids);
    assert_eq!(loaded.materialize_all(), inserted.materialize_all());
    assert_eq!(loaded.physical_order(), inserted.physical_order());
    for column in ["A", "B"] {
        assert_eq!(
            loaded.index(column).unwrap().keys(),
            inserted.index(column).unwrap().keys()
        );
    }
    loaded.validate().unwrap();
    inserted.validate().unwrap();
}

/// A failing load leaves the table untouched.
#[test]
fn test_load_rejects_bad_batch_atomically() {
    let mut table = empty_table();
    table.load(random_tuples(20, 2, 10)).unwrap();
    table.declare_secondary_index("A").unwrap();

    let mut batch = random_tuples(5, 4, 10);
    batch.push(Tuple::new().with("A", 1).with("B", 2));
    let err = table.load(batch).unwrap_err();

    assert_eq!(err.code(), TableErrorCode::SchemaMismatch);
    assert_eq!(table.len(), 20);
    assert_eq!(table.index("A").unwrap().entry_count(), 20);
}
