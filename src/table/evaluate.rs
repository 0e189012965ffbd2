//! Filter evaluation against a table
//!
//! Leaves on an indexed attribute become range queries; all other leaves scan
//! live storage. AND intersects and OR unions. Results are `IdSet`s, so they
//! come out in ascending identifier order whichever path produced them.

use super::errors::TableResult;
use super::table::{IndexKind, Table};
use crate::filter::{AccessPath, Filter, FilterOp, FilterPlan, RangePredicate};
use crate::tuple::IdSet;

/// Whether evaluation may consult indexes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Indexed,
    ScanOnly,
}

impl Table {
    /// Identifiers of live tuples satisfying `filter`
    ///
    /// Every attribute in the tree is checked before any evaluation starts.
    pub fn filter(&self, filter: &Filter) -> TableResult<IdSet> {
        self.check_filter(filter)?;
        self.metrics.increment_filters();
        Ok(self.evaluate(filter, Mode::Indexed))
    }

    /// Same as `filter` but never consults an index
    pub fn scan(&self, filter: &Filter) -> TableResult<IdSet> {
        self.check_filter(filter)?;
        self.metrics.increment_filters();
        Ok(self.evaluate(filter, Mode::ScanOnly))
    }

    /// The access path `filter` would take for each predicate
    pub fn explain(&self, filter: &Filter) -> TableResult<FilterPlan> {
        self.check_filter(filter)?;
        Ok(self.plan(filter))
    }

    fn check_filter(&self, filter: &Filter) -> TableResult<()> {
        for attribute in filter.attributes() {
            self.check_attribute(attribute)?;
        }
        Ok(())
    }

    fn plan(&self, filter: &Filter) -> FilterPlan {
        match filter {
            Filter::Range(predicate) => FilterPlan::Leaf {
                predicate: predicate.clone(),
                path: self.access_path(predicate, Mode::Indexed),
            },
            Filter::Composite { left, right, op } => FilterPlan::Composite {
                left: Box::new(self.plan(left)),
                right: Box::new(self.plan(right)),
                op: *op,
            },
        }
    }

    fn access_path(&self, predicate: &RangePredicate, mode: Mode) -> AccessPath {
        if mode == Mode::ScanOnly {
            return AccessPath::FullScan;
        }
        match self.index_kind(&predicate.attribute) {
            Some(IndexKind::Clustered) => AccessPath::ClusteredIndex,
            Some(IndexKind::Secondary) => AccessPath::SecondaryIndex,
            None => AccessPath::FullScan,
        }
    }

    fn evaluate(&self, filter: &Filter, mode: Mode) -> IdSet {
        match filter {
            Filter::Range(predicate) => self.evaluate_range(predicate, mode),
            Filter::Composite {
                left,
                right,
                op: FilterOp::Or,
            } => self.evaluate(left, mode).union(&self.evaluate(right, mode)),
            Filter::Composite {
                left,
                right,
                op: FilterOp::And,
            } => self.evaluate_and(left, right, mode),
        }
    }

    fn evaluate_and(&self, left: &Filter, right: &Filter, mode: Mode) -> IdSet {
        let (first, second) = if self.scans(left, mode) && !self.scans(right, mode) {
            (right, left)
        } else {
            (left, right)
        };

        let mut ids = self.evaluate(first, mode);
        if ids.is_empty() {
            return ids;
        }
        match second {
            // Test only the survivors instead of scanning the table again.
            Filter::Range(predicate) if self.scans(second, mode) => {
                ids.retain(|id| {
                    self.store
                        .value(id, &predicate.attribute)
                        .is_some_and(|value| predicate.matches(value))
                });
                ids
            }
            _ => ids.intersection(&self.evaluate(second, mode)),
        }
    }

    /// Whether `filter` is a single predicate that would need a full scan
    fn scans(&self, filter: &Filter, mode: Mode) -> bool {
        match filter {
            Filter::Range(predicate) => self.access_path(predicate, mode) == AccessPath::FullScan,
            Filter::Composite { .. } => false,
        }
    }

    fn evaluate_range(&self, predicate: &RangePredicate, mode: Mode) -> IdSet {
        if predicate.is_empty_range() {
            return IdSet::new();
        }
        if mode == Mode::Indexed {
            if let Some(index) = self.indexes.get(&predicate.attribute) {
                self.metrics.increment_index_probes();
                return index.range_query(predicate.low, predicate.high);
            }
        }

        self.metrics.increment_full_scans();
        self.store
            .physical()
            .filter(|(_, tuple)| {
                tuple
                    .get(&predicate.attribute)
                    .is_some_and(|value| predicate.matches(value))
            })
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::filter::{AccessPath, Filter, FilterPlan};
    use crate::table::{Table, TableErrorCode};
    use crate::tuple::{IdSet, Tuple};

    fn table() -> Table {
        let mut table = Table::with_config("t", ["A", "B"], EngineConfig::with_order(4)).unwrap();
        let rows = (0..20).map(|i| Tuple::new().with("A", i * 10).with("B", i % 4));
        table.load(rows).unwrap();
        table
    }

    fn ids(values: &[u64]) -> IdSet {
        values.iter().copied().collect()
    }

    #[test]
    fn test_unindexed_range_scans() {
        let table = table();
        let result = table.filter(&Filter::between("A", 25, 60)).unwrap();
        assert_eq!(result, ids(&[3, 4, 5, 6]));
        assert_eq!(table.metrics().full_scans(), 1);
        assert_eq!(table.metrics().index_probes(), 0);
    }

    #[test]
    fn test_indexed_range_probes() {
        let mut table = table();
        table.declare_clustered_index("A").unwrap();

        let result = table.filter(&Filter::at_most("A", 20)).unwrap();
        assert_eq!(result, ids(&[0, 1, 2]));
        assert_eq!(table.metrics().index_probes(), 1);
        assert_eq!(table.metrics().full_scans(), 0);
    }

    #[test]
    fn test_and_tests_survivors_of_indexed_side() {
        let mut table = table();
        table.declare_secondary_index("A").unwrap();

        let filter = Filter::eq("B", 1).and(Filter::between("A", 0, 100));
        let result = table.filter(&filter).unwrap();
        assert_eq!(result, ids(&[1, 5, 9]));
        // The unindexed side never scanned the table.
        assert_eq!(table.metrics().full_scans(), 0);
        assert_eq!(table.metrics().index_probes(), 1);
    }

    #[test]
    fn test_and_short_circuits_on_empty_side() {
        let table = table();
        let filter = Filter::between("A", 1000, 2000).and(Filter::eq("B", 1));
        assert!(table.filter(&filter).unwrap().is_empty());
        assert_eq!(table.metrics().full_scans(), 1);
    }

    #[test]
    fn test_or_unions() {
        let table = table();
        let filter = Filter::eq("A", 0).or(Filter::at_least("A", 180));
        assert_eq!(table.filter(&filter).unwrap(), ids(&[0, 18, 19]));
    }

    #[test]
    fn test_empty_range_matches_nothing() {
        let mut table = table();
        assert!(table.filter(&Filter::between("A", 50, 10)).unwrap().is_empty());
        table.declare_secondary_index("A").unwrap();
        assert!(table.filter(&Filter::between("A", 50, 10)).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_attribute_rejected_before_evaluation() {
        let table = table();
        let filter = Filter::eq("A", 0).or(Filter::eq("Z", 1));
        let err = table.filter(&filter).unwrap_err();
        assert_eq!(err.code(), TableErrorCode::UnknownAttribute);
        assert_eq!(table.metrics().full_scans(), 0);
        assert!(table.explain(&filter).is_err());
    }

    #[test]
    fn test_scan_matches_filter() {
        let mut table = table();
        table.declare_clustered_index("B").unwrap();
        table.declare_secondary_index("A").unwrap();

        let filter = Filter::between("A", 30, 150)
            .and(Filter::at_most("B", 1))
            .or(Filter::eq("B", 3));
        assert_eq!(table.filter(&filter).unwrap(), table.scan(&filter).unwrap());
    }

    #[test]
    fn test_filter_skips_deleted() {
        let mut table = table();
        table.delete(&ids(&[1, 2]));
        assert_eq!(table.filter(&Filter::at_most("A", 30)).unwrap(), ids(&[0, 3]));
        table.declare_secondary_index("A").unwrap();
        assert_eq!(table.filter(&Filter::at_most("A", 30)).unwrap(), ids(&[0, 3]));
    }

    #[test]
    fn test_explain_reports_paths() {
        let mut table = table();
        table.declare_clustered_index("A").unwrap();

        let plan = table
            .explain(&Filter::between("A", 0, 10).and(Filter::eq("B", 2)))
            .unwrap();
        match &plan {
            FilterPlan::Composite { left, right, .. } => {
                assert!(matches!(
                    **left,
                    FilterPlan::Leaf {
                        path: AccessPath::ClusteredIndex,
                        ..
                    }
                ));
                assert!(matches!(
                    **right,
                    FilterPlan::Leaf {
                        path: AccessPath::FullScan,
                        ..
                    }
                ));
            }
            FilterPlan::Leaf { .. } => panic!("expected a composite plan"),
        }
        assert!(plan.uses_index());
        assert_eq!(plan.full_scans(), 1);
    }
}
