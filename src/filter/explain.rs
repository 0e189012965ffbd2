//! Access-path description of a filter
//!
//! Produced by `Table::explain`. Deterministic: the same filter against the
//! same index layout always yields the same plan.

use std::fmt;

use super::ast::{FilterOp, RangePredicate};

/// How a single range leaf is answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPath {
    /// Range query on the clustered index
    ClusteredIndex,
    /// Range query on a secondary index
    SecondaryIndex,
    /// Test every live tuple
    FullScan,
}

impl AccessPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessPath::ClusteredIndex => "clustered index",
            AccessPath::SecondaryIndex => "secondary index",
            AccessPath::FullScan => "full scan",
        }
    }

    pub fn is_index(&self) -> bool {
        !matches!(self, AccessPath::FullScan)
    }
}

/// Plan tree mirroring the filter tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterPlan {
    Leaf {
        predicate: RangePredicate,
        path: AccessPath,
    },
    Composite {
        left: Box<FilterPlan>,
        right: Box<FilterPlan>,
        op: FilterOp,
    },
}

impl FilterPlan {
    /// True if any leaf is answered from an index
    pub fn uses_index(&self) -> bool {
        match self {
            FilterPlan::Leaf { path, .. } => path.is_index(),
            FilterPlan::Composite { left, right, .. } => left.uses_index() || right.uses_index(),
        }
    }

    /// Number of leaves that need a full scan
    pub fn full_scans(&self) -> usize {
        match self {
            FilterPlan::Leaf { path, .. } => usize::from(!path.is_index()),
            FilterPlan::Composite { left, right, .. } => left.full_scans() + right.full_scans(),
        }
    }
}

impl fmt::Display for FilterPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterPlan::Leaf { predicate, path } => write!(f, "{} via {}", predicate, path.as_str()),
            FilterPlan::Composite { left, right, op } => write!(f, "({} {} {})", left, op, right),
        }
    }
}
