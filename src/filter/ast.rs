//! Predicate tree
//!
//! A filter is either a single-attribute inclusive range or two filters
//! joined by AND / OR. Evaluation is structural recursion over the enum.

use std::collections::BTreeSet;
use std::fmt;

use crate::tuple::Tuple;

/// Boolean connective joining two filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    And,
    Or,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::And => "AND",
            FilterOp::Or => "OR",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive range over one attribute. `None` leaves that side open.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RangePredicate {
    pub attribute: String,
    pub low: Option<i32>,
    pub high: Option<i32>,
}

impl RangePredicate {
    pub fn new(attribute: impl Into<String>, low: Option<i32>, high: Option<i32>) -> Self {
        Self {
            attribute: attribute.into(),
            low,
            high,
        }
    }

    /// Tests a value against both bounds; an open side always passes
    pub fn matches(&self, value: i32) -> bool {
        self.low.map_or(true, |l| value >= l) && self.high.map_or(true, |h| value <= h)
    }

    /// True when both sides are open (matches every tuple)
    pub fn is_unbounded(&self) -> bool {
        self.low.is_none() && self.high.is_none()
    }

    /// True when the bounds cross (matches nothing)
    pub fn is_empty_range(&self) -> bool {
        matches!((self.low, self.high), (Some(l), Some(h)) if l > h)
    }
}

impl fmt::Display for RangePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.low, self.high) {
            (Some(l), Some(h)) if l == h => write!(f, "{} = {}", self.attribute, l),
            (Some(l), Some(h)) => write!(f, "{} in [{}, {}]", self.attribute, l, h),
            (Some(l), None) => write!(f, "{} >= {}", self.attribute, l),
            (None, Some(h)) => write!(f, "{} <= {}", self.attribute, h),
            (None, None) => write!(f, "{} is any", self.attribute),
        }
    }
}

/// Predicate tree evaluated by `Table::filter`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Filter {
    /// Single-attribute inclusive range
    Range(RangePredicate),
    /// Two filters joined by a connective
    Composite {
        left: Box<Filter>,
        right: Box<Filter>,
        op: FilterOp,
    },
}

impl Filter {
    /// Range filter with optional bounds
    pub fn range(attribute: impl Into<String>, low: Option<i32>, high: Option<i32>) -> Self {
        Filter::Range(RangePredicate::new(attribute, low, high))
    }

    /// `low <= attribute <= high`
    pub fn between(attribute: impl Into<String>, low: i32, high: i32) -> Self {
        Self::range(attribute, Some(low), Some(high))
    }

    /// `attribute >= low`
    pub fn at_least(attribute: impl Into<String>, low: i32) -> Self {
        Self::range(attribute, Some(low), None)
    }

    /// `attribute <= high`
    pub fn at_most(attribute: impl Into<String>, high: i32) -> Self {
        Self::range(attribute, None, Some(high))
    }

    /// `attribute == value`
    pub fn eq(attribute: impl Into<String>, value: i32) -> Self {
        Self::range(attribute, Some(value), Some(value))
    }

    /// Matches every tuple
    pub fn any(attribute: impl Into<String>) -> Self {
        Self::range(attribute, None, None)
    }

    /// Joins two filters with a connective
    pub fn combine(left: Filter, right: Filter, op: FilterOp) -> Self {
        Filter::Composite {
            left: Box::new(left),
            right: Box::new(right),
            op,
        }
    }

    pub fn and(self, other: Filter) -> Self {
        Self::combine(self, other, FilterOp::And)
    }

    pub fn or(self, other: Filter) -> Self {
        Self::combine(self, other, FilterOp::Or)
    }

    /// Every attribute referenced anywhere in the tree, ascending
    pub fn attributes(&self) -> BTreeSet<&str> {
        let mut out = BTreeSet::new();
        self.collect_attributes(&mut out);
        out
    }

    fn collect_attributes<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Filter::Range(pred) => {
                out.insert(pred.attribute.as_str());
            }
            Filter::Composite { left, right, .. } => {
                left.collect_attributes(out);
                right.collect_attributes(out);
            }
        }
    }

    /// Evaluates the tree against one tuple.
    ///
    /// A tuple without the referenced attribute does not match.
    pub fn matches(&self, tuple: &Tuple) -> bool {
        match self {
            Filter::Range(pred) => tuple.get(&pred.attribute).is_some_and(|v| pred.matches(v)),
            Filter::Composite { left, right, op } => match op {
                FilterOp::And => left.matches(tuple) && right.matches(tuple),
                FilterOp::Or => left.matches(tuple) || right.matches(tuple),
            },
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Range(pred) => write!(f, "{}", pred),
            Filter::Composite { left, right, op } => write!(f, "({} {} {})", left, op, right),
        }
    }
}
