use regex::Regex;

use crate::data::Record;
use crate::errors::InventoryError;
use crate::types::{CategoryCode, NodeLabel};
use crate::utils::contains_ignore_case;

/// Record column an ordered split sorts by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    /// Sales rank ascending.
    Rank,
    /// Retail price ascending; rows without a price sort first.
    Price,
    /// SKU lexicographic ascending; rows without a SKU sort first.
    Sku,
}

/// Text column a pattern test probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextColumn {
    /// Product display name.
    Name,
    /// SKU string; rows without a SKU never match.
    Sku,
}

/// One declared pattern bucket.
#[derive(Clone, Debug)]
pub enum PatternTest {
    /// Case-insensitive substring containment.
    Contains(String),
    /// Regular-expression match.
    Matches(Regex),
}

impl PatternTest {
    /// Literal containment test.
    pub fn contains(needle: impl Into<String>) -> Self {
        PatternTest::Contains(needle.into())
    }

    /// Compile a regex test; a malformed expression is a configuration
    /// error.
    pub fn matches(pattern: &str) -> Result<Self, InventoryError> {
        let regex = Regex::new(pattern).map_err(|err| {
            InventoryError::Configuration(format!("invalid pattern '{pattern}': {err}"))
        })?;
        Ok(PatternTest::Matches(regex))
    }

    /// Whether `text` satisfies this test.
    pub fn is_match(&self, text: &str) -> bool {
        match self {
            PatternTest::Contains(needle) => contains_ignore_case(text, needle),
            PatternTest::Matches(regex) => regex.is_match(text),
        }
    }
}

/// Ordered pattern tests over one text column.
///
/// Assignment is first-match-wins in declaration order; records matching no
/// test fall into an implicit trailing unmatched group.
#[derive(Clone, Debug)]
pub struct PatternSet {
    /// Column the tests probe.
    pub column: TextColumn,
    /// Declared tests, evaluated in order.
    pub tests: Vec<PatternTest>,
}

impl PatternSet {
    /// Pattern set over `column`.
    pub fn new(column: TextColumn, tests: Vec<PatternTest>) -> Self {
        Self { column, tests }
    }

    /// Index of the first matching test for `record`, if any.
    pub fn first_match(&self, record: &Record) -> Option<usize> {
        let text = match self.column {
            TextColumn::Name => record.name.as_str(),
            TextColumn::Sku => record.sku.as_deref().unwrap_or(""),
        };
        self.tests.iter().position(|test| test.is_match(text))
    }
}

/// How a node partitions its records when it is split.
///
/// Every node carries the hint its parent's rule assigned to it; the hint is
/// consumed the next time the node is split.
#[derive(Clone, Debug, Default)]
pub enum PartitionHint {
    /// No further ordering; the narrowed set stays one group.
    #[default]
    Unsorted,
    /// Sort by a column and chunk into near-equal contiguous groups.
    Sorted(SortColumn),
    /// Bucket by first-match-wins pattern tests.
    Patterns(PatternSet),
}

/// Per-group configuration of a split: child label, stability, and the
/// hint the child will use for its own split.
#[derive(Clone, Debug)]
pub struct GroupSpec {
    /// Label of the child node (a `shelf.bin` pair for stable leaves).
    pub label: NodeLabel,
    /// True when the child is a terminal, addressable location.
    pub stable: bool,
    /// Hint consumed if the child is split again.
    pub next: PartitionHint,
}

impl GroupSpec {
    /// Stable leaf group; the hint is never consumed.
    pub fn stable(label: impl Into<NodeLabel>) -> Self {
        Self {
            label: label.into(),
            stable: true,
            next: PartitionHint::Unsorted,
        }
    }

    /// Stable grouping that is still split further (a room node: addressable
    /// on its own, but not a leaf).
    pub fn stable_with(label: impl Into<NodeLabel>, next: PartitionHint) -> Self {
        Self {
            label: label.into(),
            stable: true,
            next,
        }
    }

    /// Transient grouping that will be split again with `next`.
    pub fn unstable(label: impl Into<NodeLabel>, next: PartitionHint) -> Self {
        Self {
            label: label.into(),
            stable: false,
            next,
        }
    }
}

/// Declarative configuration for one partitioning step.
#[derive(Clone, Debug)]
pub struct SplitRule {
    /// Category claimed by this step; other categories land in the
    /// trailing remainder group.
    pub target_category: CategoryCode,
    /// Chunk count for sorted splits; ignored in pattern and unsorted
    /// modes.
    pub split_count: usize,
    /// Ordered group configuration, index-aligned with the evaluator
    /// output.
    pub groups: Vec<GroupSpec>,
}

impl SplitRule {
    /// Number of groups the evaluator will produce for `hint`.
    ///
    /// Unsorted yields the claimed set plus the remainder; sorted yields
    /// `split_count` chunks plus the remainder; patterns yield one group per
    /// test, the implicit unmatched group, then the remainder.
    pub fn expected_groups(&self, hint: &PartitionHint) -> usize {
        match hint {
            PartitionHint::Unsorted => 2,
            PartitionHint::Sorted(_) => self.split_count + 1,
            PartitionHint::Patterns(set) => set.tests.len() + 2,
        }
    }

    /// Check that the group list lines up with what `hint` will produce.
    pub fn validate(&self, hint: &PartitionHint, label: &str) -> Result<(), InventoryError> {
        if matches!(hint, PartitionHint::Sorted(_)) && self.split_count == 0 {
            return Err(InventoryError::Configuration(format!(
                "node '{label}': sorted split requires a split count of at least 1"
            )));
        }
        let expected = self.expected_groups(hint);
        if self.groups.len() != expected {
            return Err(InventoryError::ConfigurationMismatch {
                label: label.to_string(),
                declared: self.groups.len(),
                produced: expected,
            });
        }
        Ok(())
    }
}
