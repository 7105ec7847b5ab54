//! Pure split rule evaluator.
//!
//! Partitions a record set into ordered groups according to one
//! [`PartitionHint`]: narrow to the target category, then either keep the
//! narrowed set whole, sort it and chunk it evenly, or bucket it by
//! first-match-wins pattern tests. Records outside the target category always
//! form the trailing remainder group, so the output length is a function of
//! the hint alone. Every split is checked for conservation before it is
//! returned.

use std::cmp::Ordering;

use crate::data::Record;
use crate::errors::InventoryError;
use crate::rules::{PartitionHint, PatternSet, SortColumn};
use crate::types::CategoryCode;

/// Partition `records` into ordered groups plus the trailing remainder.
///
/// Output length: unsorted → 2, sorted → `n + 1`, patterns → tests + 2 (the
/// implicit unmatched group sits between the declared groups and the
/// remainder).
pub fn split_records(
    records: &[Record],
    target_category: CategoryCode,
    hint: &PartitionHint,
    n: usize,
) -> Result<Vec<Vec<Record>>, InventoryError> {
    let (claimed, remainder): (Vec<Record>, Vec<Record>) = records
        .iter()
        .cloned()
        .partition(|record| record.category == target_category);

    let mut groups = match hint {
        PartitionHint::Unsorted => vec![claimed],
        PartitionHint::Sorted(column) => {
            if n == 0 {
                return Err(InventoryError::Configuration(
                    "sorted split requires a split count of at least 1".to_string(),
                ));
            }
            chunk_evenly(sort_by_column(claimed, *column), n)
        }
        PartitionHint::Patterns(set) => pattern_groups(claimed, set),
    };
    groups.push(remainder);

    check_conservation(records.len(), &groups)?;
    Ok(groups)
}

/// Verify that group sizes sum to the input size.
pub fn check_conservation(expected: usize, groups: &[Vec<Record>]) -> Result<(), InventoryError> {
    let actual: usize = groups.iter().map(Vec::len).sum();
    if actual != expected {
        return Err(InventoryError::Conservation { expected, actual });
    }
    Ok(())
}

/// Stable ascending sort by the chosen column. Records missing an optional
/// column sort first.
fn sort_by_column(mut records: Vec<Record>, column: SortColumn) -> Vec<Record> {
    records.sort_by(|a, b| match column {
        SortColumn::Rank => a.rank.total_cmp(&b.rank),
        SortColumn::Price => compare_options(a.price.as_ref(), b.price.as_ref(), f64::total_cmp),
        SortColumn::Sku => compare_options(a.sku.as_deref(), b.sku.as_deref(), str::cmp),
    });
    records
}

fn compare_options<T: ?Sized>(
    a: Option<&T>,
    b: Option<&T>,
    cmp: impl Fn(&T, &T) -> Ordering,
) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cmp(a, b),
    }
}

/// Split into `n` contiguous chunks whose sizes differ by at most one, with
/// earlier chunks taking the larger share.
fn chunk_evenly(records: Vec<Record>, n: usize) -> Vec<Vec<Record>> {
    let base = records.len() / n;
    let larger = records.len() % n;
    let mut groups = Vec::with_capacity(n);
    let mut rest = records;
    for idx in 0..n {
        let size = if idx < larger { base + 1 } else { base };
        let tail = rest.split_off(size.min(rest.len()));
        groups.push(rest);
        rest = tail;
    }
    groups
}

/// One group per declared test (first match wins) plus the implicit trailing
/// unmatched group.
fn pattern_groups(records: Vec<Record>, set: &PatternSet) -> Vec<Vec<Record>> {
    let mut groups: Vec<Vec<Record>> = vec![Vec::new(); set.tests.len() + 1];
    for record in records {
        let idx = set.first_match(&record).unwrap_or(set.tests.len());
        groups[idx].push(record);
    }
    groups
}
