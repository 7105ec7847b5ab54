use serde::{Deserialize, Serialize};

use crate::constants::records::OFF_FLOOR_CATEGORIES;

pub use crate::types::{CategoryCode, ProductName};

/// Canonical input row consumed by the partitioning engine.
///
/// `name` is assumed unique across the whole inventory; it is the join key
/// for both coordinate indexes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    /// Numeric category code (flower, edibles, extracts, ...).
    pub category: CategoryCode,
    /// Sales rank used for ordered splits; lower ranks sell better.
    pub rank: f64,
    /// Product display name, unique inventory-wide.
    pub name: ProductName,
    /// Retail price, when the source row carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Stock-keeping unit string, when the source row carries one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

/// Drop records whose category is not stocked on the sales floor.
///
/// Callers apply this before handing records to the engine; the default
/// exclusions are [`OFF_FLOOR_CATEGORIES`].
pub fn floor_records(records: Vec<Record>, excluded: &[CategoryCode]) -> Vec<Record> {
    records
        .into_iter()
        .filter(|record| !excluded.contains(&record.category))
        .collect()
}

/// [`floor_records`] with the default off-floor exclusions.
pub fn default_floor_records(records: Vec<Record>) -> Vec<Record> {
    floor_records(records, &OFF_FLOOR_CATEGORIES)
}
