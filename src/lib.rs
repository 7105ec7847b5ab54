#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Slot alphabet and taxonomy program configuration.
pub mod config;
/// Centralized constants used across the partitioning engine.
pub mod constants;
/// Coordinate assignment and the two inverse lookup indexes.
pub mod coords;
/// Input records and floor-category helpers.
pub mod data;
/// Reusable demo runners shared by the example binaries.
pub mod example_apps;
/// The public inventory facade.
pub mod inventory;
/// Nested room/shelf/bin layout and leaf storage variants.
pub mod layout;
/// Move links between paired leaves.
pub mod links;
/// Bin occupancy metrics.
pub mod metrics;
/// Declarative split rules.
pub mod rules;
/// Snapshot encoding, validation, and persistence.
pub mod snapshot;
/// The pure split rule evaluator.
pub mod split;
/// The partition node tree and leaf materializer.
pub mod tree;
/// Shared type aliases.
pub mod types;
/// Text matching helpers.
pub mod utils;

mod errors;

pub use config::{LinkSpec, SlotAlphabet, TaxonomyProgram, TaxonomyStep};
pub use coords::CoordinateIndexes;
pub use data::{Record, default_floor_records, floor_records};
pub use errors::InventoryError;
pub use inventory::Inventory;
pub use layout::{Layout, LeafAddress, LeafStorage, Room};
pub use links::{LinkRegistry, MoveLink};
pub use rules::{
    GroupSpec, PartitionHint, PatternSet, PatternTest, SortColumn, SplitRule, TextColumn,
};
pub use tree::{NodeId, PartitionNode, PartitionTree};
pub use types::{CategoryCode, CoordinateKey, NodeLabel, ProductName};
