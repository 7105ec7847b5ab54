use std::io;

use thiserror::Error;

use crate::layout::Room;
use crate::types::{NodeLabel, ProductName};

/// Error type for rule configuration, tree construction, coordinate
/// assignment, lookup, and relocation failures.
#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("split dropped or duplicated records (expected {expected}, produced {actual})")]
    Conservation { expected: usize, actual: usize },
    #[error("node '{label}': rule declares {declared} groups but the split produced {produced}")]
    ConfigurationMismatch {
        label: NodeLabel,
        declared: usize,
        produced: usize,
    },
    #[error("coordinate assignment is not bijective: {0}")]
    NotBijective(String),
    #[error("no product or coordinate named '{0}'")]
    NotFound(String),
    #[error("'{product}' is already stored in room {room}")]
    InvalidMove { product: ProductName, room: Room },
    #[error("no leaf at {shelf_bin} in room {room}")]
    LocationUnavailable { shelf_bin: String, room: Room },
    #[error("snapshot failed validation: {0}")]
    CorruptSnapshot(String),
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}
