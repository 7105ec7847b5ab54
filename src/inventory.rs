//! Public inventory facade.
//!
//! Owns the materialized layout, the slot alphabet, the declared move links,
//! and the two coordinate indexes, and exposes the query surface the outside
//! collaborators use: lookup by name, lookup by coordinate, relocation, and
//! snapshot export.

use std::path::Path;

use tracing::debug;

use crate::config::{SlotAlphabet, TaxonomyProgram};
use crate::coords::{CoordinateIndexes, assign_layout, build_layout, parse_coordinate};
use crate::data::Record;
use crate::errors::InventoryError;
use crate::layout::{Layout, LeafAddress, Room, RoomLayout};
use crate::links::LinkRegistry;
use crate::snapshot;
use crate::tree::PartitionTree;
use crate::types::{CoordinateKey, ProductName};

/// The assembled engine state: layout, alphabet, links, and both indexes.
///
/// All mutation goes through [`Inventory::relocate`], which rebuilds the
/// indexes before returning, so the bijection invariant holds whenever the
/// caller can observe the value.
pub struct Inventory {
    layout: Layout,
    alphabet: SlotAlphabet,
    links: LinkRegistry,
    indexes: CoordinateIndexes,
}

impl Inventory {
    /// Build from the full record source by executing a taxonomy program.
    pub fn from_records(
        records: Vec<Record>,
        program: &TaxonomyProgram,
        alphabet: SlotAlphabet,
    ) -> Result<Self, InventoryError> {
        let (tree, links) = program.build(records)?;
        Self::from_tree(&tree, alphabet, links)
    }

    /// Build from an already materialized tree and its declared links.
    pub fn from_tree(
        tree: &PartitionTree,
        alphabet: SlotAlphabet,
        links: LinkRegistry,
    ) -> Result<Self, InventoryError> {
        let layout = build_layout(tree)?;
        Self::from_layout_with_links(layout, alphabet, links)
    }

    /// Build from a validated layout, bypassing the split pipeline.
    pub fn from_layout(layout: Layout, alphabet: SlotAlphabet) -> Result<Self, InventoryError> {
        Self::from_layout_with_links(layout, alphabet, LinkRegistry::new())
    }

    /// [`Inventory::from_layout`] with pre-resolved move links.
    pub fn from_layout_with_links(
        layout: Layout,
        alphabet: SlotAlphabet,
        links: LinkRegistry,
    ) -> Result<Self, InventoryError> {
        let indexes = assign_layout(&layout, &alphabet)?;
        debug!(products = indexes.coordinate_to_product.len(), "assigned coordinates");
        Ok(Self {
            layout,
            alphabet,
            links,
            indexes,
        })
    }

    /// Load a snapshot document from disk and rebuild the indexes from it.
    pub fn load_snapshot<P: AsRef<Path>>(
        path: P,
        alphabet: SlotAlphabet,
    ) -> Result<Self, InventoryError> {
        Self::from_layout(snapshot::load(path)?, alphabet)
    }

    /// Write the current layout to disk as a snapshot document.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), InventoryError> {
        snapshot::save(&self.layout, path)
    }

    /// Declare a move link between two bins of the current layout.
    pub fn declare_link(
        &mut self,
        name: &str,
        front: LeafAddress,
        back: LeafAddress,
    ) -> Result<(), InventoryError> {
        for address in [&front, &back] {
            if self.layout.bin(address).is_none() {
                return Err(InventoryError::LocationUnavailable {
                    shelf_bin: address.shelf_bin(),
                    room: address.room,
                });
            }
        }
        self.links.declare_resolved(name, front, back);
        Ok(())
    }

    /// Coordinate of a product, by exact name.
    pub fn lookup_by_name(&self, name: &str) -> Result<CoordinateKey, InventoryError> {
        self.indexes
            .product_to_coordinate
            .get(name)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(name.to_string()))
    }

    /// Product stored at a coordinate.
    pub fn lookup_by_coordinate(&self, coordinate: &str) -> Result<ProductName, InventoryError> {
        self.indexes
            .coordinate_to_product
            .get(coordinate)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(coordinate.to_string()))
    }

    /// Move a product to `target_room` and return its new coordinate.
    ///
    /// The target leaf is the declared link partner when one exists,
    /// otherwise the bin with the same shelf/bin pair under the target room.
    /// Everything is validated before the layout is touched; afterwards both
    /// indexes are rebuilt, so no partially-applied state is observable
    /// between calls.
    pub fn relocate(
        &mut self,
        product: &str,
        target_room: Room,
    ) -> Result<CoordinateKey, InventoryError> {
        let coordinate = self.lookup_by_name(product)?;
        let (source, _slot) = parse_coordinate(&coordinate)?;
        if source.room == target_room {
            return Err(InventoryError::InvalidMove {
                product: product.to_string(),
                room: target_room,
            });
        }

        let target = match self.links.partner(&source) {
            Some(partner) if partner.room == target_room => partner.clone(),
            _ => source.in_room(target_room),
        };
        let Some(target_bin) = self.layout.bin(&target) else {
            return Err(InventoryError::LocationUnavailable {
                shelf_bin: target.shelf_bin(),
                room: target.room,
            });
        };
        if target_bin.len() + 1 > self.alphabet.len() {
            return Err(InventoryError::NotBijective(format!(
                "leaf {target} cannot hold another product; the slot alphabet defines {}",
                self.alphabet.len()
            )));
        }

        let source_bin = self
            .layout
            .bin_mut(&source)
            .ok_or_else(|| InventoryError::LocationUnavailable {
                shelf_bin: source.shelf_bin(),
                room: source.room,
            })?;
        if !source_bin.remove(product) {
            return Err(InventoryError::NotFound(product.to_string()));
        }
        self.layout
            .bin_mut(&target)
            .ok_or_else(|| InventoryError::LocationUnavailable {
                shelf_bin: target.shelf_bin(),
                room: target.room,
            })?
            .insert_sorted(product);

        self.indexes = assign_layout(&self.layout, &self.alphabet)?;
        debug!(product, from = %source, to = %target, "relocated product");
        self.lookup_by_name(product)
    }

    /// The current layout (also the snapshot content).
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Shelves of one room, when the layout has any.
    pub fn room_view(&self, room: Room) -> Option<&RoomLayout> {
        self.layout.room(room)
    }

    /// Both lookup indexes.
    pub fn indexes(&self) -> &CoordinateIndexes {
        &self.indexes
    }

    /// Declared move links.
    pub fn links(&self) -> &LinkRegistry {
        &self.links
    }

    /// Slot alphabet in use.
    pub fn alphabet(&self) -> &SlotAlphabet {
        &self.alphabet
    }

    /// Every product name with an assigned coordinate, in index order.
    ///
    /// This is the candidate list handed to the external fuzzy-search
    /// collaborator.
    pub fn product_names(&self) -> Vec<&str> {
        self.indexes
            .product_to_coordinate
            .keys()
            .map(String::as_str)
            .collect()
    }

    /// Number of products with assigned coordinates.
    pub fn product_count(&self) -> usize {
        self.indexes.product_to_coordinate.len()
    }
}
