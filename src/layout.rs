use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::constants::coordinates::{BACK_ROOM_CODE, FRONT_ROOM_CODE, SEGMENT_SEPARATOR};
use crate::errors::InventoryError;
use crate::types::{BinLabel, ProductName, ShelfLabel};

/// Physical rooms products can be stored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Room {
    /// Sales floor.
    #[serde(rename = "F")]
    Front,
    /// Overstock room.
    #[serde(rename = "B")]
    Back,
}

impl Room {
    /// Single-letter code used in coordinates and snapshot keys.
    pub fn code(self) -> &'static str {
        match self {
            Room::Front => FRONT_ROOM_CODE,
            Room::Back => BACK_ROOM_CODE,
        }
    }

    /// Parse a room from its coordinate code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            FRONT_ROOM_CODE => Some(Room::Front),
            BACK_ROOM_CODE => Some(Room::Back),
            _ => None,
        }
    }

    /// The paired room on the other side of a move.
    pub fn opposite(self) -> Self {
        match self {
            Room::Front => Room::Back,
            Room::Back => Room::Front,
        }
    }

    /// Canonical iteration order for rooms.
    pub const ALL: [Room; 2] = [Room::Front, Room::Back];
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Product list held by one bin.
///
/// Bins are flat sorted lists in the common case; price-tiered bins keep one
/// sorted sub-list per tier. Slot positions run across sub-lists in order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafStorage {
    /// Single sorted product list.
    Flat(Vec<ProductName>),
    /// Ordered sub-lists, each individually sorted.
    Grouped(Vec<Vec<ProductName>>),
}

impl Default for LeafStorage {
    fn default() -> Self {
        LeafStorage::Flat(Vec::new())
    }
}

impl LeafStorage {
    /// Total number of products across all sub-lists.
    pub fn len(&self) -> usize {
        match self {
            LeafStorage::Flat(products) => products.len(),
            LeafStorage::Grouped(tiers) => tiers.iter().map(Vec::len).sum(),
        }
    }

    /// True when the bin holds no products.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate products in slot order (sub-lists flatten in declaration
    /// order).
    pub fn iter_slots(&self) -> Box<dyn Iterator<Item = &ProductName> + '_> {
        match self {
            LeafStorage::Flat(products) => Box::new(products.iter()),
            LeafStorage::Grouped(tiers) => Box::new(tiers.iter().flatten()),
        }
    }

    /// True when any sub-list contains `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.iter_slots().any(|product| product == name)
    }

    /// Remove `name`, searching every sub-list. Returns whether it was found.
    pub fn remove(&mut self, name: &str) -> bool {
        match self {
            LeafStorage::Flat(products) => remove_from(products, name),
            LeafStorage::Grouped(tiers) => tiers.iter_mut().any(|tier| remove_from(tier, name)),
        }
    }

    /// Insert `name` and re-sort the receiving list.
    ///
    /// Grouped bins place the product in the first sub-list whose last entry
    /// sorts after it, falling back to the final sub-list.
    pub fn insert_sorted(&mut self, name: &str) {
        match self {
            LeafStorage::Flat(products) => {
                products.push(name.to_string());
                products.sort();
            }
            LeafStorage::Grouped(tiers) => {
                if tiers.is_empty() {
                    tiers.push(Vec::new());
                }
                let idx = tiers
                    .iter()
                    .position(|tier| tier.last().is_some_and(|last| last.as_str() >= name))
                    .unwrap_or(tiers.len() - 1);
                tiers[idx].push(name.to_string());
                tiers[idx].sort();
            }
        }
    }
}

fn remove_from(products: &mut Vec<ProductName>, name: &str) -> bool {
    match products.iter().position(|product| product == name) {
        Some(idx) => {
            products.remove(idx);
            true
        }
        None => false,
    }
}

/// Address of one stable leaf: room plus the `shelf.bin` pair parsed from
/// its label.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LeafAddress {
    /// Room holding the leaf.
    pub room: Room,
    /// Shelf segment.
    pub shelf: ShelfLabel,
    /// Bin segment.
    pub bin: BinLabel,
}

impl LeafAddress {
    /// The `shelf.bin` pair without the room segment.
    pub fn shelf_bin(&self) -> String {
        format!("{}{}{}", self.shelf, SEGMENT_SEPARATOR, self.bin)
    }

    /// The same shelf/bin under a different room.
    pub fn in_room(&self, room: Room) -> Self {
        Self {
            room,
            shelf: self.shelf.clone(),
            bin: self.bin.clone(),
        }
    }
}

impl fmt::Display for LeafAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            self.room,
            self.shelf,
            self.bin,
            sep = SEGMENT_SEPARATOR
        )
    }
}

/// Bins of one room, keyed shelf then bin.
pub type RoomLayout = IndexMap<ShelfLabel, IndexMap<BinLabel, LeafStorage>>;

/// Nested `room → shelf → bin → products` mapping.
///
/// This is the bridge between the partition tree and everything downstream:
/// the coordinate assigner reads it, relocation mutates it, and the snapshot
/// codec serializes it verbatim.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Layout {
    rooms: IndexMap<Room, RoomLayout>,
}

impl Layout {
    /// Empty layout with no rooms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate rooms in insertion order.
    pub fn rooms(&self) -> impl Iterator<Item = (Room, &RoomLayout)> {
        self.rooms.iter().map(|(room, shelves)| (*room, shelves))
    }

    /// Shelves of one room, if present.
    pub fn room(&self, room: Room) -> Option<&RoomLayout> {
        self.rooms.get(&room)
    }

    /// Storage of one bin, if present.
    pub fn bin(&self, address: &LeafAddress) -> Option<&LeafStorage> {
        self.rooms
            .get(&address.room)?
            .get(&address.shelf)?
            .get(&address.bin)
    }

    /// Mutable storage of one bin, if present.
    pub fn bin_mut(&mut self, address: &LeafAddress) -> Option<&mut LeafStorage> {
        self.rooms
            .get_mut(&address.room)?
            .get_mut(&address.shelf)?
            .get_mut(&address.bin)
    }

    /// Register a bin. Assigning the same address twice is a bijection
    /// violation.
    pub fn insert_bin(
        &mut self,
        address: LeafAddress,
        storage: LeafStorage,
    ) -> Result<(), InventoryError> {
        let bins = self
            .rooms
            .entry(address.room)
            .or_default()
            .entry(address.shelf.clone())
            .or_default();
        if bins.contains_key(&address.bin) {
            return Err(InventoryError::NotBijective(format!(
                "two leaves map to {address}"
            )));
        }
        bins.insert(address.bin, storage);
        Ok(())
    }

    /// Total number of products across every bin.
    pub fn product_count(&self) -> usize {
        self.rooms
            .values()
            .flat_map(|shelves| shelves.values())
            .flat_map(|bins| bins.values())
            .map(LeafStorage::len)
            .sum()
    }

    /// Same room/shelf/bin shape with every bin emptied.
    pub fn empty_like(&self) -> Self {
        let rooms = self
            .rooms
            .iter()
            .map(|(room, shelves)| {
                let shelves = shelves
                    .iter()
                    .map(|(shelf, bins)| {
                        let bins = bins
                            .keys()
                            .map(|bin| (bin.clone(), LeafStorage::default()))
                            .collect();
                        (shelf.clone(), bins)
                    })
                    .collect();
                (*room, shelves)
            })
            .collect();
        Self { rooms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(room: Room, shelf: &str, bin: &str) -> LeafAddress {
        LeafAddress {
            room,
            shelf: shelf.to_string(),
            bin: bin.to_string(),
        }
    }

    #[test]
    fn insert_bin_rejects_duplicate_addresses() {
        let mut layout = Layout::new();
        layout
            .insert_bin(address(Room::Front, "1", "2"), LeafStorage::default())
            .unwrap();
        let err = layout
            .insert_bin(address(Room::Front, "1", "2"), LeafStorage::default())
            .unwrap_err();
        assert!(matches!(err, InventoryError::NotBijective(msg) if msg.contains("F.1.2")));
    }

    #[test]
    fn grouped_storage_removes_from_inner_lists() {
        let mut storage = LeafStorage::Grouped(vec![
            vec!["Apple Gum".to_string()],
            vec!["Berry Chew".to_string(), "Citrus Drop".to_string()],
        ]);
        assert_eq!(storage.len(), 3);
        assert!(storage.remove("Citrus Drop"));
        assert!(!storage.remove("Citrus Drop"));
        assert_eq!(storage.len(), 2);
    }

    #[test]
    fn grouped_insert_lands_in_matching_tier() {
        let mut storage = LeafStorage::Grouped(vec![
            vec!["Apple Gum".to_string(), "Citrus Drop".to_string()],
            vec!["Melon Ice".to_string(), "Zest Bar".to_string()],
        ]);
        storage.insert_sorted("Berry Chew");
        let slots: Vec<&str> = storage.iter_slots().map(String::as_str).collect();
        assert_eq!(
            slots,
            vec!["Apple Gum", "Berry Chew", "Citrus Drop", "Melon Ice", "Zest Bar"]
        );
    }

    #[test]
    fn flat_insert_keeps_list_sorted() {
        let mut storage = LeafStorage::Flat(vec!["b".to_string(), "d".to_string()]);
        storage.insert_sorted("c");
        let slots: Vec<&str> = storage.iter_slots().map(String::as_str).collect();
        assert_eq!(slots, vec!["b", "c", "d"]);
    }

    #[test]
    fn empty_like_preserves_shape() {
        let mut layout = Layout::new();
        layout
            .insert_bin(
                address(Room::Front, "1", "2"),
                LeafStorage::Flat(vec!["Apple Gum".to_string()]),
            )
            .unwrap();
        layout
            .insert_bin(address(Room::Back, "3", "1"), LeafStorage::default())
            .unwrap();

        let empty = layout.empty_like();
        assert_eq!(empty.product_count(), 0);
        assert!(empty.bin(&address(Room::Front, "1", "2")).is_some());
        assert!(empty.bin(&address(Room::Back, "3", "1")).is_some());
    }
}
