//! Coordinate assignment and the inverse lookup indexes.
//!
//! A coordinate is the four-segment key `room.shelf.bin.slot`. The shelf and
//! bin come from a stable leaf's own label, the room from its nearest stable
//! ancestor, and the slot from the product's position in the leaf's sorted
//! list via the configured [`SlotAlphabet`]. Assignment is rejected eagerly
//! whenever it would stop being a bijection.

use indexmap::IndexMap;

use crate::config::SlotAlphabet;
use crate::constants::coordinates::{SEGMENT_COUNT, SEGMENT_SEPARATOR};
use crate::errors::InventoryError;
use crate::layout::{Layout, LeafAddress, Room};
use crate::tree::{NodeId, PartitionTree};
use crate::types::{BinLabel, CoordinateKey, ProductName, ShelfLabel, SlotLabel};

/// The two derived lookup maps, exact inverses of each other.
///
/// Both are rebuilt together after every mutation; neither is ever edited
/// on its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoordinateIndexes {
    /// Coordinate key to product name.
    pub coordinate_to_product: IndexMap<CoordinateKey, ProductName>,
    /// Product name to coordinate key.
    pub product_to_coordinate: IndexMap<ProductName, CoordinateKey>,
}

/// Build the full coordinate key for one slot of a leaf.
pub fn format_coordinate(address: &LeafAddress, slot: &str) -> CoordinateKey {
    format!("{address}{SEGMENT_SEPARATOR}{slot}")
}

/// Split a coordinate key back into its leaf address and slot label.
pub fn parse_coordinate(coordinate: &str) -> Result<(LeafAddress, SlotLabel), InventoryError> {
    let segments: Vec<&str> = coordinate.split(SEGMENT_SEPARATOR).collect();
    if segments.len() != SEGMENT_COUNT {
        return Err(InventoryError::NotFound(coordinate.to_string()));
    }
    let room = Room::from_code(segments[0])
        .ok_or_else(|| InventoryError::NotFound(coordinate.to_string()))?;
    Ok((
        LeafAddress {
            room,
            shelf: segments[1].to_string(),
            bin: segments[2].to_string(),
        },
        segments[3].to_string(),
    ))
}

/// Split a stable leaf's `shelf.bin` label into its two segments.
pub fn parse_leaf_label(label: &str) -> Result<(ShelfLabel, BinLabel), InventoryError> {
    let mut segments = label.split(SEGMENT_SEPARATOR);
    match (segments.next(), segments.next(), segments.next()) {
        (Some(shelf), Some(bin), None) if !shelf.is_empty() && !bin.is_empty() => {
            Ok((shelf.to_string(), bin.to_string()))
        }
        _ => Err(InventoryError::Configuration(format!(
            "stable leaf label '{label}' is not a shelf.bin pair"
        ))),
    }
}

/// Room of a stable leaf, taken from its nearest stable proper ancestor.
///
/// A chain with no stable ancestor, or a stable ancestor that is not a room,
/// is a configuration fault of the taxonomy, never a guessed default.
pub fn leaf_room(tree: &PartitionTree, leaf: NodeId) -> Result<Room, InventoryError> {
    let mut current = tree.node(leaf).parent;
    while let Some(id) = current {
        let node = tree.node(id);
        if node.stable {
            return Room::from_code(&node.label).ok_or_else(|| {
                InventoryError::Configuration(format!(
                    "stable ancestor '{}' of leaf '{}' is not a room",
                    node.label,
                    tree.node(leaf).label
                ))
            });
        }
        current = node.parent;
    }
    Err(InventoryError::Configuration(format!(
        "leaf '{}' has no stable ancestor to supply a room",
        tree.node(leaf).label
    )))
}

/// Collect every materialized stable leaf into the nested
/// room → shelf → bin mapping.
///
/// Two leaves resolving to the same address make the coordinate space
/// non-bijective and abort the build.
pub fn build_layout(tree: &PartitionTree) -> Result<Layout, InventoryError> {
    let mut layout = Layout::new();
    for id in tree.stable_leaf_ids() {
        let node = tree.node(id);
        let (shelf, bin) = parse_leaf_label(&node.label)?;
        let room = leaf_room(tree, id)?;
        let storage = node.products.clone().ok_or_else(|| {
            InventoryError::Configuration(format!(
                "leaf '{}' has no materialized product list",
                node.label
            ))
        })?;
        layout.insert_bin(LeafAddress { room, shelf, bin }, storage)?;
    }
    Ok(layout)
}

/// Derive both indexes from a layout.
///
/// `coordinate_to_product` is filled first; `product_to_coordinate` is built
/// as its exact inverse in a second pass. Duplicates on either side and
/// slot-alphabet overflow are fatal.
pub fn assign_layout(
    layout: &Layout,
    alphabet: &SlotAlphabet,
) -> Result<CoordinateIndexes, InventoryError> {
    let mut coordinate_to_product: IndexMap<CoordinateKey, ProductName> = IndexMap::new();
    for (room, shelves) in layout.rooms() {
        for (shelf, bins) in shelves {
            for (bin, storage) in bins {
                let address = LeafAddress {
                    room,
                    shelf: shelf.clone(),
                    bin: bin.clone(),
                };
                for (position, product) in storage.iter_slots().enumerate() {
                    let slot = alphabet.label_for(position).ok_or_else(|| {
                        InventoryError::NotBijective(format!(
                            "leaf {address} holds {} products but the slot alphabet defines {}",
                            storage.len(),
                            alphabet.len()
                        ))
                    })?;
                    let coordinate = format_coordinate(&address, slot);
                    if coordinate_to_product
                        .insert(coordinate.clone(), product.clone())
                        .is_some()
                    {
                        return Err(InventoryError::NotBijective(format!(
                            "coordinate {coordinate} assigned twice"
                        )));
                    }
                }
            }
        }
    }

    let mut product_to_coordinate: IndexMap<ProductName, CoordinateKey> = IndexMap::new();
    for (coordinate, product) in &coordinate_to_product {
        if product_to_coordinate
            .insert(product.clone(), coordinate.clone())
            .is_some()
        {
            return Err(InventoryError::NotBijective(format!(
                "product '{product}' occupies two slots"
            )));
        }
    }

    Ok(CoordinateIndexes {
        coordinate_to_product,
        product_to_coordinate,
    })
}

/// Assign coordinates for a materialized tree in one step.
pub fn assign(
    tree: &PartitionTree,
    alphabet: &SlotAlphabet,
) -> Result<CoordinateIndexes, InventoryError> {
    let layout = build_layout(tree)?;
    assign_layout(&layout, alphabet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LeafStorage;

    fn address(room: Room, shelf: &str, bin: &str) -> LeafAddress {
        LeafAddress {
            room,
            shelf: shelf.to_string(),
            bin: bin.to_string(),
        }
    }

    fn one_bin_layout(products: Vec<&str>) -> Layout {
        let mut layout = Layout::new();
        layout
            .insert_bin(
                address(Room::Front, "1", "2"),
                LeafStorage::Flat(products.into_iter().map(String::from).collect()),
            )
            .unwrap();
        layout
    }

    #[test]
    fn coordinates_round_trip_through_parse() {
        let coordinate = format_coordinate(&address(Room::Back, "3", "1"), "c");
        assert_eq!(coordinate, "B.3.1.c");
        let (parsed, slot) = parse_coordinate(&coordinate).unwrap();
        assert_eq!(parsed, address(Room::Back, "3", "1"));
        assert_eq!(slot, "c");
    }

    #[test]
    fn malformed_coordinates_are_not_found() {
        assert!(matches!(
            parse_coordinate("F.1.2"),
            Err(InventoryError::NotFound(_))
        ));
        assert!(matches!(
            parse_coordinate("X.1.2.a"),
            Err(InventoryError::NotFound(_))
        ));
    }

    #[test]
    fn leaf_labels_must_be_shelf_bin_pairs() {
        assert!(parse_leaf_label("1.2").is_ok());
        for label in ["Remainder", "1.2.3", ".2", "1."] {
            assert!(matches!(
                parse_leaf_label(label),
                Err(InventoryError::Configuration(_))
            ));
        }
    }

    #[test]
    fn assignment_orders_slots_by_list_position() {
        let layout = one_bin_layout(vec!["Apple Gum", "Berry Chew"]);
        let indexes = assign_layout(&layout, &SlotAlphabet::lowercase_latin()).unwrap();
        assert_eq!(
            indexes.coordinate_to_product.get("F.1.2.a"),
            Some(&"Apple Gum".to_string())
        );
        assert_eq!(
            indexes.product_to_coordinate.get("Berry Chew"),
            Some(&"F.1.2.b".to_string())
        );
    }

    #[test]
    fn grouped_bins_keep_counting_slots_across_tiers() {
        let mut layout = Layout::new();
        layout
            .insert_bin(
                address(Room::Front, "1", "2"),
                LeafStorage::Grouped(vec![
                    vec!["Apple Gum".to_string()],
                    vec!["Berry Chew".to_string()],
                ]),
            )
            .unwrap();
        let indexes = assign_layout(&layout, &SlotAlphabet::lowercase_latin()).unwrap();
        assert_eq!(
            indexes.product_to_coordinate.get("Berry Chew"),
            Some(&"F.1.2.b".to_string())
        );
    }

    #[test]
    fn overflowing_the_alphabet_is_not_bijective() {
        let layout = one_bin_layout(vec!["a1", "a2", "a3"]);
        let alphabet = SlotAlphabet::new(vec!["a".to_string(), "b".to_string()]).unwrap();
        let err = assign_layout(&layout, &alphabet).unwrap_err();
        assert!(matches!(err, InventoryError::NotBijective(msg) if msg.contains("alphabet")));
    }

    #[test]
    fn duplicate_product_names_are_not_bijective() {
        let mut layout = one_bin_layout(vec!["Apple Gum"]);
        layout
            .insert_bin(
                address(Room::Back, "1", "2"),
                LeafStorage::Flat(vec!["Apple Gum".to_string()]),
            )
            .unwrap();
        let err = assign_layout(&layout, &SlotAlphabet::lowercase_latin()).unwrap_err();
        assert!(matches!(err, InventoryError::NotBijective(msg) if msg.contains("two slots")));
    }
}
