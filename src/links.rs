//! Declared pairings between front-room and back-room leaves.

use crate::constants::coordinates::{BACK_ROOM_CODE, FRONT_ROOM_CODE};
use crate::coords::parse_leaf_label;
use crate::errors::InventoryError;
use crate::layout::{LeafAddress, Room};
use crate::tree::PartitionTree;
use crate::types::LinkName;

/// A symmetric pairing of exactly two stable leaves.
///
/// The link owns neither leaf; it only records that a product may relocate
/// between the two addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveLink {
    /// Human-readable link name.
    pub name: LinkName,
    /// Front-room endpoint.
    pub front: LeafAddress,
    /// Back-room endpoint.
    pub back: LeafAddress,
}

/// All declared move links, with endpoint lookup by leaf address.
#[derive(Clone, Debug, Default)]
pub struct LinkRegistry {
    links: Vec<MoveLink>,
}

impl LinkRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a link between a leaf under the front room and a leaf under
    /// the back room, resolving both endpoints against the tree.
    ///
    /// An endpoint that cannot be found, or that is not a stable leaf, makes
    /// the link unusable and fails the declaration.
    pub fn declare(
        &mut self,
        tree: &PartitionTree,
        name: &str,
        front_label: &str,
        back_label: &str,
    ) -> Result<(), InventoryError> {
        let front = resolve_endpoint(tree, Room::Front, front_label)?;
        let back = resolve_endpoint(tree, Room::Back, back_label)?;
        self.links.push(MoveLink {
            name: name.to_string(),
            front,
            back,
        });
        Ok(())
    }

    /// Register a pre-resolved link (snapshot-loaded inventories have no
    /// tree to resolve against).
    pub fn declare_resolved(&mut self, name: &str, front: LeafAddress, back: LeafAddress) {
        self.links.push(MoveLink {
            name: name.to_string(),
            front,
            back,
        });
    }

    /// The partner leaf of `address`, if a link covers it.
    pub fn partner(&self, address: &LeafAddress) -> Option<&LeafAddress> {
        self.links.iter().find_map(|link| {
            if &link.front == address {
                Some(&link.back)
            } else if &link.back == address {
                Some(&link.front)
            } else {
                None
            }
        })
    }

    /// Declared links in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MoveLink> {
        self.links.iter()
    }

    /// Number of declared links.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// True when no links are declared.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn resolve_endpoint(
    tree: &PartitionTree,
    room: Room,
    label: &str,
) -> Result<LeafAddress, InventoryError> {
    let room_label = match room {
        Room::Front => FRONT_ROOM_CODE,
        Room::Back => BACK_ROOM_CODE,
    };
    let room_node = tree.room_node(room_label).ok_or_else(|| {
        InventoryError::Configuration(format!("tree has no '{room_label}' room node"))
    })?;
    let leaf = tree
        .find_leaf_under(room_node, label)
        .ok_or_else(|| InventoryError::LocationUnavailable {
            shelf_bin: label.to_string(),
            room,
        })?;
    if !tree.node(leaf).is_stable_leaf() {
        return Err(InventoryError::Configuration(format!(
            "link endpoint '{label}' in room {room} is not a stable leaf"
        )));
    }
    let (shelf, bin) = parse_leaf_label(label)?;
    Ok(LeafAddress { room, shelf, bin })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Record;
    use crate::rules::{GroupSpec, PartitionHint, SortColumn, SplitRule};

    fn record(category: u32, rank: f64, name: &str) -> Record {
        Record {
            category,
            rank,
            name: name.to_string(),
            price: None,
            sku: None,
        }
    }

    fn linked_tree() -> PartitionTree {
        let mut tree = PartitionTree::from_inventory(
            vec![record(1, 1.0, "alpha"), record(1, 2.0, "bravo")],
            PartitionHint::Sorted(SortColumn::Rank),
        );
        let room_rule = SplitRule {
            target_category: 0,
            split_count: 2,
            groups: vec![
                GroupSpec::stable_with("F", PartitionHint::Unsorted),
                GroupSpec::stable_with("B", PartitionHint::Unsorted),
            ],
        };
        let rooms = tree.split(tree.root(), &room_rule).unwrap();
        let leaf_rule = SplitRule {
            target_category: 1,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("1.2"),
                GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
            ],
        };
        for room in rooms {
            tree.split(room, &leaf_rule).unwrap();
        }
        tree.materialize();
        tree
    }

    #[test]
    fn declare_resolves_both_endpoints() {
        let tree = linked_tree();
        let mut links = LinkRegistry::new();
        links.declare(&tree, "flower", "1.2", "1.2").unwrap();
        assert_eq!(links.len(), 1);

        let front = LeafAddress {
            room: Room::Front,
            shelf: "1".to_string(),
            bin: "2".to_string(),
        };
        let partner = links.partner(&front).unwrap();
        assert_eq!(partner.room, Room::Back);
        assert_eq!(partner.shelf_bin(), "1.2");
        assert_eq!(links.partner(partner), Some(&front));
    }

    #[test]
    fn missing_endpoint_is_location_unavailable() {
        let tree = linked_tree();
        let mut links = LinkRegistry::new();
        let err = links.declare(&tree, "flower", "9.9", "1.2").unwrap_err();
        assert!(matches!(
            err,
            InventoryError::LocationUnavailable { shelf_bin, room: Room::Front } if shelf_bin == "9.9"
        ));
    }

    #[test]
    fn unstable_endpoint_is_rejected() {
        let tree = linked_tree();
        let mut links = LinkRegistry::new();
        let err = links
            .declare(&tree, "flower", "Remainder", "1.2")
            .unwrap_err();
        assert!(matches!(err, InventoryError::Configuration(_)));
    }
}
