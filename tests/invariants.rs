use shelfmap::split::split_records;
use shelfmap::{
    GroupSpec, Inventory, InventoryError, PartitionHint, PartitionTree, PatternSet, PatternTest,
    Record, Room, SlotAlphabet, SortColumn, SplitRule, TextColumn,
};

fn build_record(category: u32, rank: f64, name: &str) -> Record {
    Record {
        category,
        rank,
        name: name.to_string(),
        price: None,
        sku: None,
    }
}

fn room_rule(front_next: PartitionHint, back_next: PartitionHint) -> SplitRule {
    SplitRule {
        target_category: 0,
        split_count: 2,
        groups: vec![
            GroupSpec::stable_with("F", front_next),
            GroupSpec::stable_with("B", back_next),
        ],
    }
}

fn leaf_rule(category: u32, label: &str) -> SplitRule {
    SplitRule {
        target_category: category,
        split_count: 0,
        groups: vec![
            GroupSpec::stable(label),
            GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
        ],
    }
}

/// Two-room tree with one leaf per room over the same shelf/bin pair.
fn paired_leaf_inventory(records: Vec<Record>) -> Inventory {
    let mut tree =
        PartitionTree::from_inventory(records, PartitionHint::Sorted(SortColumn::Rank));
    let rooms = tree
        .split(
            tree.root(),
            &room_rule(PartitionHint::Unsorted, PartitionHint::Unsorted),
        )
        .unwrap();
    for room in rooms {
        tree.split(room, &leaf_rule(1, "1.2")).unwrap();
    }
    tree.materialize();

    let mut links = shelfmap::LinkRegistry::new();
    links.declare(&tree, "gum", "1.2", "1.2").unwrap();
    Inventory::from_tree(&tree, SlotAlphabet::lowercase_latin(), links).unwrap()
}

#[test]
fn rank_split_of_ten_products_yields_five_and_five() {
    let mut records: Vec<Record> = (1..=10)
        .map(|i| build_record(1, i as f64, &format!("product {i:02}")))
        .collect();
    records.push(build_record(3, 1.0, "other category"));

    let groups = split_records(
        &records,
        1,
        &PartitionHint::Sorted(SortColumn::Rank),
        2,
    )
    .unwrap();

    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].len(), 5);
    assert_eq!(groups[1].len(), 5);
    let first_ranks: Vec<f64> = groups[0].iter().map(|r| r.rank).collect();
    assert_eq!(first_ranks, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    let second_ranks: Vec<f64> = groups[1].iter().map(|r| r.rank).collect();
    assert_eq!(second_ranks, vec![6.0, 7.0, 8.0, 9.0, 10.0]);
    assert_eq!(groups[2].len(), 1);
    assert_eq!(groups[2][0].name, "other category");
}

#[test]
fn pattern_split_matches_the_documented_scenario() {
    let hint = PartitionHint::Patterns(PatternSet::new(
        TextColumn::Name,
        vec![
            PatternTest::contains("gummy"),
            PatternTest::matches(r"0\.\d+g").unwrap(),
        ],
    ));
    let records = vec![
        build_record(2, 1.0, "Soft Chew Gummy"),
        build_record(2, 2.0, "Live Resin 0.5g Cart"),
        build_record(2, 3.0, "Flower 3.5g"),
    ];

    let groups = split_records(&records, 2, &hint, 0).unwrap();
    let names = |idx: usize| -> Vec<&str> { groups[idx].iter().map(|r| r.name.as_str()).collect() };
    assert_eq!(names(0), vec!["Soft Chew Gummy"]);
    assert_eq!(names(1), vec!["Live Resin 0.5g Cart"]);
    assert_eq!(names(2), vec!["Flower 3.5g"]);
}

#[test]
fn every_split_mode_conserves_the_record_count() {
    let records: Vec<Record> = (0..17)
        .map(|i| {
            let mut record = build_record(1 + (i % 3), i as f64, &format!("item {i:02}"));
            record.sku = Some(format!("SKU-{i:02}"));
            record
        })
        .collect();

    let hints = vec![
        PartitionHint::Unsorted,
        PartitionHint::Sorted(SortColumn::Rank),
        PartitionHint::Sorted(SortColumn::Sku),
        PartitionHint::Patterns(PatternSet::new(
            TextColumn::Name,
            vec![PatternTest::contains("item 0"), PatternTest::contains("1")],
        )),
    ];
    for hint in hints {
        for n in 1..=4 {
            let groups = split_records(&records, 1, &hint, n).unwrap();
            let total: usize = groups.iter().map(Vec::len).sum();
            assert_eq!(total, records.len());
        }
    }
}

#[test]
fn materialization_is_idempotent_over_the_whole_tree() {
    let records = vec![
        build_record(1, 1.0, "bravo"),
        build_record(1, 2.0, "alpha"),
        build_record(1, 3.0, "delta"),
        build_record(1, 4.0, "charlie"),
    ];
    let mut tree =
        PartitionTree::from_inventory(records, PartitionHint::Sorted(SortColumn::Rank));
    let rooms = tree
        .split(
            tree.root(),
            &room_rule(PartitionHint::Unsorted, PartitionHint::Unsorted),
        )
        .unwrap();
    for room in rooms {
        tree.split(room, &leaf_rule(1, "1.2")).unwrap();
    }

    tree.materialize();
    let first = tree.map_stable_leaves(|_, node| node.products.clone());
    tree.materialize();
    let second = tree.map_stable_leaves(|_, node| node.products.clone());
    assert_eq!(first, second);
    assert!(first.iter().all(|products| products.is_some()));
}

#[test]
fn lookups_are_bijective_for_every_product() {
    let records: Vec<Record> = (0..9)
        .map(|i| build_record(1, i as f64, &format!("product {i}")))
        .collect();
    let names: Vec<String> = records.iter().map(|r| r.name.clone()).collect();
    let inventory = paired_leaf_inventory(records);

    for name in names {
        let coordinate = inventory.lookup_by_name(&name).unwrap();
        assert_eq!(inventory.lookup_by_coordinate(&coordinate).unwrap(), name);
    }
}

#[test]
fn move_round_trip_restores_the_original_coordinate() {
    let records = vec![
        build_record(1, 1.0, "Apple Gum"),
        build_record(1, 2.0, "Berry Chew"),
        build_record(1, 3.0, "Citrus Drop"),
        build_record(1, 4.0, "Melon Ice"),
    ];
    let mut inventory = paired_leaf_inventory(records);

    let origin = inventory.lookup_by_name("Apple Gum").unwrap();
    assert!(origin.starts_with("F."));

    let away = inventory.relocate("Apple Gum", Room::Back).unwrap();
    assert!(away.starts_with("B."));
    // The product left the front leaf entirely.
    let front_bin = inventory
        .layout()
        .bin(&shelfmap::LeafAddress {
            room: Room::Front,
            shelf: "1".to_string(),
            bin: "2".to_string(),
        })
        .unwrap();
    assert!(!front_bin.contains("Apple Gum"));

    let back_home = inventory.relocate("Apple Gum", Room::Front).unwrap();
    assert_eq!(back_home, origin);
}

#[test]
fn noop_move_is_rejected_and_leaves_indexes_untouched() {
    let mut inventory = paired_leaf_inventory(vec![
        build_record(1, 1.0, "Apple Gum"),
        build_record(1, 2.0, "Berry Chew"),
    ]);
    let before = inventory.indexes().clone();

    let err = inventory.relocate("Apple Gum", Room::Front).unwrap_err();
    assert!(matches!(
        err,
        InventoryError::InvalidMove { ref product, room: Room::Front } if product == "Apple Gum"
    ));
    assert_eq!(inventory.indexes(), &before);
}

#[test]
fn unknown_product_relocation_is_not_found() {
    let mut inventory = paired_leaf_inventory(vec![build_record(1, 1.0, "Apple Gum")]);
    let err = inventory.relocate("Nope", Room::Back).unwrap_err();
    assert!(matches!(err, InventoryError::NotFound(name) if name == "Nope"));
}

#[test]
fn leaves_without_a_stable_ancestor_fail_assignment() {
    // Every grouping above the leaf stays unstable, so no room can be
    // derived for it.
    let mut tree = PartitionTree::from_inventory(
        vec![build_record(1, 1.0, "orphan"), build_record(1, 2.0, "spare")],
        PartitionHint::Sorted(SortColumn::Rank),
    );
    let main_rule = SplitRule {
        target_category: 1,
        split_count: 2,
        groups: vec![
            GroupSpec::unstable("left", PartitionHint::Unsorted),
            GroupSpec::unstable("right", PartitionHint::Unsorted),
        ],
    };
    let children = tree.split(tree.root(), &main_rule).unwrap();
    tree.split(children[0], &leaf_rule(1, "1.2")).unwrap();
    tree.materialize();

    let err = shelfmap::coords::build_layout(&tree).unwrap_err();
    assert!(matches!(
        err,
        InventoryError::Configuration(msg) if msg.contains("no stable ancestor")
    ));
}
