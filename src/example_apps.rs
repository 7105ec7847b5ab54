//! Reusable demo runner shared by the example binaries.
//!
//! Bundles a small but complete store inventory and the hand-authored
//! taxonomy that organizes it: rank halves front/back, flower splits by SKU
//! weight then price tier, pre-rolls by pack-count SKU patterns, edibles by
//! pure/mixed name patterns, and extracts by disposable/cartridge patterns.

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, error::ErrorKind};

use crate::config::{LinkSpec, SlotAlphabet, TaxonomyProgram, TaxonomyStep};
use crate::coords::parse_coordinate;
use crate::data::Record;
use crate::errors::InventoryError;
use crate::inventory::Inventory;
use crate::metrics::layout_occupancy;
use crate::rules::{
    GroupSpec, PartitionHint, PatternSet, PatternTest, SortColumn, SplitRule, TextColumn,
};
use crate::types::CategoryCode;

#[derive(Debug, Parser)]
#[command(
    name = "store_demo",
    disable_help_subcommand = true,
    about = "Build the demo store and query its coordinate system",
    long_about = "Partition the bundled demo inventory into the front/back coordinate system, \
                  then print the coordinate table, look up products, move them between rooms, \
                  or write a snapshot."
)]
struct StoreDemoCli {
    #[arg(long, help = "Print the partition tree instead of the coordinate table")]
    show_tree: bool,
    #[arg(long, help = "Print bin occupancy metrics after the coordinate table")]
    show_metrics: bool,
    #[arg(long, value_name = "NAME", help = "Look up one product by exact name")]
    find: Option<String>,
    #[arg(
        long = "move",
        value_name = "NAME",
        help = "Move one product to the opposite room before reporting"
    )]
    move_product: Option<String>,
    #[arg(long, value_name = "PATH", help = "Write the resulting snapshot to PATH")]
    snapshot_path: Option<PathBuf>,
}

fn parse_cli<T: Parser, I: Iterator<Item = String>>(
    args: I,
) -> Result<Option<T>, Box<dyn Error>> {
    match T::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(err)
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
            ) =>
        {
            err.print()?;
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

/// Run the `store_demo` CLI over `args_iter` (program name excluded).
pub fn run_store_demo<I: Iterator<Item = String>>(args_iter: I) -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let Some(cli) = parse_cli::<StoreDemoCli, _>(
        std::iter::once("store_demo".to_string()).chain(args_iter),
    )?
    else {
        return Ok(());
    };

    let program = demo_program()?;
    let alphabet = demo_alphabet();
    let (tree, links) = program.build(demo_records())?;
    if cli.show_tree {
        print!("{tree}");
        return Ok(());
    }
    let mut inventory = Inventory::from_tree(&tree, alphabet, links)?;

    if let Some(name) = &cli.move_product {
        let (address, _) = parse_coordinate(&inventory.lookup_by_name(name)?)?;
        let moved = inventory.relocate(name, address.room.opposite())?;
        println!("{name} moved to {moved}");
    }

    if let Some(name) = &cli.find {
        println!("{name} is at {}", inventory.lookup_by_name(name)?);
    } else {
        for (coordinate, product) in &inventory.indexes().coordinate_to_product {
            println!("{coordinate}  {product}");
        }
    }

    if cli.show_metrics {
        if let Some(summary) = layout_occupancy(inventory.layout(), inventory.alphabet()) {
            println!(
                "{} products across {} bins (min {}, max {}, mean {:.1}, fullest at {:.0}% of slots)",
                summary.products,
                summary.bins,
                summary.min,
                summary.max,
                summary.mean,
                summary.capacity_share * 100.0
            );
        }
    }

    if let Some(path) = &cli.snapshot_path {
        inventory.save_snapshot(path)?;
        println!("snapshot written to {}", path.display());
    }
    Ok(())
}

/// Slot alphabet used by the demo store.
pub fn demo_alphabet() -> SlotAlphabet {
    SlotAlphabet::lowercase_latin()
}

const FLOWER: CategoryCode = 1;
const EDIBLES: CategoryCode = 2;
const EXTRACTS: CategoryCode = 3;
const PRE_ROLLS: CategoryCode = 5;

fn rec(category: CategoryCode, rank: f64, name: &str, price: f64, sku: &str) -> Record {
    Record {
        category,
        rank,
        name: name.to_string(),
        price: Some(price),
        sku: Some(sku.to_string()),
    }
}

/// The bundled demo inventory: flower, pre-rolls, edibles, and extracts.
pub fn demo_records() -> Vec<Record> {
    vec![
        // Flower: best sellers first, a weight in every SKU.
        rec(FLOWER, 1.0, "Pink Kush 3.5g", 29.99, "FLW-3.5g-PK"),
        rec(FLOWER, 2.0, "Jean Guy 3.5g", 34.50, "FLW-3.5g-JG"),
        rec(FLOWER, 3.0, "Blue Dream 3.5g", 39.99, "FLW-3.5g-BD"),
        rec(FLOWER, 4.0, "Sour Diesel 7g", 54.99, "FLW-7g-SD"),
        rec(FLOWER, 5.0, "Wedding Cake 3.5g", 31.00, "FLW-3.5g-WC"),
        rec(FLOWER, 6.0, "OG Kush 7g", 49.99, "FLW-7g-OG"),
        rec(FLOWER, 7.0, "Northern Lights 14g", 89.99, "FLW-14g-NL"),
        rec(FLOWER, 8.0, "Granddaddy Purple 28g", 149.99, "FLW-28g-GP"),
        // Pre-rolls: pack count lives in the SKU suffix.
        rec(PRE_ROLLS, 1.0, "Animal Mints Pre-Roll", 8.99, "PR-AM_1x"),
        rec(PRE_ROLLS, 2.0, "Glue Cake Pre-Roll 3-Pack", 21.99, "PR-GC_3x"),
        rec(PRE_ROLLS, 3.0, "Party Pack Pre-Rolls", 34.99, "PR-PP_5x"),
        rec(PRE_ROLLS, 4.0, "CBD Calm Pre-Roll", 9.99, "PR-CBD"),
        rec(PRE_ROLLS, 5.0, "Infused Caviar Cone", 14.99, "PR-IC_1x"),
        rec(PRE_ROLLS, 6.0, "Diamond Infused Pre-Roll", 15.99, "PR-DI_1x"),
        rec(PRE_ROLLS, 7.0, "House Blend Pre-Roll", 5.99, "PR-HB_1x"),
        rec(PRE_ROLLS, 8.0, "Value Twos Pre-Roll", 10.99, "PR-VT_2x"),
        // Edibles.
        rec(EDIBLES, 1.0, "Midnight Berry CBN Gummies", 7.99, "ED-MB"),
        rec(EDIBLES, 2.0, "Dark Chocolate Squares", 6.99, "ED-DC"),
        rec(EDIBLES, 3.0, "Peach Mango Gummies", 6.49, "ED-PM"),
        rec(EDIBLES, 4.0, "Sour Apple Gummies", 5.99, "ED-SA"),
        rec(EDIBLES, 5.0, "Watermelon Soft Chews", 5.99, "ED-WM"),
        rec(EDIBLES, 6.0, "Honey Lemon Lozenges", 4.99, "ED-HL"),
        // Extracts: disposables, pods, and cartridges.
        rec(EXTRACTS, 1.0, "Tropical Haze Disposable", 44.99, "EX-TH"),
        rec(EXTRACTS, 2.0, "Live Resin 0.5g Cart", 39.99, "EX-LR"),
        rec(EXTRACTS, 3.0, "Blueberry 1g Cart", 49.99, "EX-BB"),
        rec(EXTRACTS, 4.0, "Sunset Sherbet 1g Cart", 47.99, "EX-SS"),
        rec(EXTRACTS, 5.0, "Grape Ape 0.5g Cart", 37.99, "EX-GA"),
        rec(EXTRACTS, 6.0, "Pineapple Express Pax Pod", 54.99, "EX-PE"),
    ]
}

fn sku_patterns(tests: Vec<PatternTest>) -> PartitionHint {
    PartitionHint::Patterns(PatternSet::new(TextColumn::Sku, tests))
}

fn name_patterns(tests: Vec<PatternTest>) -> PartitionHint {
    PartitionHint::Patterns(PatternSet::new(TextColumn::Name, tests))
}

fn step(path: &[&str], rule: SplitRule) -> TaxonomyStep {
    TaxonomyStep {
        path: path.iter().map(|s| s.to_string()).collect(),
        rule,
    }
}

/// The hand-authored taxonomy for the demo store.
///
/// Rank halves every category between the rooms; the front room carries the
/// fine-grained weight/price/pack breakdown while the back room keeps
/// coarser overstock bins.
pub fn demo_program() -> Result<TaxonomyProgram, InventoryError> {
    let mut program = TaxonomyProgram::new(PartitionHint::Sorted(SortColumn::Rank));

    // Room split. Each room's hint drives its own flower breakdown next.
    program.steps.push(step(
        &[],
        SplitRule {
            target_category: FLOWER,
            split_count: 2,
            groups: vec![
                GroupSpec::stable_with(
                    "F",
                    sku_patterns(vec![
                        PatternTest::contains("3.5g"),
                        PatternTest::contains("7g"),
                        PatternTest::contains("14g"),
                        PatternTest::contains("28g"),
                    ]),
                ),
                GroupSpec::stable_with(
                    "B",
                    sku_patterns(vec![PatternTest::matches("3\\.5g|7g")?]),
                ),
            ],
        },
    ));

    // Front flower by SKU weight; 3.5g jars go on to price tiers.
    program.steps.push(step(
        &["F"],
        SplitRule {
            target_category: FLOWER,
            split_count: 0,
            groups: vec![
                GroupSpec::unstable("Flower 3.5g", PartitionHint::Sorted(SortColumn::Price)),
                GroupSpec::stable("7.1"),
                GroupSpec::stable("7.2"),
                GroupSpec::stable("7.3"),
                GroupSpec::stable("7.4"),
                GroupSpec::unstable(
                    "Remainder",
                    sku_patterns(vec![
                        PatternTest::matches("_1x|_2x")?,
                        PatternTest::contains("_3x"),
                        PatternTest::matches("_[4-9]x")?,
                    ]),
                ),
            ],
        },
    ));

    // Front 3.5g flower by price tier.
    program.steps.push(step(
        &["F", "Flower 3.5g"],
        SplitRule {
            target_category: FLOWER,
            split_count: 3,
            groups: vec![
                GroupSpec::stable("1.2"),
                GroupSpec::stable("2.2"),
                GroupSpec::stable("3.2"),
                GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
            ],
        },
    ));

    // Front pre-rolls by pack count.
    program.steps.push(step(
        &["F", "Remainder"],
        SplitRule {
            target_category: PRE_ROLLS,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("4.3"),
                GroupSpec::stable("5.3"),
                GroupSpec::stable("6.3"),
                GroupSpec::stable("4.2"),
                GroupSpec::unstable(
                    "Remainder",
                    name_patterns(vec![
                        PatternTest::matches(":|CBD|CBG|CBN|CBC|Chocolate")?,
                    ]),
                ),
            ],
        },
    ));

    // Front edibles: blended products apart from pure THC.
    program.steps.push(step(
        &["F", "Remainder", "Remainder"],
        SplitRule {
            target_category: EDIBLES,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("5.2"),
                GroupSpec::stable("5.1"),
                GroupSpec::unstable(
                    "Remainder",
                    name_patterns(vec![PatternTest::matches("Disposable|Pax")?]),
                ),
            ],
        },
    ));

    // Front extracts: disposables out first, then carts by fill weight.
    program.steps.push(step(
        &["F", "Remainder", "Remainder", "Remainder"],
        SplitRule {
            target_category: EXTRACTS,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("3.3"),
                GroupSpec::unstable(
                    "Cartridges",
                    name_patterns(vec![PatternTest::matches("0\\.\\dg")?]),
                ),
                GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
            ],
        },
    ));
    program.steps.push(step(
        &["F", "Remainder", "Remainder", "Remainder", "Cartridges"],
        SplitRule {
            target_category: EXTRACTS,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("2.3"),
                GroupSpec::stable("1.3"),
                GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
            ],
        },
    ));

    // Back flower: light weights together, bulk jars together.
    program.steps.push(step(
        &["B"],
        SplitRule {
            target_category: FLOWER,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("3.2"),
                GroupSpec::stable("3.3"),
                GroupSpec::unstable(
                    "Remainder",
                    name_patterns(vec![PatternTest::contains("Infused")]),
                ),
            ],
        },
    ));

    // Back pre-rolls: infused apart from standard cones.
    program.steps.push(step(
        &["B", "Remainder"],
        SplitRule {
            target_category: PRE_ROLLS,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("2.1"),
                GroupSpec::stable("3.1"),
                GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
            ],
        },
    ));

    // Back extracts: one overstock bin, no disposables in the back.
    program.steps.push(step(
        &["B", "Remainder", "Remainder"],
        SplitRule {
            target_category: EXTRACTS,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("2.2"),
                GroupSpec::unstable(
                    "Remainder",
                    name_patterns(vec![PatternTest::matches("Soft Chew|Gumm")?]),
                ),
            ],
        },
    ));

    // Back edibles: gummies and chews apart from the rest.
    program.steps.push(step(
        &["B", "Remainder", "Remainder", "Remainder"],
        SplitRule {
            target_category: EDIBLES,
            split_count: 0,
            groups: vec![
                GroupSpec::stable("1.1"),
                GroupSpec::stable("1.2"),
                GroupSpec::unstable("Remainder", PartitionHint::Unsorted),
            ],
        },
    ));

    program.links.push(LinkSpec {
        name: "Flower 3.5g".to_string(),
        front: "1.2".to_string(),
        back: "3.2".to_string(),
    });
    program.links.push(LinkSpec {
        name: "Cartridges".to_string(),
        front: "2.3".to_string(),
        back: "2.2".to_string(),
    });
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_program_builds_and_assigns_every_record() {
        let records = demo_records();
        let expected = records.len();
        let (tree, links) = demo_program().unwrap().build(records).unwrap();
        let inventory = Inventory::from_tree(&tree, demo_alphabet(), links).unwrap();
        assert_eq!(inventory.product_count(), expected);
    }

    #[test]
    fn demo_front_room_holds_the_best_ranked_half() {
        let (tree, links) = demo_program().unwrap().build(demo_records()).unwrap();
        let inventory = Inventory::from_tree(&tree, demo_alphabet(), links).unwrap();
        // Rank 1 flower lands in the cheapest front price tier.
        assert_eq!(
            inventory.lookup_by_name("Pink Kush 3.5g").unwrap(),
            "F.1.2.a"
        );
        // Rank 8 flower is bulk overstock in the back.
        let coordinate = inventory.lookup_by_name("Granddaddy Purple 28g").unwrap();
        assert!(coordinate.starts_with("B.3.3."));
    }
}
