use crate::config::SlotAlphabet;
use crate::layout::{Layout, LeafAddress};

/// Aggregate occupancy metrics for the bins of a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancySummary {
    pub bins: usize,
    pub products: usize,
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    /// Fill ratio of the fullest bin against the slot alphabet.
    pub capacity_share: f64,
    pub per_bin: Vec<BinOccupancy>,
}

/// Product count of one bin.
#[derive(Clone, Debug, PartialEq)]
pub struct BinOccupancy {
    pub address: LeafAddress,
    pub count: usize,
    pub share: f64,
}

/// Compute occupancy metrics for a layout against its slot alphabet.
pub fn layout_occupancy(layout: &Layout, alphabet: &SlotAlphabet) -> Option<OccupancySummary> {
    let mut per_bin = Vec::new();
    for (room, shelves) in layout.rooms() {
        for (shelf, bins) in shelves {
            for (bin, storage) in bins {
                per_bin.push(BinOccupancy {
                    address: LeafAddress {
                        room,
                        shelf: shelf.clone(),
                        bin: bin.clone(),
                    },
                    count: storage.len(),
                    share: 0.0,
                });
            }
        }
    }
    if per_bin.is_empty() {
        return None;
    }

    let bins = per_bin.len();
    let products: usize = per_bin.iter().map(|bin| bin.count).sum();
    let min = per_bin.iter().map(|bin| bin.count).min().expect("bins non-empty");
    let max = per_bin.iter().map(|bin| bin.count).max().expect("bins non-empty");
    let mean = products as f64 / bins as f64;
    for bin in &mut per_bin {
        bin.share = if products == 0 {
            0.0
        } else {
            bin.count as f64 / products as f64
        };
    }
    let capacity_share = max as f64 / alphabet.len() as f64;

    Some(OccupancySummary {
        bins,
        products,
        min,
        max,
        mean,
        capacity_share,
        per_bin,
    })
}
