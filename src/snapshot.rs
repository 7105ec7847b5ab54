//! Snapshot encoding, validation, and persistence.
//!
//! The sole persisted state is the nested `room → shelf → bin → [products]`
//! mapping. A snapshot is loaded whole or not at all: any structural fault
//! fails the load with [`InventoryError::CorruptSnapshot`] and the caller
//! falls back to rebuilding from the full record source.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::errors::InventoryError;
use crate::layout::{Layout, LeafAddress, LeafStorage, Room};

/// Serialize a layout to the pretty-printed snapshot document.
pub fn to_json(layout: &Layout) -> Result<String, InventoryError> {
    serde_json::to_string_pretty(layout)
        .map_err(|err| InventoryError::CorruptSnapshot(format!("encoding failed: {err}")))
}

/// Parse and validate a snapshot document into a layout.
pub fn from_json(document: &str) -> Result<Layout, InventoryError> {
    let value: Value = serde_json::from_str(document)
        .map_err(|err| InventoryError::CorruptSnapshot(format!("not valid JSON: {err}")))?;
    let rooms = value
        .as_object()
        .ok_or_else(|| corrupt("top level is not an object"))?;

    let mut layout = Layout::new();
    let mut seen_products: HashSet<String> = HashSet::new();
    for (room_key, shelves) in rooms {
        let room = Room::from_code(room_key)
            .ok_or_else(|| corrupt(&format!("unknown room key '{room_key}'")))?;
        let shelves = shelves
            .as_object()
            .ok_or_else(|| corrupt(&format!("room '{room_key}' is not an object")))?;
        for (shelf, bins) in shelves {
            let bins = bins
                .as_object()
                .ok_or_else(|| corrupt(&format!("shelf '{room_key}.{shelf}' is not an object")))?;
            for (bin, products) in bins {
                let address = LeafAddress {
                    room,
                    shelf: shelf.clone(),
                    bin: bin.clone(),
                };
                let storage = decode_bin(&address, products, &mut seen_products)?;
                layout.insert_bin(address, storage)?;
            }
        }
    }
    Ok(layout)
}

/// Write a layout to `path` as a snapshot document.
pub fn save<P: AsRef<Path>>(layout: &Layout, path: P) -> Result<(), InventoryError> {
    fs::write(path, to_json(layout)?)?;
    Ok(())
}

/// Load and validate the snapshot document at `path`.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Layout, InventoryError> {
    let document = fs::read_to_string(path)?;
    from_json(&document)
}

fn corrupt(reason: &str) -> InventoryError {
    InventoryError::CorruptSnapshot(reason.to_string())
}

fn decode_bin(
    address: &LeafAddress,
    products: &Value,
    seen: &mut HashSet<String>,
) -> Result<LeafStorage, InventoryError> {
    let entries = products
        .as_array()
        .ok_or_else(|| corrupt(&format!("bin {address} is not a list")))?;

    let nested = entries.iter().any(Value::is_array);
    if !nested {
        return Ok(LeafStorage::Flat(decode_products(address, entries, seen)?));
    }

    let mut tiers = Vec::with_capacity(entries.len());
    for entry in entries {
        let tier = entry
            .as_array()
            .ok_or_else(|| corrupt(&format!("bin {address} mixes products and sub-lists")))?;
        tiers.push(decode_products(address, tier, seen)?);
    }
    Ok(LeafStorage::Grouped(tiers))
}

fn decode_products(
    address: &LeafAddress,
    entries: &[Value],
    seen: &mut HashSet<String>,
) -> Result<Vec<String>, InventoryError> {
    let mut products = Vec::with_capacity(entries.len());
    for entry in entries {
        let name = entry
            .as_str()
            .ok_or_else(|| corrupt(&format!("bin {address} holds a non-string entry")))?;
        if !seen.insert(name.to_string()) {
            return Err(corrupt(&format!("product '{name}' appears twice")));
        }
        products.push(name.to_string());
    }
    Ok(products)
}
