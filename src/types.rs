/// Product display name, unique across the whole inventory (join key for
/// every index).
/// Example: `Good Supply Jean Guy 3.5g`
pub type ProductName = String;
/// Numeric category code read from the input rows.
/// Examples: `1` (flower), `2` (edibles), `3` (extracts), `5` (pre-rolls)
pub type CategoryCode = u32;
/// Label attached to one partition node. Stable leaves use the `shelf.bin`
/// form; transient groupings use free-form names.
/// Examples: `1.2`, `Flower 3.5g`, `Remainder`
pub type NodeLabel = String;
/// Shelf segment of a coordinate.
/// Example: `1`
pub type ShelfLabel = String;
/// Bin segment of a coordinate.
/// Example: `2`
pub type BinLabel = String;
/// Slot segment of a coordinate, drawn from the positional alphabet.
/// Examples: `a`, `b`, `z`
pub type SlotLabel = String;
/// Full four-segment coordinate key.
/// Example: `F.1.2.a`
pub type CoordinateKey = String;
/// Human-readable name for a declared move link.
/// Example: `Flower 3.5g`
pub type LinkName = String;
