use crate::types::CategoryCode;

/// Constants used by room naming and coordinate formatting.
pub mod coordinates {
    /// Code for the front room, the first segment of a front coordinate.
    pub const FRONT_ROOM_CODE: &str = "F";
    /// Code for the back room, the first segment of a back coordinate.
    pub const BACK_ROOM_CODE: &str = "B";
    /// Separator between coordinate segments.
    pub const SEGMENT_SEPARATOR: char = '.';
    /// Number of segments in a full coordinate (`room.shelf.bin.slot`).
    pub const SEGMENT_COUNT: usize = 4;
}

/// Constants used by tree construction and rendering.
pub mod tree {
    /// Label given to the root node of a freshly built tree.
    pub const ROOT_LABEL: &str = "main";
    /// Marker appended to stable node labels when rendering the tree.
    pub const STABLE_MARKER: &str = "***";
    /// Indent unit used when rendering the tree.
    pub const RENDER_INDENT: &str = "    ";
}

/// Constants used by slot-alphabet configuration documents.
pub mod slots {
    /// Top-level key of a slot-alphabet JSON document.
    pub const ALPHABET_DOCUMENT_KEY: &str = "z_coordinate";
}

/// Constants used by input record filtering.
pub mod records {
    use super::CategoryCode;

    /// Category codes kept off the sales floor and excluded before
    /// partitioning (accessories and heavy goods).
    pub const OFF_FLOOR_CATEGORIES: [CategoryCode; 2] = [0, 4];
}
