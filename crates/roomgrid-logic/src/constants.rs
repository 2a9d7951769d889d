//! Grid constants - detail grid size, raw cell encoding, default thicknesses.
//!
//! Plain constants with no dependencies. Both the session crate and the
//! simtest harness use these.

/// Detail cells along each side of a floor tile or wall segment.
pub const SEGMENTS_PER_SIDE: usize = 4;

/// Total detail cells per SegmentGrid.
pub const CELL_COUNT: usize = SEGMENTS_PER_SIDE * SEGMENTS_PER_SIDE;

/// Raw cell encoding used at the persistence boundary.
pub mod raw {
    /// Empty / unassigned cell, and "no door".
    pub const EMPTY: i32 = -1;
    /// Values at or below this are merge pointers: parent = `-(v + 2)`.
    pub const POINTER_BASE: i32 = -2;
    /// Largest content id the raw form can hold.
    pub const MAX_CONTENT: i32 = i32::MAX;
}

/// Default world-space thicknesses applied to the thin axis of placed content.
pub mod thickness {
    /// Height given to floor content along the up axis.
    pub const FLOOR: f32 = 0.05;
    /// Depth given to wall content along the wall normal.
    pub const WALL: f32 = 0.2;
}

/// Default edge length of one room tile on every axis.
pub const DEFAULT_TILE_SIZE: f32 = 4.0;
