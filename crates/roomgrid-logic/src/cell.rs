//! Cell values, cell coordinates and rectangles in 4×4 detail space.
//!
//! A detail cell is either empty, holds a content id, or is a member of a
//! merged group whose root lives at another index. The root of a group is
//! never itself a member, which is why the value read off a root has its own
//! type ([`RootCell`]).
//!
//! The persisted form is a single integer per cell:
//!
//! | Raw value | Cell |
//! |-----------|------|
//! | `-1` | [`Cell::Empty`] |
//! | `v >= 0` | [`Cell::Content`]`(v)` |
//! | `v <= -2` | [`Cell::MemberOf`]`(-(v + 2))` |

use serde::{Deserialize, Serialize};

use crate::constants::{raw, SEGMENTS_PER_SIDE};

/// Identifier into a floor, wall or door catalog. Every non-negative raw
/// value is a content id, whether or not a catalog knows it.
pub type ContentId = u32;

/// Largest id with a raw form. Grid mutators reject anything above it.
pub const MAX_CONTENT_ID: ContentId = raw::MAX_CONTENT as ContentId;

/// Index into the 16 cells of a SegmentGrid (`row * 4 + col`).
pub type CellIndex = usize;

/// One detail cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cell {
    #[default]
    Empty,
    Content(ContentId),
    /// Member of the group rooted at this index.
    MemberOf(CellIndex),
}

impl Cell {
    /// Decode a raw integer. Range checks on the parent index are left to
    /// the grid, which knows how many cells exist.
    pub fn from_raw(value: i32) -> Cell {
        match value {
            raw::EMPTY => Cell::Empty,
            v if v >= 0 => Cell::Content(v as ContentId),
            v => Cell::MemberOf((-(v as i64 + 2)) as usize),
        }
    }

    pub fn to_raw(self) -> i32 {
        match self {
            Cell::Empty => raw::EMPTY,
            Cell::Content(id) => content_to_raw(id),
            Cell::MemberOf(parent) => pointer_to(parent),
        }
    }

    pub fn is_member(self) -> bool {
        matches!(self, Cell::MemberOf(_))
    }

    /// The value this cell holds when read as a group root.
    /// `None` for member cells.
    pub fn as_root(self) -> Option<RootCell> {
        match self {
            Cell::Empty => Some(RootCell::Empty),
            Cell::Content(id) => Some(RootCell::Content(id)),
            Cell::MemberOf(_) => None,
        }
    }
}

/// Raw form of a content id. Ids past [`MAX_CONTENT_ID`] never reach a grid
/// through its mutators; should one get there, it saturates.
pub fn content_to_raw(id: ContentId) -> i32 {
    i32::try_from(id).unwrap_or(raw::MAX_CONTENT)
}

/// Raw pointer encoding of a parent index.
pub fn pointer_to(parent: CellIndex) -> i32 {
    raw::POINTER_BASE - parent as i32
}

/// Value held by the root cell of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RootCell {
    #[default]
    Empty,
    Content(ContentId),
}

impl RootCell {
    pub fn content(self) -> Option<ContentId> {
        match self {
            RootCell::Empty => None,
            RootCell::Content(id) => Some(id),
        }
    }
}

impl From<RootCell> for Cell {
    fn from(root: RootCell) -> Self {
        match root {
            RootCell::Empty => Cell::Empty,
            RootCell::Content(id) => Cell::Content(id),
        }
    }
}

impl From<Option<ContentId>> for RootCell {
    fn from(id: Option<ContentId>) -> Self {
        id.map_or(RootCell::Empty, RootCell::Content)
    }
}

/// Column/row position of a cell. Row 0 is the top of the edit grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: usize,
    pub row: usize,
}

impl CellCoord {
    pub fn new(col: usize, row: usize) -> Self {
        Self { col, row }
    }

    pub fn from_index(index: CellIndex) -> Self {
        Self {
            col: index % SEGMENTS_PER_SIDE,
            row: index / SEGMENTS_PER_SIDE,
        }
    }

    pub fn index(self) -> CellIndex {
        self.row * SEGMENTS_PER_SIDE + self.col
    }
}

/// Axis-aligned rectangle of cells: `x`/`y` are the top-left column/row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellRect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl CellRect {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The whole 4×4 grid.
    pub fn full() -> Self {
        Self::new(0, 0, SEGMENTS_PER_SIDE, SEGMENTS_PER_SIDE)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Non-degenerate and entirely inside the 4×4 grid.
    pub fn fits_grid(&self) -> bool {
        !self.is_degenerate()
            && self.x + self.width <= SEGMENTS_PER_SIDE
            && self.y + self.height <= SEGMENTS_PER_SIDE
    }

    pub fn top_left(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.col >= self.x
            && coord.col < self.x + self.width
            && coord.row >= self.y
            && coord.row < self.y + self.height
    }

    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Cells covered by this rectangle, in index order.
    pub fn cells(self) -> impl Iterator<Item = CellCoord> {
        let (x, width) = (self.x, self.width);
        (self.y..self.y + self.height)
            .flat_map(move |row| (x..x + width).map(move |col| CellCoord::new(col, row)))
    }

    pub fn to_raw(self) -> [i32; 4] {
        [
            self.x as i32,
            self.y as i32,
            self.width as i32,
            self.height as i32,
        ]
    }

    /// Decode a persisted `[x, y, width, height]`. Negative values are rejected.
    pub fn from_raw(values: [i32; 4]) -> Option<Self> {
        let [x, y, w, h] = values;
        Some(Self::new(
            usize::try_from(x).ok()?,
            usize::try_from(y).ok()?,
            usize::try_from(w).ok()?,
            usize::try_from(h).ok()?,
        ))
    }
}

/// Inclusive min/max reduction over a set of cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellBounds {
    pub min_col: usize,
    pub min_row: usize,
    pub max_col: usize,
    pub max_row: usize,
}

impl CellBounds {
    pub fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }

    pub fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    pub fn to_rect(self) -> CellRect {
        CellRect::new(self.min_col, self.min_row, self.width(), self.height())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_decode_to_cells() {
        assert_eq!(Cell::from_raw(-1), Cell::Empty);
        assert_eq!(Cell::from_raw(0), Cell::Content(0));
        assert_eq!(Cell::from_raw(7), Cell::Content(7));
        assert_eq!(Cell::from_raw(-2), Cell::MemberOf(0));
        assert_eq!(Cell::from_raw(-7), Cell::MemberOf(5));
    }

    #[test]
    fn every_non_negative_raw_value_is_content() {
        assert_eq!(Cell::from_raw(70_000), Cell::Content(70_000));
        assert_eq!(Cell::from_raw(i32::MAX), Cell::Content(MAX_CONTENT_ID));
        assert_eq!(Cell::Content(70_000).to_raw(), 70_000);
        assert_eq!(Cell::Content(MAX_CONTENT_ID).to_raw(), i32::MAX);
    }

    #[test]
    fn pointer_encoding_matches_raw_scheme() {
        assert_eq!(pointer_to(0), -2);
        assert_eq!(pointer_to(15), -17);
        assert_eq!(Cell::MemberOf(3).to_raw(), -5);
    }

    #[test]
    fn coord_index_conversion() {
        let c = CellCoord::from_index(9);
        assert_eq!(c, CellCoord::new(1, 2));
        assert_eq!(c.index(), 9);
    }

    #[test]
    fn rect_cells_in_index_order() {
        let r = CellRect::new(1, 1, 2, 2);
        let idx: Vec<usize> = r.cells().map(CellCoord::index).collect();
        assert_eq!(idx, vec![5, 6, 9, 10]);
    }

    #[test]
    fn rect_fits_grid() {
        assert!(CellRect::full().fits_grid());
        assert!(!CellRect::new(3, 0, 2, 1).fits_grid());
        assert!(!CellRect::new(0, 0, 0, 1).fits_grid());
    }

    #[test]
    fn negative_raw_rect_rejected() {
        assert_eq!(CellRect::from_raw([0, -1, 2, 2]), None);
        assert_eq!(
            CellRect::from_raw([1, 1, 2, 1]),
            Some(CellRect::new(1, 1, 2, 1))
        );
    }
}
