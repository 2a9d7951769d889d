//! SegmentGrid - the 4×4 detail grid of one floor tile or wall segment.
//!
//! Holds 16 cells plus an optional door cut-out. A freshly filled grid is
//! "simple": every cell carries the same value and `is_detailed` is false.
//! Any fine-grained edit (paint, erase, merge, door) flips it to detailed.
//!
//! Every mutator keeps the one-hop rule: a member cell always points at a
//! cell that is not itself a member. Decoding from the raw persisted shape
//! ([`RawSegmentGrid`]) rejects anything that breaks it.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cell::{
    content_to_raw, Cell, CellIndex, CellRect, ContentId, RootCell, MAX_CONTENT_ID,
};
use crate::constants::{raw, CELL_COUNT};
use crate::region;

/// A door cut-out on a wall segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    pub content: ContentId,
    pub rect: CellRect,
}

impl Door {
    /// The door rectangle, or the whole grid when the stored one is degenerate.
    pub fn resolved_rect(&self) -> CellRect {
        if self.rect.is_degenerate() {
            CellRect::full()
        } else {
            self.rect
        }
    }
}

/// Detail grid of one floor tile or wall segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSegmentGrid", into = "RawSegmentGrid")]
pub struct SegmentGrid {
    cells: [Cell; CELL_COUNT],
    is_detailed: bool,
    door_content: Option<ContentId>,
    /// Kept even when no door is set so a round trip through the raw shape
    /// is lossless.
    door_rect: CellRect,
}

impl Default for SegmentGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentGrid {
    /// An empty, simple grid with no door.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; CELL_COUNT],
            is_detailed: false,
            door_content: None,
            door_rect: CellRect::default(),
        }
    }

    /// A simple grid with every cell set to `content`.
    pub fn filled(content: Option<ContentId>) -> Self {
        let mut grid = Self::new();
        grid.fill_all(content);
        grid
    }

    pub fn cells(&self) -> &[Cell; CELL_COUNT] {
        &self.cells
    }

    pub fn cell(&self, index: CellIndex) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn is_detailed(&self) -> bool {
        self.is_detailed
    }

    /// True when a door is set or any cell is not empty.
    pub fn is_active(&self) -> bool {
        self.door_content.is_some() || self.cells.iter().any(|c| *c != Cell::Empty)
    }

    /// Set every cell (not just roots) to `content`, dropping any merge
    /// structure and the door. The grid becomes simple again.
    pub fn fill_all(&mut self, content: Option<ContentId>) {
        let cell = Cell::from(RootCell::from(content));
        self.cells = [cell; CELL_COUNT];
        self.door_content = None;
        self.is_detailed = false;
    }

    /// Content shown by the coarse painting view: the shared value of a
    /// simple grid, `None` once the grid is detailed.
    pub fn coarse_content(&self) -> Option<RootCell> {
        if self.is_detailed {
            return None;
        }
        self.cells[0].as_root()
    }

    /// Place a door. A degenerate `rect` is kept and later resolves to the
    /// full grid; a non-degenerate one must fit inside 4×4.
    pub fn set_door(&mut self, content: ContentId, rect: CellRect) -> Result<(), GridError> {
        check_content(content)?;
        if !rect.is_degenerate() && !rect.fits_grid() {
            return Err(GridError::InvalidDoorRect(rect.to_raw()));
        }
        self.door_content = Some(content);
        self.door_rect = rect;
        self.is_detailed = true;
        Ok(())
    }

    pub fn clear_door(&mut self) {
        self.door_content = None;
    }

    pub fn door(&self) -> Option<Door> {
        self.door_content.map(|content| Door {
            content,
            rect: self.door_rect,
        })
    }

    /// Assign `content` to the group containing `index`.
    pub fn paint(&mut self, index: CellIndex, content: ContentId) -> Result<(), GridError> {
        check_content(content)?;
        self.write_root(index, RootCell::Content(content))
    }

    /// Empty the group containing `index`. Membership is kept.
    pub fn erase(&mut self, index: CellIndex) -> Result<(), GridError> {
        self.write_root(index, RootCell::Empty)
    }

    fn write_root(&mut self, index: CellIndex, value: RootCell) -> Result<(), GridError> {
        if index >= CELL_COUNT {
            return Err(GridError::IndexOutOfRange(index));
        }
        let root = region::root_of(self, index);
        self.cells[root] = value.into();
        self.is_detailed = true;
        Ok(())
    }

    /// Raw write used by the merge engine, which restores the one-hop rule
    /// before returning.
    pub(crate) fn set_cell(&mut self, index: CellIndex, cell: Cell) {
        self.cells[index] = cell;
    }

    pub(crate) fn mark_detailed(&mut self) {
        self.is_detailed = true;
    }

    pub fn to_raw(&self) -> RawSegmentGrid {
        RawSegmentGrid::from(self.clone())
    }
}

fn check_content(content: ContentId) -> Result<(), GridError> {
    if content > MAX_CONTENT_ID {
        return Err(GridError::ContentOutOfRange(content));
    }
    Ok(())
}

// ── Persisted shape ─────────────────────────────────────────────────────

/// Integer form of a SegmentGrid: 16 cells, the detailed flag, the door id
/// (`-1` = none) and the door rectangle as `[x, y, width, height]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSegmentGrid {
    pub cells: [i32; CELL_COUNT],
    pub is_detailed: bool,
    pub door_content_id: i32,
    pub door_rect: [i32; 4],
}

impl From<SegmentGrid> for RawSegmentGrid {
    fn from(grid: SegmentGrid) -> Self {
        Self {
            cells: grid.cells.map(Cell::to_raw),
            is_detailed: grid.is_detailed,
            door_content_id: grid.door_content.map_or(raw::EMPTY, content_to_raw),
            door_rect: grid.door_rect.to_raw(),
        }
    }
}

impl TryFrom<RawSegmentGrid> for SegmentGrid {
    type Error = GridError;

    fn try_from(raw_grid: RawSegmentGrid) -> Result<Self, Self::Error> {
        let mut cells = [Cell::Empty; CELL_COUNT];
        for (index, &value) in raw_grid.cells.iter().enumerate() {
            cells[index] = Cell::from_raw(value);
        }

        for (index, cell) in cells.iter().enumerate() {
            if let Cell::MemberOf(parent) = *cell {
                if parent >= CELL_COUNT {
                    return Err(GridError::PointerOutOfRange { index, parent });
                }
                if cells[parent].is_member() {
                    return Err(GridError::PointerChain { index, parent });
                }
            }
        }

        let door_content = match raw_grid.door_content_id {
            raw::EMPTY => None,
            v if v >= 0 => Some(v as ContentId),
            v => return Err(GridError::InvalidDoor(v)),
        };
        let door_rect = CellRect::from_raw(raw_grid.door_rect)
            .ok_or(GridError::InvalidDoorRect(raw_grid.door_rect))?;
        if door_content.is_some() && !door_rect.is_degenerate() && !door_rect.fits_grid() {
            return Err(GridError::InvalidDoorRect(raw_grid.door_rect));
        }

        Ok(Self {
            cells,
            is_detailed: raw_grid.is_detailed,
            door_content,
            door_rect,
        })
    }
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors raised by grid mutation or by decoding a raw grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Selection is zero-sized or leaves the 4×4 grid.
    InvalidSelection(CellRect),
    /// Cell index past the 16 cells.
    IndexOutOfRange(CellIndex),
    /// Content id past [`MAX_CONTENT_ID`], which has no raw form.
    ContentOutOfRange(ContentId),
    /// Member cell points past the 16 cells.
    PointerOutOfRange { index: CellIndex, parent: CellIndex },
    /// Member cell points at another member (or itself).
    PointerChain { index: CellIndex, parent: CellIndex },
    /// Door id is neither `-1` nor a valid content id.
    InvalidDoor(i32),
    /// Door rectangle is negative or leaves the 4×4 grid.
    InvalidDoorRect([i32; 4]),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::InvalidSelection(r) => write!(
                f,
                "selection ({}, {}, {}×{}) is empty or outside the 4×4 grid",
                r.x, r.y, r.width, r.height
            ),
            GridError::IndexOutOfRange(i) => write!(f, "cell index {} out of range", i),
            GridError::ContentOutOfRange(id) => {
                write!(f, "content id {} does not fit the raw cell encoding", id)
            }
            GridError::PointerOutOfRange { index, parent } => {
                write!(f, "cell {} points at missing cell {}", index, parent)
            }
            GridError::PointerChain { index, parent } => write!(
                f,
                "cell {} points at cell {}, which is itself a merge pointer",
                index, parent
            ),
            GridError::InvalidDoor(v) => write!(f, "invalid door content id {}", v),
            GridError::InvalidDoorRect(r) => write!(f, "invalid door rect {:?}", r),
        }
    }
}

impl std::error::Error for GridError {}
