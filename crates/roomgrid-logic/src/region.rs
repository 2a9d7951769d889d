//! Read-only region queries over a SegmentGrid.
//!
//! Used by the merge engine, by placement generation, and by any view that
//! wants to draw merged regions. All queries are bounded by the fixed 16
//! cells, so plain scans are fine.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellBounds, CellCoord, CellIndex, RootCell};
use crate::constants::CELL_COUNT;
use crate::segment::SegmentGrid;

/// One merged region (a lone cell is a group of one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub root: CellIndex,
    pub content: RootCell,
    /// Member cells in index order, root included.
    pub cells: Vec<CellCoord>,
    pub bounds: CellBounds,
}

impl Group {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when the cells fill their bounding box exactly.
    pub fn is_rectangular(&self) -> bool {
        self.cells.len() == self.bounds.width() * self.bounds.height()
    }
}

/// Resolve the root of the group containing `index`.
///
/// # Panics
///
/// Panics if `index` is out of range, or if the cell points at another
/// merge pointer. Grids built through [`SegmentGrid`]'s API or decoded
/// from the raw shape can never hold such a chain.
pub fn root_of(grid: &SegmentGrid, index: CellIndex) -> CellIndex {
    let cells = grid.cells();
    match cells[index] {
        Cell::MemberOf(parent) => {
            assert!(
                !cells[parent].is_member(),
                "merge pointer chain: cell {} → {} → {:?}",
                index,
                parent,
                cells[parent]
            );
            parent
        }
        _ => index,
    }
}

/// Content of the group containing `index`.
pub fn content_of(grid: &SegmentGrid, index: CellIndex) -> RootCell {
    let root = root_of(grid, index);
    grid.cells()[root].as_root().unwrap_or_default()
}

/// The root's own coordinate plus every cell pointing at `root`.
pub fn cells_in_group(grid: &SegmentGrid, root: CellIndex) -> Vec<CellCoord> {
    grid.cells()
        .iter()
        .enumerate()
        .filter(|&(i, cell)| i == root || *cell == Cell::MemberOf(root))
        .map(|(i, _)| CellCoord::from_index(i))
        .collect()
}

/// Min/max column and row over `cells`. `None` for an empty slice.
pub fn bounding_box(cells: &[CellCoord]) -> Option<CellBounds> {
    let first = cells.first()?;
    let mut bounds = CellBounds {
        min_col: first.col,
        min_row: first.row,
        max_col: first.col,
        max_row: first.row,
    };
    for c in &cells[1..] {
        bounds.min_col = bounds.min_col.min(c.col);
        bounds.min_row = bounds.min_row.min(c.row);
        bounds.max_col = bounds.max_col.max(c.col);
        bounds.max_row = bounds.max_row.max(c.row);
    }
    Some(bounds)
}

/// The full group containing `index`.
pub fn group_of(grid: &SegmentGrid, index: CellIndex) -> Group {
    let root = root_of(grid, index);
    let cells = cells_in_group(grid, root);
    let at = CellCoord::from_index(root);
    // never empty: the root is always part of its own group
    let bounds = bounding_box(&cells).unwrap_or(CellBounds {
        min_col: at.col,
        min_row: at.row,
        max_col: at.col,
        max_row: at.row,
    });
    Group {
        root,
        content: grid.cells()[root].as_root().unwrap_or_default(),
        cells,
        bounds,
    }
}

/// Every group exactly once, ordered by the first cell scanned.
pub fn groups(grid: &SegmentGrid) -> Vec<Group> {
    let mut visited = [false; CELL_COUNT];
    let mut out = Vec::new();
    for index in 0..CELL_COUNT {
        if visited[index] {
            continue;
        }
        let group = group_of(grid, index);
        for c in &group.cells {
            visited[c.index()] = true;
        }
        out.push(group);
    }
    out
}
