//! Merge / unmerge of rectangular selections on a SegmentGrid.
//!
//! Selecting exactly an existing multi-cell group splits it back into empty
//! singletons. Any other selection becomes a new group rooted at its
//! top-left cell, and every group it touches, even partially, is wiped
//! first. Content never survives a merge; the new group starts empty and is
//! painted afterwards.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellCoord, CellIndex, CellRect};
use crate::region::{cells_in_group, root_of};
use crate::segment::{GridError, SegmentGrid};

/// What a call to [`merge`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// The selection became one group rooted at `root`.
    Merged { root: CellIndex },
    /// The selection matched an existing group, which was split into
    /// `released` empty cells.
    Unmerged { released: usize },
}

/// Merge (or unmerge) `selection`, which must be non-empty and inside 4×4.
pub fn merge(grid: &mut SegmentGrid, selection: CellRect) -> Result<MergeOutcome, GridError> {
    if !selection.fits_grid() {
        return Err(GridError::InvalidSelection(selection));
    }

    let selected: BTreeSet<CellIndex> = selection.cells().map(CellCoord::index).collect();
    let anchor = selection.top_left().index();

    let existing = cells_in_group(grid, root_of(grid, anchor));
    if existing.len() > 1 && existing.iter().map(|c| c.index()).eq(selected.iter().copied()) {
        for c in &existing {
            grid.set_cell(c.index(), Cell::Empty);
        }
        grid.mark_detailed();
        log::debug!("unmerged {} cells at {:?}", existing.len(), selection);
        return Ok(MergeOutcome::Unmerged {
            released: existing.len(),
        });
    }

    // Collect every touched root before clearing anything, otherwise a
    // member whose root was already wiped would resolve to itself.
    let touched: BTreeSet<CellIndex> = selected.iter().map(|&i| root_of(grid, i)).collect();
    for root in touched {
        for c in cells_in_group(grid, root) {
            grid.set_cell(c.index(), Cell::Empty);
        }
    }

    for &index in &selected {
        if index != anchor {
            grid.set_cell(index, Cell::MemberOf(anchor));
        }
    }
    grid.mark_detailed();
    log::debug!("merged {:?} into root {}", selection, anchor);
    Ok(MergeOutcome::Merged { root: anchor })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::RootCell;
    use crate::constants::CELL_COUNT;
    use crate::region::{content_of, groups};

    #[test]
    fn merge_two_by_two_on_empty_grid() {
        let mut grid = SegmentGrid::new();
        let outcome = merge(&mut grid, CellRect::new(0, 0, 2, 2)).unwrap();
        assert_eq!(outcome, MergeOutcome::Merged { root: 0 });

        let raw = grid.to_raw().cells;
        assert_eq!(raw[0], -1);
        assert_eq!(raw[1], -2);
        assert_eq!(raw[4], -2);
        assert_eq!(raw[5], -2);
        for (i, v) in raw.iter().enumerate() {
            if ![0, 1, 4, 5].contains(&i) {
                assert_eq!(*v, -1, "cell {} should stay empty", i);
            }
        }
        assert!(grid.is_detailed());
    }

    #[test]
    fn selecting_same_group_unmerges() {
        let mut grid = SegmentGrid::new();
        let rect = CellRect::new(1, 0, 3, 2);
        merge(&mut grid, rect).unwrap();
        grid.paint(1, 6).unwrap();

        let outcome = merge(&mut grid, rect).unwrap();
        assert_eq!(outcome, MergeOutcome::Unmerged { released: 6 });
        assert!(grid.cells().iter().all(|c| *c == Cell::Empty));
        assert_eq!(groups(&grid).len(), CELL_COUNT);
    }

    #[test]
    fn merge_clears_prior_content() {
        let mut grid = SegmentGrid::filled(Some(4));
        merge(&mut grid, CellRect::new(0, 0, 2, 1)).unwrap();
        assert_eq!(content_of(&grid, 0), RootCell::Empty);
        assert_eq!(content_of(&grid, 1), RootCell::Empty);
        // untouched cells keep their fill
        assert_eq!(content_of(&grid, 2), RootCell::Content(4));
    }

    #[test]
    fn partial_overlap_destroys_whole_group() {
        let mut grid = SegmentGrid::new();
        merge(&mut grid, CellRect::new(0, 0, 2, 2)).unwrap();
        grid.paint(0, 7).unwrap();

        // overlaps only the right column of the 2×2 group
        merge(&mut grid, CellRect::new(1, 0, 2, 1)).unwrap();

        // left column of the old group is fully reset
        assert_eq!(grid.cell(0), Some(Cell::Empty));
        assert_eq!(grid.cell(4), Some(Cell::Empty));
        // bottom-right of old group reset, not pointing anywhere
        assert_eq!(grid.cell(5), Some(Cell::Empty));
        // new group
        assert_eq!(grid.cell(1), Some(Cell::Empty));
        assert_eq!(grid.cell(2), Some(Cell::MemberOf(1)));
    }

    #[test]
    fn overlap_with_root_outside_selection() {
        let mut grid = SegmentGrid::new();
        merge(&mut grid, CellRect::new(0, 0, 2, 2)).unwrap();
        // touches only cell 5, a member whose root (0) lies outside
        merge(&mut grid, CellRect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(grid.cell(0), Some(Cell::Empty));
        assert_eq!(grid.cell(1), Some(Cell::Empty));
        assert_eq!(grid.cell(4), Some(Cell::Empty));
        assert_eq!(grid.cell(5), Some(Cell::Empty));
        assert_eq!(grid.cell(6), Some(Cell::MemberOf(5)));
        assert_eq!(grid.cell(10), Some(Cell::MemberOf(5)));
    }

    #[test]
    fn singleton_selection_is_effective_noop() {
        let mut grid = SegmentGrid::new();
        let outcome = merge(&mut grid, CellRect::new(2, 2, 1, 1)).unwrap();
        assert_eq!(outcome, MergeOutcome::Merged { root: 10 });
        assert!(grid.cells().iter().all(|c| *c == Cell::Empty));
    }

    #[test]
    fn merge_twice_keeps_membership() {
        let mut grid = SegmentGrid::new();
        let rect = CellRect::new(0, 1, 2, 3);
        merge(&mut grid, rect).unwrap();
        let first = groups(&grid);
        grid.paint(4, 2).unwrap();

        // a different selection that starts inside the group merges again
        merge(&mut grid, CellRect::new(0, 1, 2, 2)).unwrap();
        merge(&mut grid, rect).unwrap();
        assert_eq!(groups(&grid), first);
        assert_eq!(content_of(&grid, 4), RootCell::Empty);
    }

    #[test]
    fn invalid_selection_rejected() {
        let mut grid = SegmentGrid::new();
        assert!(merge(&mut grid, CellRect::new(0, 0, 0, 2)).is_err());
        assert!(merge(&mut grid, CellRect::new(3, 3, 2, 1)).is_err());
        assert!(!grid.is_detailed());
    }
}
