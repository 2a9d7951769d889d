//! RoomLayout - the coarse grid of floor tiles and wall segments.
//!
//! A room `width × height` tiles wide holds:
//!
//! | Grid | Shape | Runs along |
//! |------|-------|-----------|
//! | floor tiles | `width × height` | - |
//! | vertical walls | `(width + 1) × height` | left/right tile edges |
//! | horizontal walls | `width × (height + 1)` | top/bottom tile edges |
//!
//! Changing `width` or `height` reallocates all three grids. Grids are
//! stored row-major and addressed by [`SegmentRef`].

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ContentKind;
use crate::segment::SegmentGrid;

/// Which of the three grids a segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    Floor,
    VerticalWall,
    HorizontalWall,
}

impl SegmentKind {
    pub const ALL: [SegmentKind; 3] = [
        SegmentKind::Floor,
        SegmentKind::VerticalWall,
        SegmentKind::HorizontalWall,
    ];

    pub fn is_wall(self) -> bool {
        !matches!(self, SegmentKind::Floor)
    }

    /// Catalog namespace for the cells of this segment.
    pub fn content_kind(self) -> ContentKind {
        match self {
            SegmentKind::Floor => ContentKind::Floor,
            SegmentKind::VerticalWall | SegmentKind::HorizontalWall => ContentKind::Wall,
        }
    }

    /// (columns, rows) of this grid for a room of the given size.
    pub fn dims(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            SegmentKind::Floor => (width, height),
            SegmentKind::VerticalWall => (width + 1, height),
            SegmentKind::HorizontalWall => (width, height + 1),
        }
    }
}

/// Address of one SegmentGrid inside a RoomLayout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentRef {
    pub kind: SegmentKind,
    pub x: usize,
    pub y: usize,
}

impl SegmentRef {
    pub fn new(kind: SegmentKind, x: usize, y: usize) -> Self {
        Self { kind, x, y }
    }

    pub fn floor(x: usize, y: usize) -> Self {
        Self::new(SegmentKind::Floor, x, y)
    }

    pub fn vertical_wall(x: usize, y: usize) -> Self {
        Self::new(SegmentKind::VerticalWall, x, y)
    }

    pub fn horizontal_wall(x: usize, y: usize) -> Self {
        Self::new(SegmentKind::HorizontalWall, x, y)
    }
}

/// Full set of segment grids for one room.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomLayout {
    width: usize,
    height: usize,
    tile_size: Vec3,
    floor: Vec<SegmentGrid>,
    vertical_walls: Vec<SegmentGrid>,
    horizontal_walls: Vec<SegmentGrid>,
    /// Bumped on every reallocation so stale handles can be told apart.
    revision: u64,
}

impl RoomLayout {
    pub fn new(width: usize, height: usize, tile_size: Vec3) -> Self {
        let mut layout = Self {
            width,
            height,
            tile_size,
            floor: Vec::new(),
            vertical_walls: Vec::new(),
            horizontal_walls: Vec::new(),
            revision: 0,
        };
        layout.allocate();
        layout
    }

    /// Rebuild a layout from already-decoded grids, checking their shapes.
    pub fn from_parts(
        width: usize,
        height: usize,
        tile_size: Vec3,
        floor: Vec<SegmentGrid>,
        vertical_walls: Vec<SegmentGrid>,
        horizontal_walls: Vec<SegmentGrid>,
    ) -> Result<Self, LayoutError> {
        for (kind, grids) in [
            (SegmentKind::Floor, &floor),
            (SegmentKind::VerticalWall, &vertical_walls),
            (SegmentKind::HorizontalWall, &horizontal_walls),
        ] {
            let (cols, rows) = kind.dims(width, height);
            if grids.len() != cols * rows {
                return Err(LayoutError::ShapeMismatch {
                    kind,
                    expected: cols * rows,
                    found: grids.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            tile_size,
            floor,
            vertical_walls,
            horizontal_walls,
            revision: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile_size(&self) -> Vec3 {
        self.tile_size
    }

    pub fn set_tile_size(&mut self, tile_size: Vec3) {
        self.tile_size = tile_size;
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Same layout, tagged with `revision`. Used when a loaded layout
    /// replaces one that handles may still refer to.
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Change the room size. Every grid is reallocated empty, even when the
    /// size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.allocate();
        self.revision += 1;
        log::info!(
            "Room layout resized to {}×{} (revision {})",
            width,
            height,
            self.revision
        );
    }

    fn allocate(&mut self) {
        let (width, height) = (self.width, self.height);
        let alloc = |kind: SegmentKind| {
            let (cols, rows) = kind.dims(width, height);
            vec![SegmentGrid::new(); cols * rows]
        };
        self.floor = alloc(SegmentKind::Floor);
        self.vertical_walls = alloc(SegmentKind::VerticalWall);
        self.horizontal_walls = alloc(SegmentKind::HorizontalWall);
    }

    /// (columns, rows) of one grid.
    pub fn dims(&self, kind: SegmentKind) -> (usize, usize) {
        kind.dims(self.width, self.height)
    }

    /// All grids of one kind, row-major.
    pub fn grids(&self, kind: SegmentKind) -> &[SegmentGrid] {
        match kind {
            SegmentKind::Floor => &self.floor,
            SegmentKind::VerticalWall => &self.vertical_walls,
            SegmentKind::HorizontalWall => &self.horizontal_walls,
        }
    }

    fn slot(&self, at: SegmentRef) -> Result<usize, LayoutError> {
        let (cols, rows) = self.dims(at.kind);
        if at.x >= cols || at.y >= rows {
            return Err(LayoutError::OutOfBounds(at));
        }
        Ok(at.y * cols + at.x)
    }

    pub fn get(&self, at: SegmentRef) -> Result<&SegmentGrid, LayoutError> {
        let slot = self.slot(at)?;
        Ok(&self.grids(at.kind)[slot])
    }

    pub fn get_mut(&mut self, at: SegmentRef) -> Result<&mut SegmentGrid, LayoutError> {
        let slot = self.slot(at)?;
        let grids = match at.kind {
            SegmentKind::Floor => &mut self.floor,
            SegmentKind::VerticalWall => &mut self.vertical_walls,
            SegmentKind::HorizontalWall => &mut self.horizontal_walls,
        };
        Ok(&mut grids[slot])
    }

    /// Overwrite one grid.
    pub fn replace(&mut self, at: SegmentRef, grid: SegmentGrid) -> Result<(), LayoutError> {
        *self.get_mut(at)? = grid;
        Ok(())
    }

    /// Every grid with its address: floor tiles, then vertical walls, then
    /// horizontal walls, each row-major.
    pub fn segments(&self) -> impl Iterator<Item = (SegmentRef, &SegmentGrid)> + '_ {
        SegmentKind::ALL.into_iter().flat_map(move |kind| {
            let (cols, _) = self.dims(kind);
            self.grids(kind).iter().enumerate().map(move |(i, grid)| {
                let at = SegmentRef::new(kind, i % cols.max(1), i / cols.max(1));
                (at, grid)
            })
        })
    }

    /// Number of grids that would produce placements.
    pub fn active_count(&self) -> usize {
        self.segments().filter(|(_, g)| g.is_active()).count()
    }
}

/// Errors from addressing or assembling a RoomLayout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Reference outside the grid of its kind.
    OutOfBounds(SegmentRef),
    /// Grid list length does not match the room size.
    ShapeMismatch {
        kind: SegmentKind,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::OutOfBounds(at) => {
                write!(f, "{:?} ({}, {}) is outside the room", at.kind, at.x, at.y)
            }
            LayoutError::ShapeMismatch {
                kind,
                expected,
                found,
            } => write!(
                f,
                "{:?} grid has {} segments, expected {}",
                kind, found, expected
            ),
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(w: usize, h: usize) -> RoomLayout {
        RoomLayout::new(w, h, Vec3::splat(4.0))
    }

    #[test]
    fn grid_shapes_follow_room_size() {
        let l = layout(3, 2);
        assert_eq!(l.grids(SegmentKind::Floor).len(), 6);
        assert_eq!(l.grids(SegmentKind::VerticalWall).len(), 8);
        assert_eq!(l.grids(SegmentKind::HorizontalWall).len(), 9);
    }

    #[test]
    fn resize_reallocates_everything() {
        let mut l = layout(2, 2);
        l.get_mut(SegmentRef::floor(1, 1)).unwrap().fill_all(Some(1));
        assert_eq!(l.active_count(), 1);

        l.resize(4, 1);
        assert_eq!(l.revision(), 1);
        assert_eq!(l.grids(SegmentKind::Floor).len(), 4);
        assert_eq!(l.grids(SegmentKind::VerticalWall).len(), 5);
        assert_eq!(l.grids(SegmentKind::HorizontalWall).len(), 8);
        assert_eq!(l.active_count(), 0);
    }

    #[test]
    fn with_revision_keeps_grids() {
        let mut l = layout(2, 1);
        l.get_mut(SegmentRef::vertical_wall(2, 0)).unwrap().fill_all(Some(3));
        let tagged = l.clone().with_revision(7);
        assert_eq!(tagged.revision(), 7);
        assert_eq!(tagged.active_count(), 1);
        assert_eq!(tagged.grids(SegmentKind::VerticalWall), l.grids(SegmentKind::VerticalWall));
    }

    #[test]
    fn out_of_bounds_ref_rejected() {
        let l = layout(2, 2);
        assert!(l.get(SegmentRef::floor(2, 0)).is_err());
        // vertical walls have one extra column
        assert!(l.get(SegmentRef::vertical_wall(2, 1)).is_ok());
        assert!(l.get(SegmentRef::vertical_wall(2, 2)).is_err());
        // horizontal walls have one extra row
        assert!(l.get(SegmentRef::horizontal_wall(1, 2)).is_ok());
    }

    #[test]
    fn segments_enumerates_addresses() {
        let l = layout(2, 1);
        let refs: Vec<SegmentRef> = l.segments().map(|(r, _)| r).collect();
        assert_eq!(refs.len(), 2 + 3 + 4);
        assert_eq!(refs[0], SegmentRef::floor(0, 0));
        assert_eq!(refs[1], SegmentRef::floor(1, 0));
        assert_eq!(refs[2], SegmentRef::vertical_wall(0, 0));
        assert_eq!(refs[4], SegmentRef::vertical_wall(2, 0));
        assert_eq!(refs[5], SegmentRef::horizontal_wall(0, 0));
        assert_eq!(refs[8], SegmentRef::horizontal_wall(1, 1));
    }

    #[test]
    fn from_parts_checks_shape() {
        let err = RoomLayout::from_parts(
            2,
            2,
            Vec3::ONE,
            vec![SegmentGrid::new(); 4],
            vec![SegmentGrid::new(); 5],
            vec![SegmentGrid::new(); 6],
        )
        .unwrap_err();
        assert_eq!(
            err,
            LayoutError::ShapeMismatch {
                kind: SegmentKind::VerticalWall,
                expected: 6,
                found: 5
            }
        );
    }
}
