//! Edit-grid → local/world coordinate transforms.
//!
//! The edit grids (both the 4×4 detail grid and the room's tile grid) put
//! row 0 at the top. In world space that row is the far edge (+Z for floors)
//! or the top of the wall (+Y), so every conversion flips rows here and
//! nowhere else.

use glam::{Vec2, Vec3};

use crate::cell::CellRect;
use crate::constants::SEGMENTS_PER_SIDE;

/// Flip a cell row so 0 is the bottom (near) row.
pub fn invert_row(row: usize, rows: usize) -> usize {
    rows - 1 - row
}

/// Flip a boundary line between rows (`0..=rows`) so 0 is the bottom edge.
pub fn invert_edge(line: usize, rows: usize) -> usize {
    rows - line
}

/// A cell rectangle measured in world units inside one segment, `u` along
/// columns and `v` up from the bottom row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSpan {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl LocalSpan {
    pub fn width(&self) -> f32 {
        self.u_max - self.u_min
    }

    pub fn height(&self) -> f32 {
        self.v_max - self.v_min
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.u_min + self.u_max) * 0.5,
            (self.v_min + self.v_max) * 0.5,
        )
    }

    /// Shift so the segment's centre column sits at `u = 0`.
    pub fn centered_u(self, segment_width: f32) -> Self {
        let half = segment_width * 0.5;
        Self {
            u_min: self.u_min - half,
            u_max: self.u_max - half,
            ..self
        }
    }

    /// Shift so the segment's middle row sits at `v = 0`.
    pub fn centered_v(self, segment_height: f32) -> Self {
        let half = segment_height * 0.5;
        Self {
            v_min: self.v_min - half,
            v_max: self.v_max - half,
            ..self
        }
    }
}

/// Convert a rectangle of detail cells to world units. `cell_size` is the
/// size of one cell along (columns, rows).
pub fn local_span(rect: CellRect, cell_size: Vec2) -> LocalSpan {
    let bottom_row = invert_row(rect.y + rect.height - 1, SEGMENTS_PER_SIDE);
    LocalSpan {
        u_min: rect.x as f32 * cell_size.x,
        u_max: (rect.x + rect.width) as f32 * cell_size.x,
        v_min: bottom_row as f32 * cell_size.y,
        v_max: (bottom_row + rect.height) as f32 * cell_size.y,
    }
}

/// Size of one detail cell per axis for a given tile size.
pub fn cell_size(tile_size: Vec3) -> Vec3 {
    tile_size / SEGMENTS_PER_SIDE as f32
}

// ── Room-level anchors ──────────────────────────────────────────────────

/// Centre of floor tile (`x`, `y`) on the ground plane.
pub fn floor_anchor(x: usize, y: usize, rows: usize, tile_size: Vec3) -> Vec3 {
    Vec3::new(
        (x as f32 + 0.5) * tile_size.x,
        0.0,
        (invert_row(y, rows) as f32 + 0.5) * tile_size.z,
    )
}

/// Base centre of the vertical wall on the left edge of tile column `x`,
/// tile row `y`.
pub fn vertical_wall_anchor(x: usize, y: usize, rows: usize, tile_size: Vec3) -> Vec3 {
    Vec3::new(
        x as f32 * tile_size.x,
        0.0,
        (invert_row(y, rows) as f32 + 0.5) * tile_size.z,
    )
}

/// Base centre of the horizontal wall on the far edge of tile row `y`
/// (`y == rows` is the near edge of the last row).
pub fn horizontal_wall_anchor(x: usize, y: usize, rows: usize, tile_size: Vec3) -> Vec3 {
    Vec3::new(
        (x as f32 + 0.5) * tile_size.x,
        0.0,
        invert_edge(y, rows) as f32 * tile_size.z,
    )
}
