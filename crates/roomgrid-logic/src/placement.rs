//! Placement generation - merged regions and doors → positioned templates.
//!
//! Walks every active SegmentGrid of a [`RoomLayout`] and emits one
//! [`PlacementCommand`] per content group and per wall door. The core never
//! instantiates anything; a scene builder consumes the commands.
//!
//! # Frames
//!
//! Each command is expressed relative to a [`ParentAnchor`], whose position
//! is in world space and whose axes are world-aligned:
//!
//! - **Floor tile**: anchor at the tile centre. Columns run along +X, rows
//!   along −Z (row 0 is the far, +Z edge). Content thickness is along Y.
//! - **Horizontal wall**: anchor at the base centre. Columns run along +X,
//!   rows run down from the top (+Y). Thickness along Z.
//! - **Vertical wall**: same as horizontal, turned 90° about Y, so columns
//!   run along −Z and thickness is along X. The instance carries the same
//!   90° rotation.
//!
//! A region's template is scaled non-uniformly so its bounds exactly cover
//! the region's footprint, then shifted so the scaled bounds centre sits on
//! the region centre. Doors keep their native thickness and sit on the
//! bottom edge of their rectangle instead of being centred.

use std::f32::consts::FRAC_PI_2;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::catalog::{Bounds, CatalogEntry, ContentCatalog, ContentKind};
use crate::cell::{CellRect, ContentId};
use crate::config::PlacementConfig;
use crate::coords::{self, LocalSpan};
use crate::layout::{LayoutError, RoomLayout, SegmentKind, SegmentRef};
use crate::region;
use crate::segment::{Door, SegmentGrid};

/// Where a command is parented: one segment and its world-space origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParentAnchor {
    pub segment: SegmentRef,
    pub position: Vec3,
}

/// One template to instantiate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementCommand {
    pub template: String,
    pub kind: ContentKind,
    pub content: ContentId,
    pub anchor: ParentAnchor,
    /// Region covered, in 4×4 cell space.
    pub cells: CellRect,
    /// World width × height of the region (height is depth on floors).
    pub footprint: Vec2,
    pub local_position: Vec3,
    pub local_rotation: Quat,
    pub local_scale: Vec3,
}

impl PlacementCommand {
    pub fn world_position(&self) -> Vec3 {
        self.anchor.position + self.local_position
    }
}

/// Why a region produced no command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Content id outside the catalog.
    UnknownContent,
    /// Template exists but has no measurable bounds.
    MissingBounds,
}

/// A region that was left out of the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRegion {
    pub segment: SegmentRef,
    pub kind: ContentKind,
    pub content: ContentId,
    pub cells: CellRect,
    pub reason: SkipReason,
}

/// Output of one generation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlacementPlan {
    pub commands: Vec<PlacementCommand>,
    pub skipped: Vec<SkippedRegion>,
}

impl PlacementPlan {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands parented to one segment.
    pub fn for_segment(&self, at: SegmentRef) -> impl Iterator<Item = &PlacementCommand> + '_ {
        self.commands.iter().filter(move |c| c.anchor.segment == at)
    }
}

/// Generate commands for every active segment of `layout`.
///
/// Bad references skip only their own region; the pass always completes.
pub fn generate<C>(layout: &RoomLayout, catalog: &C, config: &PlacementConfig) -> PlacementPlan
where
    C: ContentCatalog + ?Sized,
{
    let mut plan = PlacementPlan::default();
    let mut active = 0usize;
    for (at, grid) in layout.segments() {
        if !grid.is_active() {
            continue;
        }
        active += 1;
        emit_segment(layout, at, grid, catalog, config, &mut plan);
    }
    log::info!(
        "Placement pass over {}×{} room: {} active segments, {} commands, {} skipped",
        layout.width(),
        layout.height(),
        active,
        plan.commands.len(),
        plan.skipped.len()
    );
    plan
}

/// Generate commands for a single segment, e.g. to preview a detail edit.
pub fn generate_segment<C>(
    layout: &RoomLayout,
    at: SegmentRef,
    catalog: &C,
    config: &PlacementConfig,
) -> Result<PlacementPlan, LayoutError>
where
    C: ContentCatalog + ?Sized,
{
    let grid = layout.get(at)?;
    let mut plan = PlacementPlan::default();
    if grid.is_active() {
        emit_segment(layout, at, grid, catalog, config, &mut plan);
    }
    Ok(plan)
}

fn emit_segment<C>(
    layout: &RoomLayout,
    at: SegmentRef,
    grid: &SegmentGrid,
    catalog: &C,
    config: &PlacementConfig,
    plan: &mut PlacementPlan,
) where
    C: ContentCatalog + ?Sized,
{
    let frame = SegmentFrame::new(layout, at);

    if at.kind.is_wall() {
        if let Some(door) = grid.door() {
            match lookup(catalog, ContentKind::Door, door.content) {
                Ok((entry, bounds)) => {
                    plan.commands.push(place_door(&frame, door, entry, bounds))
                }
                Err(reason) => skip(
                    plan,
                    at,
                    ContentKind::Door,
                    door.content,
                    door.resolved_rect(),
                    reason,
                ),
            }
        }
    }

    let kind = at.kind.content_kind();
    for group in region::groups(grid) {
        let Some(content) = group.content.content() else {
            continue;
        };
        let rect = group.bounds.to_rect();
        match lookup(catalog, kind, content) {
            Ok((entry, bounds)) => {
                let command = place_region(&frame, kind, content, rect, entry, bounds, config);
                log::debug!(
                    "{:?} ({}, {}) region {:?} → {} at {:?} scale {:?}",
                    at.kind,
                    at.x,
                    at.y,
                    rect,
                    command.template,
                    command.local_position,
                    command.local_scale
                );
                plan.commands.push(command);
            }
            Err(reason) => skip(plan, at, kind, content, rect, reason),
        }
    }
}

fn lookup<C>(
    catalog: &C,
    kind: ContentKind,
    content: ContentId,
) -> Result<(&CatalogEntry, Bounds), SkipReason>
where
    C: ContentCatalog + ?Sized,
{
    let entry = catalog
        .resolve(kind, content)
        .ok_or(SkipReason::UnknownContent)?;
    let bounds = entry.bounds.ok_or(SkipReason::MissingBounds)?;
    Ok((entry, bounds))
}

fn skip(
    plan: &mut PlacementPlan,
    segment: SegmentRef,
    kind: ContentKind,
    content: ContentId,
    cells: CellRect,
    reason: SkipReason,
) {
    log::warn!(
        "Skipping {:?} content {} on {:?} ({}, {}) cells {:?}: {:?}",
        kind,
        content,
        segment.kind,
        segment.x,
        segment.y,
        cells,
        reason
    );
    plan.skipped.push(SkippedRegion {
        segment,
        kind,
        content,
        cells,
        reason,
    });
}

// ── Geometry ────────────────────────────────────────────────────────────

/// Per-segment axis mapping from (lateral, second, normal) to anchor space.
struct SegmentFrame {
    anchor: ParentAnchor,
    rotation: Quat,
    /// One cell along (columns, rows).
    cell: Vec2,
    /// Whole segment along (columns, rows).
    extent: Vec2,
    floor: bool,
}

impl SegmentFrame {
    fn new(layout: &RoomLayout, at: SegmentRef) -> Self {
        let tile = layout.tile_size();
        let cell = coords::cell_size(tile);
        let rows = layout.height();
        let (position, rotation, cell, extent) = match at.kind {
            SegmentKind::Floor => (
                coords::floor_anchor(at.x, at.y, rows, tile),
                Quat::IDENTITY,
                Vec2::new(cell.x, cell.z),
                Vec2::new(tile.x, tile.z),
            ),
            SegmentKind::VerticalWall => (
                coords::vertical_wall_anchor(at.x, at.y, rows, tile),
                Quat::from_rotation_y(FRAC_PI_2),
                Vec2::new(cell.z, cell.y),
                Vec2::new(tile.z, tile.y),
            ),
            SegmentKind::HorizontalWall => (
                coords::horizontal_wall_anchor(at.x, at.y, rows, tile),
                Quat::IDENTITY,
                Vec2::new(cell.x, cell.y),
                Vec2::new(tile.x, tile.y),
            ),
        };
        Self {
            anchor: ParentAnchor {
                segment: at,
                position,
            },
            rotation,
            cell,
            extent,
            floor: at.kind == SegmentKind::Floor,
        }
    }

    /// Cell rectangle in anchor-relative units. Lateral is always centred;
    /// the second axis is centred on floors and measured from the base on walls.
    fn span(&self, rect: CellRect) -> LocalSpan {
        let span = coords::local_span(rect, self.cell).centered_u(self.extent.x);
        if self.floor {
            span.centered_v(self.extent.y)
        } else {
            span
        }
    }

    fn to_anchor(&self, lateral: f32, second: f32, normal: f32) -> Vec3 {
        if self.floor {
            Vec3::new(lateral, normal, second)
        } else {
            self.rotation * Vec3::new(lateral, second, normal)
        }
    }

    /// Template scale that maps `bounds` onto a `footprint` with the given
    /// world thickness on the remaining axis.
    fn fit_scale(&self, bounds: &Bounds, footprint: Vec2, thickness: f32) -> Vec3 {
        let size = bounds.safe_size();
        if self.floor {
            Vec3::new(
                footprint.x / size.x,
                thickness / size.y,
                footprint.y / size.z,
            )
        } else {
            Vec3::new(
                footprint.x / size.x,
                footprint.y / size.y,
                thickness / size.z,
            )
        }
    }
}

fn place_region(
    frame: &SegmentFrame,
    kind: ContentKind,
    content: ContentId,
    rect: CellRect,
    entry: &CatalogEntry,
    bounds: Bounds,
    config: &PlacementConfig,
) -> PlacementCommand {
    let span = frame.span(rect);
    let footprint = Vec2::new(span.width(), span.height());
    let thickness = if frame.floor {
        config.floor_thickness
    } else {
        config.wall_thickness
    };
    let scale = frame.fit_scale(&bounds, footprint, thickness);
    let center = span.center();
    let desired = frame.to_anchor(center.x, center.y, 0.0);

    PlacementCommand {
        template: entry.template.clone(),
        kind,
        content,
        anchor: frame.anchor,
        cells: rect,
        footprint,
        local_position: desired - frame.rotation * (bounds.center * scale),
        local_rotation: frame.rotation,
        local_scale: scale,
    }
}

fn place_door(
    frame: &SegmentFrame,
    door: Door,
    entry: &CatalogEntry,
    bounds: Bounds,
) -> PlacementCommand {
    let rect = door.resolved_rect();
    let span = frame.span(rect);
    let footprint = Vec2::new(span.width(), span.height());
    let size = bounds.safe_size();
    let scale = Vec3::new(
        footprint.x / size.x,
        footprint.y / size.y,
        entry.native_scale.z,
    );
    // bottom-centre of the template bounds lands on the rect's bottom edge
    let pivot = Vec3::new(bounds.center.x, bounds.min().y, bounds.center.z) * scale;
    let desired = frame.to_anchor(span.center().x, span.v_min, 0.0);

    PlacementCommand {
        template: entry.template.clone(),
        kind: ContentKind::Door,
        content: door.content,
        anchor: frame.anchor,
        cells: rect,
        footprint,
        local_position: desired - frame.rotation * pivot,
        local_rotation: frame.rotation,
        local_scale: scale,
    }
}
