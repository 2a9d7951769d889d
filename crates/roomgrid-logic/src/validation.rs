//! Layout validation against a content catalog.
//!
//! Pure functions that take a layout (and catalog) and return findings.
//! None of these block generation: anything flagged as an error here is
//! simply skipped by the placement pass. Views use [`invalid_cells`] to draw
//! broken references in an error colour.

use crate::catalog::{ContentCatalog, ContentKind};
use crate::cell::{CellIndex, ContentId};
use crate::config::validate_tile_size;
use crate::layout::{RoomLayout, SegmentRef};
use crate::region;
use crate::segment::SegmentGrid;

/// A layout validation finding.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub segment: Option<SegmentRef>,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn finding(
    category: &'static str,
    severity: Severity,
    segment: Option<SegmentRef>,
    message: String,
) -> ValidationError {
    ValidationError {
        category,
        severity,
        segment,
        message,
    }
}

/// Cells of `grid` whose group content is missing from the catalog.
pub fn invalid_cells<C>(grid: &SegmentGrid, kind: ContentKind, catalog: &C) -> Vec<CellIndex>
where
    C: ContentCatalog + ?Sized,
{
    region::groups(grid)
        .into_iter()
        .filter(|g| {
            g.content
                .content()
                .is_some_and(|id| catalog.resolve(kind, id).is_none())
        })
        .flat_map(|g| g.cells.into_iter().map(|c| c.index()))
        .collect()
}

// ── A. Catalog references ───────────────────────────────────────────────

/// Every content and door id must resolve in the catalog.
pub fn check_content_refs<C>(layout: &RoomLayout, catalog: &C) -> Vec<ValidationError>
where
    C: ContentCatalog + ?Sized,
{
    let mut errors = Vec::new();
    for (at, grid) in layout.segments() {
        let kind = at.kind.content_kind();
        for group in region::groups(grid) {
            if let Some(id) = group.content.content() {
                if catalog.resolve(kind, id).is_none() {
                    errors.push(finding(
                        "content_ref",
                        Severity::Error,
                        Some(at),
                        format!(
                            "{:?} ({}, {}) cell {} references unknown {:?} content {}",
                            at.kind, at.x, at.y, group.root, kind, id
                        ),
                    ));
                }
            }
        }
        if let Some(door) = grid.door() {
            if catalog.resolve(ContentKind::Door, door.content).is_none() {
                errors.push(finding(
                    "content_ref",
                    Severity::Error,
                    Some(at),
                    format!(
                        "{:?} ({}, {}) references unknown door {}",
                        at.kind, at.x, at.y, door.content
                    ),
                ));
            }
        }
    }
    errors
}

/// Referenced templates without bounds are skipped at generation time.
pub fn check_missing_bounds<C>(layout: &RoomLayout, catalog: &C) -> Vec<ValidationError>
where
    C: ContentCatalog + ?Sized,
{
    let mut errors = Vec::new();
    let mut report = |at: SegmentRef, kind: ContentKind, id: ContentId| {
        if let Some(entry) = catalog.resolve(kind, id) {
            if entry.bounds.is_none() {
                errors.push(finding(
                    "content_ref",
                    Severity::Warning,
                    Some(at),
                    format!(
                        "{:?} template '{}' (id {}) has no bounds and will not be placed",
                        kind, entry.template, id
                    ),
                ));
            }
        }
    };
    for (at, grid) in layout.segments() {
        for group in region::groups(grid) {
            if let Some(id) = group.content.content() {
                report(at, at.kind.content_kind(), id);
            }
        }
        if let Some(door) = grid.door() {
            report(at, ContentKind::Door, door.content);
        }
    }
    errors
}

// ── B. Segment structure ────────────────────────────────────────────────

/// Doors only make sense on walls; generation ignores floor doors.
pub fn check_floor_doors(layout: &RoomLayout) -> Vec<ValidationError> {
    layout
        .segments()
        .filter(|(at, grid)| !at.kind.is_wall() && grid.door().is_some())
        .map(|(at, _)| {
            finding(
                "segment_structure",
                Severity::Warning,
                Some(at),
                format!("Floor tile ({}, {}) has a door, which is ignored", at.x, at.y),
            )
        })
        .collect()
}

/// Merge only produces rectangles; anything else came from outside.
pub fn check_group_shapes(layout: &RoomLayout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (at, grid) in layout.segments() {
        for group in region::groups(grid) {
            if !group.is_rectangular() {
                errors.push(finding(
                    "segment_structure",
                    Severity::Warning,
                    Some(at),
                    format!(
                        "{:?} ({}, {}) group rooted at cell {} is not rectangular ({} cells in a {}×{} box)",
                        at.kind,
                        at.x,
                        at.y,
                        group.root,
                        group.len(),
                        group.bounds.width(),
                        group.bounds.height()
                    ),
                ));
            }
        }
    }
    errors
}

/// Tile size must be positive on every axis.
pub fn check_tile_size(layout: &RoomLayout) -> Vec<ValidationError> {
    validate_tile_size(layout.tile_size())
        .into_iter()
        .map(|e| finding("layout", Severity::Error, None, format!("{:?}", e)))
        .collect()
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all layout validations and return combined results.
pub fn validate_all<C>(layout: &RoomLayout, catalog: &C) -> Vec<ValidationError>
where
    C: ContentCatalog + ?Sized,
{
    let mut all = Vec::new();
    all.extend(check_tile_size(layout));
    all.extend(check_content_refs(layout, catalog));
    all.extend(check_missing_bounds(layout, catalog));
    all.extend(check_floor_doors(layout));
    all.extend(check_group_shapes(layout));
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Bounds, Catalog, CatalogEntry};
    use crate::cell::CellRect;
    use crate::merge::merge;
    use crate::segment::RawSegmentGrid;
    use glam::Vec3;

    fn catalog() -> Catalog {
        let unit = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let mut c = Catalog::default();
        c.push(ContentKind::Floor, CatalogEntry::new("stone", unit));
        c.push(ContentKind::Wall, CatalogEntry::new("brick", unit));
        c.push(ContentKind::Door, CatalogEntry::new("door", unit));
        c
    }

    fn layout() -> RoomLayout {
        RoomLayout::new(2, 2, Vec3::splat(4.0))
    }

    #[test]
    fn clean_layout_has_no_findings() {
        let mut l = layout();
        l.get_mut(SegmentRef::floor(0, 0)).unwrap().fill_all(Some(0));
        let wall = l.get_mut(SegmentRef::vertical_wall(0, 0)).unwrap();
        merge(wall, CellRect::new(0, 0, 4, 2)).unwrap();
        wall.paint(0, 0).unwrap();
        wall.set_door(0, CellRect::new(1, 2, 2, 2)).unwrap();
        let errs = validate_all(&l, &catalog());
        assert!(errs.is_empty(), "Expected no findings, got: {:?}", errs);
    }

    #[test]
    fn unknown_content_is_error() {
        let mut l = layout();
        l.get_mut(SegmentRef::floor(1, 0)).unwrap().paint(3, 5).unwrap();
        l.get_mut(SegmentRef::horizontal_wall(0, 2))
            .unwrap()
            .set_door(4, CellRect::full())
            .unwrap();
        let errs = check_content_refs(&l, &catalog());
        assert_eq!(errs.len(), 2);
        assert!(errs.iter().all(|e| e.severity == Severity::Error));
        assert!(errs[0].message.contains("content 5"));
        assert!(errs[1].message.contains("door 4"));
    }

    #[test]
    fn wall_ids_checked_against_wall_namespace() {
        let mut l = layout();
        // floor id 0 exists, but wall 1 does not
        l.get_mut(SegmentRef::vertical_wall(2, 1)).unwrap().paint(0, 1).unwrap();
        let errs = check_content_refs(&l, &catalog());
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].segment, Some(SegmentRef::vertical_wall(2, 1)));
    }

    #[test]
    fn invalid_cells_cover_whole_group() {
        let mut grid = SegmentGrid::new();
        merge(&mut grid, CellRect::new(2, 2, 2, 2)).unwrap();
        grid.paint(10, 9).unwrap();
        grid.paint(0, 0).unwrap();
        let bad = invalid_cells(&grid, ContentKind::Floor, &catalog());
        assert_eq!(bad, vec![10, 11, 14, 15]);
    }

    #[test]
    fn missing_bounds_is_warning() {
        let mut c = catalog();
        c.floors[0].bounds = None;
        let mut l = layout();
        l.get_mut(SegmentRef::floor(0, 1)).unwrap().paint(0, 0).unwrap();
        let errs = check_missing_bounds(&l, &c);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].severity, Severity::Warning);
        assert!(errs[0].message.contains("stone"));
    }

    #[test]
    fn floor_door_flagged() {
        let mut l = layout();
        l.get_mut(SegmentRef::floor(1, 1))
            .unwrap()
            .set_door(0, CellRect::full())
            .unwrap();
        let errs = check_floor_doors(&l);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("(1, 1)"));
    }

    #[test]
    fn non_rectangular_group_flagged() {
        // L-shaped group only reachable through the raw shape
        let mut raw = RawSegmentGrid::from(SegmentGrid::new());
        raw.cells[1] = -2;
        raw.cells[4] = -2;
        let grid = SegmentGrid::try_from(raw).unwrap();
        let mut l = layout();
        l.replace(SegmentRef::floor(0, 0), grid).unwrap();
        let errs = check_group_shapes(&l);
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("3 cells in a 2×2 box"));
    }

    #[test]
    fn bad_tile_size_flagged() {
        let mut l = layout();
        l.set_tile_size(Vec3::new(4.0, -1.0, 4.0));
        assert_eq!(check_tile_size(&l).len(), 1);
    }
}
