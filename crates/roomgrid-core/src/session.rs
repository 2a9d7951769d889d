//! Edit session - main entry point for editing and generating a room

use std::io::{Read, Write};

use glam::Vec3;
use roomgrid_logic::catalog::Catalog;
use roomgrid_logic::cell::{CellIndex, CellRect, ContentId, MAX_CONTENT_ID};
use roomgrid_logic::constants::DEFAULT_TILE_SIZE;
use roomgrid_logic::config::{validate_config, ConfigError, PlacementConfig};
use roomgrid_logic::layout::{LayoutError, RoomLayout, SegmentRef};
use roomgrid_logic::merge::{merge, MergeOutcome};
use roomgrid_logic::placement::{generate, generate_segment, PlacementPlan};
use roomgrid_logic::segment::{GridError, SegmentGrid};
use roomgrid_logic::validation::{validate_all, ValidationError};

use crate::persistence::{self, SaveError};

/// Owns one room layout together with the catalog and config it is
/// generated against.
pub struct EditSession {
    layout: RoomLayout,
    catalog: Catalog,
    config: PlacementConfig,
}

impl EditSession {
    /// Create a session over an existing layout
    pub fn new(layout: RoomLayout, catalog: Catalog, config: PlacementConfig) -> Self {
        Self {
            layout,
            catalog,
            config,
        }
    }

    pub fn layout(&self) -> &RoomLayout {
        &self.layout
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    pub fn set_catalog(&mut self, catalog: Catalog) {
        self.catalog = catalog;
    }

    /// Replace the placement config, rejecting invalid thicknesses.
    pub fn set_config(&mut self, config: PlacementConfig) -> Result<(), Vec<ConfigError>> {
        let errors = validate_config(&config);
        if !errors.is_empty() {
            return Err(errors);
        }
        self.config = config;
        Ok(())
    }

    /// Change the room size. All grids are reallocated and every open
    /// [`DetailEdit`] becomes stale.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.layout.resize(width, height);
    }

    // ── Coarse painting ─────────────────────────────────────────────────

    /// Fill a whole segment with one content id (coarse painting).
    pub fn paint_tile(&mut self, at: SegmentRef, content: ContentId) -> Result<(), SessionError> {
        if content > MAX_CONTENT_ID {
            return Err(GridError::ContentOutOfRange(content).into());
        }
        self.layout.get_mut(at)?.fill_all(Some(content));
        Ok(())
    }

    /// Empty a whole segment, dropping its merges and door.
    pub fn clear_tile(&mut self, at: SegmentRef) -> Result<(), SessionError> {
        self.layout.get_mut(at)?.fill_all(None);
        Ok(())
    }

    // ── Detail editing ──────────────────────────────────────────────────

    /// Take a private copy of one segment for detail editing.
    pub fn open_detail(&self, at: SegmentRef) -> Result<DetailEdit, SessionError> {
        let grid = self.layout.get(at)?.clone();
        Ok(DetailEdit {
            at,
            revision: self.layout.revision(),
            grid,
        })
    }

    /// Write a detail edit back. Fails if the layout was reallocated since
    /// the edit was opened.
    pub fn commit_detail(&mut self, edit: DetailEdit) -> Result<(), SessionError> {
        let current = self.layout.revision();
        if edit.revision != current {
            log::warn!(
                "Discarding detail edit of {:?} ({}, {}): opened at revision {}, layout is at {}",
                edit.at.kind,
                edit.at.x,
                edit.at.y,
                edit.revision,
                current
            );
            return Err(SessionError::StaleHandle {
                opened: edit.revision,
                current,
            });
        }
        self.layout.replace(edit.at, edit.grid)?;
        Ok(())
    }

    // ── Generation ──────────────────────────────────────────────────────

    /// Generate placement commands for the whole room.
    pub fn generate(&self) -> PlacementPlan {
        generate(&self.layout, &self.catalog, &self.config)
    }

    /// Generate commands for one segment only.
    pub fn preview(&self, at: SegmentRef) -> Result<PlacementPlan, SessionError> {
        Ok(generate_segment(
            &self.layout,
            at,
            &self.catalog,
            &self.config,
        )?)
    }

    /// Run all layout validations against the current catalog.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_all(&self.layout, &self.catalog)
    }

    // ── Save / Load ─────────────────────────────────────────────────────

    /// Save the layout to a writer
    pub fn save<W: Write>(&self, writer: W) -> Result<(), SaveError> {
        persistence::save_layout(writer, &self.layout)
    }

    /// Load a layout from a reader, replacing the current one.
    ///
    /// The loaded layout takes a revision past the current one, so any
    /// `DetailEdit` opened before the load is stale.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), SaveError> {
        let loaded = persistence::load_layout(reader)?;
        self.layout = loaded.with_revision(self.layout.revision() + 1);
        Ok(())
    }
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(
            RoomLayout::new(1, 1, Vec3::splat(DEFAULT_TILE_SIZE)),
            Catalog::default(),
            PlacementConfig::default(),
        )
    }
}

/// A detached copy of one segment, edited without touching the layout
/// until [`EditSession::commit_detail`].
#[derive(Debug, Clone)]
pub struct DetailEdit {
    at: SegmentRef,
    revision: u64,
    grid: SegmentGrid,
}

impl DetailEdit {
    pub fn segment(&self) -> SegmentRef {
        self.at
    }

    pub fn grid(&self) -> &SegmentGrid {
        &self.grid
    }

    pub fn paint(&mut self, index: CellIndex, content: ContentId) -> Result<(), GridError> {
        self.grid.paint(index, content)
    }

    pub fn erase(&mut self, index: CellIndex) -> Result<(), GridError> {
        self.grid.erase(index)
    }

    pub fn merge(&mut self, selection: CellRect) -> Result<MergeOutcome, GridError> {
        merge(&mut self.grid, selection)
    }

    pub fn set_door(&mut self, content: ContentId, rect: CellRect) -> Result<(), GridError> {
        self.grid.set_door(content, rect)
    }

    pub fn clear_door(&mut self) {
        self.grid.clear_door();
    }
}

/// Errors from session operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The layout was reallocated after the detail edit was opened.
    StaleHandle { opened: u64, current: u64 },
    Layout(LayoutError),
    Grid(GridError),
}

impl From<LayoutError> for SessionError {
    fn from(e: LayoutError) -> Self {
        SessionError::Layout(e)
    }
}

impl From<GridError> for SessionError {
    fn from(e: GridError) -> Self {
        SessionError::Grid(e)
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::StaleHandle { opened, current } => write!(
                f,
                "Detail edit is stale: opened at revision {}, layout is at {}",
                opened, current
            ),
            SessionError::Layout(e) => write!(f, "Layout error: {}", e),
            SessionError::Grid(e) => write!(f, "Grid error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;
    use roomgrid_logic::catalog::{Bounds, CatalogEntry, ContentKind};
    use roomgrid_logic::cell::RootCell;
    use roomgrid_logic::layout::SegmentKind;
    use roomgrid_logic::region::content_of;

    fn session() -> EditSession {
        let unit = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let mut catalog = Catalog::default();
        catalog.push(ContentKind::Floor, CatalogEntry::new("stone", unit));
        catalog.push(ContentKind::Wall, CatalogEntry::new("brick", unit));
        catalog.push(ContentKind::Door, CatalogEntry::new("door", unit));
        EditSession::new(
            RoomLayout::new(2, 2, Vec3::splat(4.0)),
            catalog,
            PlacementConfig::default(),
        )
    }

    #[test]
    fn test_default_session() {
        let session = EditSession::default();
        assert_eq!(session.layout().width(), 1);
        assert_eq!(session.layout().tile_size(), Vec3::splat(4.0));
        assert!(session.generate().is_empty());
    }

    #[test]
    fn test_paint_and_clear_tile() {
        let mut session = session();
        let at = SegmentRef::floor(1, 0);
        session.paint_tile(at, 0).unwrap();
        assert_eq!(session.generate().len(), 16);

        session.clear_tile(at).unwrap();
        assert!(session.generate().is_empty());
        assert!(matches!(
            session.paint_tile(SegmentRef::floor(2, 0), 0),
            Err(SessionError::Layout(LayoutError::OutOfBounds(_)))
        ));
        assert_eq!(
            session.paint_tile(at, MAX_CONTENT_ID + 1),
            Err(SessionError::Grid(GridError::ContentOutOfRange(MAX_CONTENT_ID + 1)))
        );
    }

    #[test]
    fn test_detail_edit_is_isolated_until_commit() {
        let mut session = session();
        let at = SegmentRef::horizontal_wall(0, 2);
        let mut edit = session.open_detail(at).unwrap();
        edit.merge(CellRect::new(0, 0, 4, 4)).unwrap();
        edit.paint(0, 0).unwrap();
        edit.set_door(0, CellRect::new(1, 2, 2, 2)).unwrap();

        assert!(!session.layout().get(at).unwrap().is_active());

        session.commit_detail(edit).unwrap();
        let grid = session.layout().get(at).unwrap();
        assert_eq!(content_of(grid, 15), RootCell::Content(0));
        // slab plus door
        assert_eq!(session.generate().len(), 2);
    }

    #[test]
    fn test_stale_detail_edit_rejected() {
        let mut session = session();
        let mut edit = session.open_detail(SegmentRef::floor(0, 0)).unwrap();
        edit.paint(3, 0).unwrap();

        session.resize(3, 3);
        let err = session.commit_detail(edit).unwrap_err();
        assert_eq!(err, SessionError::StaleHandle { opened: 0, current: 1 });
        assert_eq!(session.layout().active_count(), 0);
    }

    #[test]
    fn test_detail_edit_errors_surface() {
        let session = session();
        let mut edit = session.open_detail(SegmentRef::vertical_wall(2, 1)).unwrap();
        assert_eq!(edit.segment().kind, SegmentKind::VerticalWall);
        assert!(edit.merge(CellRect::new(3, 3, 2, 1)).is_err());
        assert!(edit.paint(16, 0).is_err());
        assert!(session.open_detail(SegmentRef::vertical_wall(3, 0)).is_err());
    }

    #[test]
    fn test_clear_door_on_edit() {
        let mut session = session();
        let at = SegmentRef::vertical_wall(0, 0);
        let mut edit = session.open_detail(at).unwrap();
        edit.set_door(0, CellRect::full()).unwrap();
        edit.clear_door();
        assert_eq!(edit.grid().door(), None);
        session.commit_detail(edit).unwrap();
        assert!(session.preview(at).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut session = session();
        let bad = PlacementConfig {
            wall_thickness: 0.0,
            ..Default::default()
        };
        assert!(session.set_config(bad).is_err());
        assert_eq!(*session.config(), PlacementConfig::default());
    }

    #[test]
    fn test_validate_reports_unknown_content() {
        let mut session = session();
        session.paint_tile(SegmentRef::floor(0, 0), 9).unwrap();
        let errors = session.validate();
        // one finding per singleton group of the filled tile
        assert_eq!(errors.len(), 16);
        assert!(errors.iter().all(|e| e.category == "content_ref"));
    }

    #[test]
    fn test_save_load_roundtrip() {
        let mut session = session();
        session.paint_tile(SegmentRef::floor(1, 1), 0).unwrap();
        let mut buffer = Vec::new();
        session.save(&mut buffer).expect("Save failed");

        let mut loaded = EditSession::new(
            RoomLayout::new(1, 1, Vec3::ONE),
            session.catalog().clone(),
            PlacementConfig::default(),
        );
        loaded.load(&buffer[..]).expect("Load failed");
        for kind in [SegmentKind::Floor, SegmentKind::VerticalWall, SegmentKind::HorizontalWall] {
            assert_eq!(loaded.layout().grids(kind), session.layout().grids(kind));
        }
        assert_eq!(loaded.layout().tile_size(), session.layout().tile_size());
        assert_eq!(loaded.generate(), session.generate());
    }

    fn saved_filled_floor() -> Vec<u8> {
        let mut source = session();
        source.paint_tile(SegmentRef::floor(0, 0), 0).unwrap();
        let mut buffer = Vec::new();
        source.save(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_load_invalidates_open_detail_edit() {
        let buffer = saved_filled_floor();
        let mut session = session();
        let at = SegmentRef::floor(0, 0);
        let mut edit = session.open_detail(at).unwrap();
        edit.erase(0).unwrap();

        session.load(&buffer[..]).unwrap();
        let err = session.commit_detail(edit).unwrap_err();
        assert_eq!(err, SessionError::StaleHandle { opened: 0, current: 1 });
        // the loaded tile is untouched
        assert!(session.layout().get(at).unwrap().is_active());
        assert_eq!(session.generate().len(), 16);
    }

    #[test]
    fn test_load_after_resize_still_moves_revision_forward() {
        let buffer = saved_filled_floor();
        let mut session = session();
        session.resize(2, 2);
        let edit = session.open_detail(SegmentRef::floor(1, 1)).unwrap();

        session.load(&buffer[..]).unwrap();
        assert_eq!(session.layout().revision(), 2);
        assert_eq!(
            session.commit_detail(edit),
            Err(SessionError::StaleHandle { opened: 1, current: 2 })
        );

        // edits opened after the load commit normally
        let mut fresh = session.open_detail(SegmentRef::floor(1, 1)).unwrap();
        fresh.paint(5, 0).unwrap();
        assert!(session.commit_detail(fresh).is_ok());
    }
}
