//! Save/Load functionality for room layouts
//!
//! Uses bincode for compact binary files and serde_json for hand-editable
//! interchange. Each SegmentGrid goes through its raw integer shape, so a
//! file holding a malformed merge pointer is rejected on load rather than
//! reaching the region queries.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use roomgrid_logic::catalog::Catalog;
use roomgrid_logic::layout::{LayoutError, RoomLayout, SegmentKind};
use roomgrid_logic::segment::SegmentGrid;

/// Version number for layout file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a room layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFile {
    /// Layout format version
    pub version: u32,
    /// Room width in tiles
    pub width: usize,
    /// Room height in tiles
    pub height: usize,
    /// World size of one tile
    pub tile_size: Vec3,
    /// Floor tiles, row-major, `width × height`
    pub floor: Vec<SegmentGrid>,
    /// Vertical walls, row-major, `(width + 1) × height`
    pub vertical_walls: Vec<SegmentGrid>,
    /// Horizontal walls, row-major, `width × (height + 1)`
    pub horizontal_walls: Vec<SegmentGrid>,
}

impl From<&RoomLayout> for LayoutFile {
    fn from(layout: &RoomLayout) -> Self {
        Self {
            version: SAVE_VERSION,
            width: layout.width(),
            height: layout.height(),
            tile_size: layout.tile_size(),
            floor: layout.grids(SegmentKind::Floor).to_vec(),
            vertical_walls: layout.grids(SegmentKind::VerticalWall).to_vec(),
            horizontal_walls: layout.grids(SegmentKind::HorizontalWall).to_vec(),
        }
    }
}

impl LayoutFile {
    /// Check the version and grid shapes, then rebuild the layout.
    pub fn into_layout(self) -> Result<RoomLayout, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        let layout = RoomLayout::from_parts(
            self.width,
            self.height,
            self.tile_size,
            self.floor,
            self.vertical_walls,
            self.horizontal_walls,
        )?;
        Ok(layout)
    }
}

/// Save a layout to a writer in binary form
pub fn save_layout<W: Write>(writer: W, layout: &RoomLayout) -> Result<(), SaveError> {
    bincode::serialize_into(writer, &LayoutFile::from(layout))?;
    log::info!(
        "Saved {}×{} layout (version {})",
        layout.width(),
        layout.height(),
        SAVE_VERSION
    );
    Ok(())
}

/// Load a binary layout from a reader
pub fn load_layout<R: Read>(reader: R) -> Result<RoomLayout, SaveError> {
    let file: LayoutFile = bincode::deserialize_from(reader)?;
    let layout = file.into_layout()?;
    log::info!(
        "Loaded {}×{} layout ({} active segments)",
        layout.width(),
        layout.height(),
        layout.active_count()
    );
    Ok(layout)
}

/// Save a layout to a writer as pretty-printed JSON
pub fn save_layout_json<W: Write>(writer: W, layout: &RoomLayout) -> Result<(), SaveError> {
    serde_json::to_writer_pretty(writer, &LayoutFile::from(layout))?;
    Ok(())
}

/// Load a JSON layout from a reader
pub fn load_layout_json<R: Read>(reader: R) -> Result<RoomLayout, SaveError> {
    let file: LayoutFile = serde_json::from_reader(reader)?;
    file.into_layout()
}

/// Load a content catalog from JSON
pub fn load_catalog<R: Read>(reader: R) -> Result<Catalog, SaveError> {
    let catalog: Catalog = serde_json::from_reader(reader)?;
    log::info!(
        "Loaded catalog: {} floors, {} walls, {} doors",
        catalog.floors.len(),
        catalog.walls.len(),
        catalog.doors.len()
    );
    Ok(catalog)
}

/// Errors that can occur during save/load
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    Json(serde_json::Error),
    VersionMismatch { expected: u32, found: u32 },
    Layout(LayoutError),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl From<serde_json::Error> for SaveError {
    fn from(e: serde_json::Error) -> Self {
        SaveError::Json(e)
    }
}

impl From<LayoutError> for SaveError {
    fn from(e: LayoutError) -> Self {
        SaveError::Layout(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::Json(e) => write!(f, "JSON error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Layout version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::Layout(e) => write!(f, "Layout error: {}", e),
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use roomgrid_logic::catalog::{Bounds, CatalogEntry, ContentKind};
    use roomgrid_logic::cell::{CellRect, RootCell};
    use roomgrid_logic::config::PlacementConfig;
    use roomgrid_logic::layout::SegmentRef;
    use roomgrid_logic::merge::merge;
    use roomgrid_logic::placement::{generate, SkipReason};
    use roomgrid_logic::region::content_of;
    use std::fs::File;

    fn sample_layout() -> RoomLayout {
        let mut layout = RoomLayout::new(2, 3, Vec3::new(4.0, 3.0, 4.0));
        layout.get_mut(SegmentRef::floor(1, 2)).unwrap().fill_all(Some(2));
        let wall = layout.get_mut(SegmentRef::vertical_wall(2, 0)).unwrap();
        merge(wall, CellRect::new(0, 1, 4, 3)).unwrap();
        wall.paint(4, 1).unwrap();
        wall.set_door(0, CellRect::new(1, 2, 2, 2)).unwrap();
        layout
    }

    #[test]
    fn test_binary_roundtrip() {
        let layout = sample_layout();
        let mut buffer = Vec::new();
        save_layout(&mut buffer, &layout).expect("Save failed");

        let loaded = load_layout(&buffer[..]).expect("Load failed");
        assert_eq!(loaded, layout);
        let wall = loaded.get(SegmentRef::vertical_wall(2, 0)).unwrap();
        assert_eq!(content_of(wall, 15), RootCell::Content(1));
    }

    #[test]
    fn test_json_roundtrip_through_file() {
        let layout = sample_layout();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("room.json");

        save_layout_json(File::create(&path).unwrap(), &layout).unwrap();
        let loaded = load_layout_json(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded, layout);
    }

    #[test]
    fn test_version_mismatch_rejected() {
        let mut file = LayoutFile::from(&sample_layout());
        file.version = SAVE_VERSION + 1;
        let bytes = bincode::serialize(&file).unwrap();
        match load_layout(&bytes[..]) {
            Err(SaveError::VersionMismatch { expected, found }) => {
                assert_eq!(expected, SAVE_VERSION);
                assert_eq!(found, SAVE_VERSION + 1);
            }
            other => panic!("expected version mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut file = LayoutFile::from(&sample_layout());
        file.horizontal_walls.pop();
        let json = serde_json::to_vec(&file).unwrap();
        assert!(matches!(
            load_layout_json(&json[..]),
            Err(SaveError::Layout(LayoutError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn test_pointer_chain_rejected() {
        let file = LayoutFile::from(&RoomLayout::new(1, 1, Vec3::splat(4.0)));
        let mut json = serde_json::to_value(&file).unwrap();
        // cell 1 → 0, cell 0 → 2
        json["floor"][0]["cells"][1] = (-2).into();
        json["floor"][0]["cells"][0] = (-4).into();
        let text = json.to_string();
        match load_layout_json(text.as_bytes()) {
            Err(SaveError::Json(e)) => assert!(e.to_string().contains("merge pointer")),
            other => panic!("expected decode failure, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_large_content_id_loads_and_skips() {
        let file = LayoutFile::from(&RoomLayout::new(1, 1, Vec3::splat(4.0)));
        let mut json = serde_json::to_value(&file).unwrap();
        json["floor"][0]["cells"][0] = 70_000.into();
        json["floor"][0]["is_detailed"] = true.into();
        let text = json.to_string();
        let layout = load_layout_json(text.as_bytes()).expect("large ids are plain content");

        let floor = layout.get(SegmentRef::floor(0, 0)).unwrap();
        assert_eq!(content_of(floor, 0), RootCell::Content(70_000));

        let mut catalog = Catalog::default();
        catalog.push(
            ContentKind::Floor,
            CatalogEntry::new("plank", Bounds::new(Vec3::ZERO, Vec3::ONE)),
        );
        let plan = generate(&layout, &catalog, &PlacementConfig::default());
        assert!(plan.commands.is_empty());
        assert_eq!(plan.skipped.len(), 1);
        assert_eq!(plan.skipped[0].content, 70_000);
        assert_eq!(plan.skipped[0].reason, SkipReason::UnknownContent);
    }

    #[test]
    fn test_load_catalog() {
        let json = r#"{
            "floors": [ { "template": "plank", "bounds": { "center": [0, 0, 0], "size": [1, 0.1, 1] } } ],
            "doors": [ { "template": "arch", "native_scale": [1, 1, 2] } ]
        }"#;
        let catalog = load_catalog(json.as_bytes()).unwrap();
        assert_eq!(catalog.floors.len(), 1);
        assert!(catalog.floors[0].bounds.is_some());
        assert_eq!(catalog.doors[0].native_scale, Vec3::new(1.0, 1.0, 2.0));
        assert!(catalog.walls.is_empty());
    }
}
