//! RoomGrid Core - Room Editing Session and Layout Persistence
//!
//! Wraps the pure logic in `roomgrid-logic` with an owning edit session and
//! file formats, so tools and engine integrations share one way of editing,
//! saving and generating a room.
//!
//! # Architecture
//!
//! - **Session**: owns the layout, catalog and placement config; detail
//!   edits work on detached copies and are committed back
//! - **Persistence**: bincode and JSON layout files, JSON catalogs
//!
//! # Example
//!
//! ```rust,no_run
//! use roomgrid_core::prelude::*;
//! use glam::Vec3;
//!
//! let mut session = EditSession::new(
//!     RoomLayout::new(3, 2, Vec3::splat(4.0)),
//!     Catalog::default(),
//!     PlacementConfig::default(),
//! );
//!
//! // Coarse paint one tile, then merge part of a wall
//! session.paint_tile(SegmentRef::floor(0, 0), 0).unwrap();
//! let mut edit = session.open_detail(SegmentRef::horizontal_wall(0, 0)).unwrap();
//! edit.merge(CellRect::new(0, 0, 4, 2)).unwrap();
//! edit.paint(0, 0).unwrap();
//! session.commit_detail(edit).unwrap();
//!
//! for command in session.generate().commands {
//!     println!("{} at {:?}", command.template, command.world_position());
//! }
//! ```

pub mod persistence;
pub mod session;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::persistence::{LayoutFile, SaveError};
    pub use crate::session::{DetailEdit, EditSession, SessionError};
    pub use roomgrid_logic::catalog::{Catalog, CatalogEntry, ContentCatalog, ContentKind};
    pub use roomgrid_logic::cell::{CellRect, ContentId};
    pub use roomgrid_logic::config::PlacementConfig;
    pub use roomgrid_logic::layout::{RoomLayout, SegmentKind, SegmentRef};
    pub use roomgrid_logic::placement::{PlacementCommand, PlacementPlan};
}
