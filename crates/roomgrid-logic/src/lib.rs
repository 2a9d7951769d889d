//! Pure segment-grid and placement logic for RoomGrid.
//!
//! This crate contains the room data model and all geometry that is
//! independent of any editor, engine, or file format. Functions take plain
//! data and return results, making them unit-testable and portable across
//! the editing session, headless tools, and whatever scene builder consumes
//! the placement commands.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`catalog`] | Content id → template, bounds, native scale (floor/wall/door namespaces) |
//! | [`cell`] | Tagged cell values, cell coordinates and rectangles in 4×4 space |
//! | [`config`] | Placement thicknesses and tile size validation |
//! | [`constants`] | Grid size, raw cell encoding, default thicknesses |
//! | [`coords`] | Row inversion and edit-grid → local/world transforms |
//! | [`layout`] | RoomLayout: floor tiles plus vertical and horizontal wall segments |
//! | [`merge`] | Rectangle merge/unmerge on a SegmentGrid |
//! | [`placement`] | Regions and doors → placement commands |
//! | [`region`] | Root resolution, group membership, bounding boxes |
//! | [`segment`] | SegmentGrid: 16 cells, door cut-out, raw persisted shape |
//! | [`validation`] | Layout checks against a catalog |

pub mod catalog;
pub mod cell;
pub mod config;
pub mod constants;
pub mod coords;
pub mod layout;
pub mod merge;
pub mod placement;
pub mod region;
pub mod segment;
pub mod validation;
