//! Content catalog - content id → template, local bounds, native scale.
//!
//! Floor, wall and door content live in separate id namespaces. The
//! placement generator only talks to the [`ContentCatalog`] trait, so an
//! engine can back it with its own asset registry; [`Catalog`] is the plain
//! in-memory version loaded from JSON.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::cell::{ContentId, MAX_CONTENT_ID};

/// Which id namespace a content id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Floor,
    Wall,
    Door,
}

/// Axis-aligned bounds in a template's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub center: Vec3,
    pub size: Vec3,
}

impl Bounds {
    pub fn new(center: Vec3, size: Vec3) -> Self {
        Self { center, size }
    }

    pub fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self {
            center: (min + max) * 0.5,
            size: max - min,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.center - self.size * 0.5
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.size * 0.5
    }

    /// Size with zero-extent axes replaced by 1 so it can be divided by.
    pub fn safe_size(&self) -> Vec3 {
        let fix = |v: f32| if v.abs() <= f32::EPSILON { 1.0 } else { v };
        Vec3::new(fix(self.size.x), fix(self.size.y), fix(self.size.z))
    }
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// One instantiable template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Template / prefab identifier handed to the scene builder.
    pub template: String,
    /// `None` when the template has no measurable geometry.
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default = "unit_scale")]
    pub native_scale: Vec3,
}

impl CatalogEntry {
    pub fn new(template: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            template: template.into(),
            bounds: Some(bounds),
            native_scale: Vec3::ONE,
        }
    }
}

/// Lookup used by placement generation. Must return the same bounds for a
/// given id on every call.
pub trait ContentCatalog {
    fn resolve(&self, kind: ContentKind, id: ContentId) -> Option<&CatalogEntry>;
}

/// In-memory catalog with one list per content kind; the id is the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub floors: Vec<CatalogEntry>,
    #[serde(default)]
    pub walls: Vec<CatalogEntry>,
    #[serde(default)]
    pub doors: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn entries(&self, kind: ContentKind) -> &[CatalogEntry] {
        match kind {
            ContentKind::Floor => &self.floors,
            ContentKind::Wall => &self.walls,
            ContentKind::Door => &self.doors,
        }
    }

    /// Append an entry and return its id. Returns `None`, leaving the
    /// catalog unchanged, once the namespace has no ids left.
    pub fn push(&mut self, kind: ContentKind, entry: CatalogEntry) -> Option<ContentId> {
        let list = match kind {
            ContentKind::Floor => &mut self.floors,
            ContentKind::Wall => &mut self.walls,
            ContentKind::Door => &mut self.doors,
        };
        let id = id_for_index(list.len())?;
        list.push(entry);
        Some(id)
    }

    pub fn contains(&self, kind: ContentKind, id: ContentId) -> bool {
        (id as usize) < self.entries(kind).len()
    }
}

/// Content id of the entry at `index`, if it has one.
fn id_for_index(index: usize) -> Option<ContentId> {
    ContentId::try_from(index).ok().filter(|&id| id <= MAX_CONTENT_ID)
}

impl ContentCatalog for Catalog {
    fn resolve(&self, kind: ContentKind, id: ContentId) -> Option<&CatalogEntry> {
        self.entries(kind).get(id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_size_replaces_zero_axes() {
        let b = Bounds::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.5));
        assert_eq!(b.safe_size(), Vec3::new(2.0, 1.0, 0.5));
    }

    #[test]
    fn min_max_round_trip() {
        let b = Bounds::from_min_max(Vec3::new(-1.0, 0.0, -0.1), Vec3::new(1.0, 2.0, 0.1));
        assert_eq!(b.center, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(b.min(), Vec3::new(-1.0, 0.0, -0.1));
        assert_eq!(b.max(), Vec3::new(1.0, 2.0, 0.1));
    }

    #[test]
    fn namespaces_are_separate() {
        let mut catalog = Catalog::default();
        let unit = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let f = catalog.push(ContentKind::Floor, CatalogEntry::new("tile", unit));
        let d = catalog.push(ContentKind::Door, CatalogEntry::new("door", unit));
        assert_eq!(f, Some(0));
        assert_eq!(d, Some(0));
        assert_eq!(
            catalog.push(ContentKind::Floor, CatalogEntry::new("plank", unit)),
            Some(1)
        );
        assert_eq!(catalog.resolve(ContentKind::Floor, 0).unwrap().template, "tile");
        assert_eq!(catalog.resolve(ContentKind::Door, 0).unwrap().template, "door");
        assert!(catalog.resolve(ContentKind::Wall, 0).is_none());
    }

    #[test]
    fn ids_stop_at_raw_limit() {
        let last = MAX_CONTENT_ID as usize;
        assert_eq!(id_for_index(0), Some(0));
        assert_eq!(id_for_index(last), Some(MAX_CONTENT_ID));
        assert_eq!(id_for_index(last + 1), None);
        assert_eq!(id_for_index(usize::MAX), None);
    }

    #[test]
    fn json_defaults_fill_missing_fields() {
        let json = r#"{ "floors": [ { "template": "plank" } ] }"#;
        let catalog: Catalog = serde_json::from_str(json).unwrap();
        let entry = &catalog.floors[0];
        assert_eq!(entry.bounds, None);
        assert_eq!(entry.native_scale, Vec3::ONE);
        assert!(catalog.walls.is_empty());
    }
}
