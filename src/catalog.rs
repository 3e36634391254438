//! Toolbar catalog: the discovered elements a user can spawn.
//!
//! Entries are unique by label text and kept in discovery order. The set only
//! grows; merges add to it, nothing removes from it.

#[cfg(test)]
#[path = "catalog_test.rs"]
mod catalog_test;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::normalize_hex_color;
use crate::geometry::{Footprint, Point, Size};
use crate::registry::TileRegistry;
use crate::tile::Label;

/// A spawnable element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarEntry {
    pub text: String,
    pub color: String,
}

/// Colors are stored in canonical `#rrggbb` form.
impl From<&Label> for ToolbarEntry {
    fn from(label: &Label) -> Self {
        Self { text: label.text.clone(), color: normalize_hex_color(&label.color) }
    }
}

impl ToolbarEntry {
    #[must_use]
    pub fn label(&self) -> Label {
        Label::new(self.text.clone(), self.color.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ToolbarCatalog {
    entries: Vec<ToolbarEntry>,
    selected: Option<String>,
}

impl ToolbarCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with `seeds` (duplicates collapse).
    #[must_use]
    pub fn with_entries(seeds: impl IntoIterator<Item = Label>) -> Self {
        let mut catalog = Self::new();
        for label in seeds {
            catalog.register(&label);
        }
        catalog
    }

    /// Add `label` unless its text is already present. Returns whether it was added.
    pub fn register(&mut self, label: &Label) -> bool {
        if self.contains(&label.text) {
            return false;
        }
        self.entries.push(ToolbarEntry::from(label));
        true
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.text == text)
    }

    #[must_use]
    pub fn get(&self, text: &str) -> Option<&ToolbarEntry> {
        self.entries.iter().find(|e| e.text == text)
    }

    /// Entries in discovery order.
    #[must_use]
    pub fn entries(&self) -> &[ToolbarEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Choose the entry placed by canvas clicks. Unknown text clears the choice.
    pub fn select(&mut self, text: Option<&str>) -> bool {
        self.selected = text.filter(|t| self.contains(t)).map(str::to_string);
        self.selected.is_some()
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ToolbarEntry> {
        self.selected.as_deref().and_then(|text| self.get(text))
    }
}

/// Pick a random center where a tile of `size` fits, trying up to `attempts`
/// candidates. Candidates always keep the whole tile inside the container.
pub fn spawn_position<R: Rng + ?Sized>(
    registry: &TileRegistry,
    size: Size,
    attempts: usize,
    rng: &mut R,
) -> Option<Point> {
    let bounds = registry.bounds();
    let (half_w, half_h) = (size.width / 2.0, size.height / 2.0);
    if size.width > bounds.width || size.height > bounds.height {
        return None;
    }
    (0..attempts)
        .map(|_| {
            Point::new(
                rng.random_range(half_w..=bounds.width - half_w),
                rng.random_range(half_h..=bounds.height - half_h),
            )
        })
        .find(|&candidate| registry.check_placement(Footprint::new(candidate, size), &[]).is_ok())
}
