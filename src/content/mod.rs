//! Content units: the atomic movable blocks of a page

mod split;

pub use split::split_text;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Stable handle for a content unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(pub u64);

/// An embedded photo block: image plus caption and frame chrome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoBlock {
    /// Image source (data URL or path)
    pub src: String,
    /// Caption text shown under the image
    pub caption: String,
    /// Slight frame rotation in degrees, for the hand-placed look
    pub rotation: f32,
    /// Rendered image height in layout units
    pub height: f32,
}

impl PhotoBlock {
    /// Create a photo block with a fixed rendered height
    pub fn new(src: impl Into<String>, height: f32) -> Self {
        Self {
            src: src.into(),
            caption: String::new(),
            rotation: 0.0,
            height,
        }
    }
}

/// A single block-level content unit.
///
/// A unit is owned by exactly one page at a time; moving it between pages is
/// a handle transfer, never a copy. An empty text unit is an empty line.
/// Text may carry internal `\n` break markers (multi-line paste collapsed
/// into one block); those markers are the preferred split points.
#[derive(Debug, Clone, PartialEq)]
pub enum Unit {
    /// A block of prose (empty string = empty line)
    Text(String),
    /// An embedded photo block
    Photo(PhotoBlock),
}

impl Unit {
    /// Text content, if this is a text unit
    pub fn text(&self) -> Option<&str> {
        match self {
            Unit::Text(s) => Some(s),
            Unit::Photo(_) => None,
        }
    }

    /// Whether this unit is a photo block
    pub fn is_photo(&self) -> bool {
        matches!(self, Unit::Photo(_))
    }

    /// Whether this unit holds no visible content.
    ///
    /// Zero-width characters (such as the caret anchor sentinel) count as
    /// content so a page holding only the caret survives blank-page cleanup.
    pub fn is_blank(&self) -> bool {
        match self {
            Unit::Text(s) => s.trim().is_empty() && !s.contains('\u{FEFF}'),
            Unit::Photo(_) => false,
        }
    }
}

/// Arena owning all units of a document.
///
/// Pages address units by handle; removing a unit from a page does not free
/// it, so a deleted photo can be restored by re-linking its handle.
#[derive(Debug, Default)]
pub struct UnitArena {
    units: FxHashMap<UnitId, Unit>,
    next_id: u64,
}

impl UnitArena {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new unit and return its handle
    pub fn alloc(&mut self, unit: Unit) -> UnitId {
        let id = UnitId(self.next_id);
        self.next_id += 1;
        self.units.insert(id, unit);
        id
    }

    /// Get a unit by handle
    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// Get a unit mutably by handle
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    /// Drop a unit permanently
    pub fn free(&mut self, id: UnitId) -> Option<Unit> {
        self.units.remove(&id)
    }

    /// Number of live units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the arena holds no units
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_get() {
        let mut arena = UnitArena::new();
        let id = arena.alloc(Unit::Text("سلام".to_string()));
        assert_eq!(arena.get(id).and_then(Unit::text), Some("سلام"));
    }

    #[test]
    fn test_handles_are_unique() {
        let mut arena = UnitArena::new();
        let a = arena.alloc(Unit::Text(String::new()));
        let b = arena.alloc(Unit::Text(String::new()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_blank_detection() {
        assert!(Unit::Text("   ".to_string()).is_blank());
        assert!(Unit::Text(String::new()).is_blank());
        assert!(!Unit::Text("متن".to_string()).is_blank());
        assert!(!Unit::Text("\u{FEFF}".to_string()).is_blank());
        assert!(!Unit::Photo(PhotoBlock::new("a.jpg", 100.0)).is_blank());
    }

    #[test]
    fn test_free_removes_unit() {
        let mut arena = UnitArena::new();
        let id = arena.alloc(Unit::Text("x".to_string()));
        assert!(arena.free(id).is_some());
        assert!(arena.get(id).is_none());
        assert!(arena.is_empty());
    }
}
