//! Caret position and logical document offsets

use crate::content::{Unit, UnitArena, UnitId};
use crate::page::PageStore;

/// Placeholder a photo block contributes to the flat document text
pub const PHOTO_PLACEHOLDER: char = '\u{FFFC}';

/// The edit point: a byte offset inside one unit's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    /// Page the unit sat on when the caret was placed
    pub page: usize,
    /// Unit holding the caret
    pub unit: UnitId,
    /// Byte offset within the unit's text
    pub offset: usize,
}

impl Caret {
    pub fn new(page: usize, unit: UnitId, offset: usize) -> Self {
        Self { page, unit, offset }
    }
}

fn unit_fragment(unit: &Unit) -> String {
    match unit {
        Unit::Text(text) => text.clone(),
        Unit::Photo(_) => PHOTO_PLACEHOLDER.to_string(),
    }
}

/// Flat document text: units in reading order joined by newlines.
///
/// A split consumes one separator and the join re-inserts one, so this text
/// is invariant under reflow; caret-offset stability rests on that.
pub fn document_text(arena: &UnitArena, store: &PageStore) -> String {
    store
        .reading_order()
        .iter()
        .filter_map(|&id| arena.get(id))
        .map(unit_fragment)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Logical byte offset of the caret within `document_text`
pub fn doc_offset(arena: &UnitArena, store: &PageStore, caret: &Caret) -> Option<usize> {
    let mut total = 0;
    for id in store.reading_order() {
        if id == caret.unit {
            return Some(total + caret.offset);
        }
        total += arena.get(id).map(|u| unit_fragment(u).len())? + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PhotoBlock;

    fn doc() -> (UnitArena, PageStore, Vec<UnitId>) {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        let ids = vec![
            arena.alloc(Unit::Text("اول".to_string())),
            arena.alloc(Unit::Text(String::new())),
            arena.alloc(Unit::Text("سوم".to_string())),
        ];
        store.page_mut(0).unwrap().units.extend(&ids);
        (arena, store, ids)
    }

    #[test]
    fn test_document_text_joins_units() {
        let (arena, store, _) = doc();
        assert_eq!(document_text(&arena, &store), "اول\n\nسوم");
    }

    #[test]
    fn test_doc_offset() {
        let (arena, store, ids) = doc();
        // "اول" is 6 bytes; the empty line contributes only its separator
        assert_eq!(doc_offset(&arena, &store, &Caret::new(0, ids[0], 0)), Some(0));
        assert_eq!(doc_offset(&arena, &store, &Caret::new(0, ids[1], 0)), Some(7));
        assert_eq!(doc_offset(&arena, &store, &Caret::new(0, ids[2], 2)), Some(10));
    }

    #[test]
    fn test_doc_offset_spans_pages() {
        let (mut arena, mut store, ids) = doc();
        store.append();
        let moved = store.page_mut(0).unwrap().units.pop().unwrap();
        store.page_mut(1).unwrap().units.push(moved);

        // The flat text and offsets do not change when a unit changes page
        assert_eq!(document_text(&arena, &store), "اول\n\nسوم");
        assert_eq!(doc_offset(&arena, &store, &Caret::new(1, ids[2], 2)), Some(10));

        let photo = arena.alloc(Unit::Photo(PhotoBlock::new("p.jpg", 50.0)));
        store.page_mut(1).unwrap().units.push(photo);
        assert!(document_text(&arena, &store).ends_with(PHOTO_PLACEHOLDER));
    }

    #[test]
    fn test_doc_offset_missing_unit() {
        let (arena, store, _) = doc();
        let ghost = UnitId(999);
        assert_eq!(doc_offset(&arena, &store, &Caret::new(0, ghost, 0)), None);
    }
}
