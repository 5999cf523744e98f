//! Caret anchoring across a reflow run
//!
//! The anchor is a zero-width sentinel spliced into the caret's text unit.
//! It travels through relocations and splits as ordinary content, so after
//! the run the caret is recovered wherever its surrounding text ended up.

use crate::content::{Unit, UnitArena};
use crate::editing::Caret;
use crate::page::PageStore;

/// Zero-width no-break space; the measurer gives it no width
pub const ANCHOR_CHAR: char = '\u{FEFF}';

/// Splice the anchor into the caret position. Returns false when the caret
/// does not sit inside a text unit (a photo has focus, or the unit is gone).
pub fn install(arena: &mut UnitArena, caret: &Caret) -> bool {
    match arena.get_mut(caret.unit) {
        Some(Unit::Text(text)) if caret.offset <= text.len() && text.is_char_boundary(caret.offset) => {
            text.insert(caret.offset, ANCHOR_CHAR);
            true
        }
        _ => false,
    }
}

/// Locate the anchor, consume it, and return the caret at its position.
pub fn restore(arena: &mut UnitArena, store: &PageStore) -> Option<Caret> {
    for (page_index, page) in store.iter().enumerate() {
        for &id in &page.units {
            let offset = match arena.get(id) {
                Some(Unit::Text(text)) => text.find(ANCHOR_CHAR),
                _ => None,
            };
            if let Some(offset) = offset {
                if let Some(Unit::Text(text)) = arena.get_mut(id) {
                    text.remove(offset);
                }
                return Some(Caret::new(page_index, id, offset));
            }
        }
    }
    None
}
