//! Ordered page store
//!
//! Pages form a contiguous, gapless sequence; page 0 always exists and is
//! never removed. Each page owns an ordered list of unit handles, and page
//! numbering is always derived from position so it self-heals after any
//! structural change.

use crate::content::{Unit, UnitArena, UnitId};

/// A single manuscript page
#[derive(Debug, Default)]
pub struct Page {
    /// Ordered unit handles, top to bottom
    pub units: Vec<UnitId>,
    /// Hidden in the current view (set by the display pass)
    pub hidden: bool,
}

impl Page {
    /// Position of a unit on this page
    pub fn position_of(&self, id: UnitId) -> Option<usize> {
        self.units.iter().position(|&u| u == id)
    }

    /// Whether the page holds no visible content
    pub fn is_blank(&self, arena: &UnitArena) -> bool {
        self.units
            .iter()
            .all(|&id| arena.get(id).map_or(true, Unit::is_blank))
    }
}

/// The ordered collection of pages
#[derive(Debug)]
pub struct PageStore {
    pages: Vec<Page>,
}

impl Default for PageStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PageStore {
    /// Create a store with the initial empty page 0
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
        }
    }

    /// Append a new empty page at the end, returning its index
    pub fn append(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Remove a page. Page 0 is never removed.
    pub fn remove(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.pages.len() {
            return false;
        }
        self.pages.remove(index);
        true
    }

    /// Number of pages
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// A page store always holds page 0
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Get a page by index
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Get a page mutably by index
    pub fn page_mut(&mut self, index: usize) -> Option<&mut Page> {
        self.pages.get_mut(index)
    }

    /// Iterate pages in order
    pub fn iter(&self) -> impl Iterator<Item = &Page> {
        self.pages.iter()
    }

    /// Iterate pages mutably in order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Page> {
        self.pages.iter_mut()
    }

    /// Find the page currently holding a unit
    pub fn page_of(&self, id: UnitId) -> Option<usize> {
        self.pages.iter().position(|p| p.units.contains(&id))
    }

    /// Derived page-number label (1-based, Persian digits)
    pub fn page_label(&self, index: usize) -> String {
        to_persian_digits(index + 1)
    }

    /// Labels for all pages, in order
    pub fn page_labels(&self) -> Vec<String> {
        (0..self.pages.len()).map(|i| self.page_label(i)).collect()
    }

    /// All unit handles in reading order: page by page, top to bottom
    pub fn reading_order(&self) -> Vec<UnitId> {
        self.pages.iter().flat_map(|p| p.units.iter().copied()).collect()
    }
}

/// Render a number with Persian (Eastern Arabic) digits
pub fn to_persian_digits(n: usize) -> String {
    const DIGITS: [char; 10] = ['۰', '۱', '۲', '۳', '۴', '۵', '۶', '۷', '۸', '۹'];
    n.to_string()
        .chars()
        .map(|c| match c.to_digit(10) {
            Some(d) => DIGITS[d as usize],
            None => c,
        })
        .collect()
}
