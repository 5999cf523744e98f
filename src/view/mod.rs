//! Visible/hidden page display state: single pages or book spreads

use crate::page::{to_persian_digits, PageStore};
use serde::{Deserialize, Serialize};

/// How pages are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// One page at a time
    Single,
    /// Book spread: even-indexed pairs
    #[default]
    Double,
}

/// Which pages are shown right now
#[derive(Debug, Clone, PartialEq)]
pub struct PageDisplay {
    /// Visibility per page, in page order
    pub visible: Vec<bool>,
    /// A blank right-hand placeholder completes the last spread
    pub trailing_placeholder: bool,
}

/// Navigation state for the open document
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewState {
    pub mode: ViewMode,
    pub current_page_index: usize,
}

impl ViewState {
    /// Keep the index within the page sequence
    pub fn clamp(&mut self, page_count: usize) {
        if page_count == 0 {
            self.current_page_index = 0;
        } else if self.current_page_index >= page_count {
            self.current_page_index = page_count - 1;
        }
    }

    fn spread_start(&self, page_count: usize) -> usize {
        let start = self.current_page_index - self.current_page_index % 2;
        if start >= page_count {
            page_count.saturating_sub(2)
        } else {
            start
        }
    }

    /// Compute visibility for the current mode and index
    pub fn display(&self, page_count: usize) -> PageDisplay {
        let mut visible = vec![false; page_count];
        let mut trailing_placeholder = false;

        match self.mode {
            ViewMode::Single => {
                if let Some(flag) = visible.get_mut(self.current_page_index) {
                    *flag = true;
                }
            }
            ViewMode::Double => {
                let start = self.spread_start(page_count);
                if let Some(flag) = visible.get_mut(start) {
                    *flag = true;
                }
                if start + 1 < page_count {
                    visible[start + 1] = true;
                } else {
                    trailing_placeholder = true;
                }
            }
        }

        PageDisplay {
            visible,
            trailing_placeholder,
        }
    }

    /// Advance by one page or one spread. Returns whether the view moved.
    pub fn next(&mut self, page_count: usize) -> bool {
        let can_advance = match self.mode {
            ViewMode::Single => self.current_page_index + 1 < page_count,
            // A spread may end on a blank right-hand placeholder
            ViewMode::Double => self.current_page_index + 2 <= page_count,
        };
        if !can_advance {
            return false;
        }

        let stride = match self.mode {
            ViewMode::Single => 1,
            ViewMode::Double => 2,
        };
        self.current_page_index = (self.current_page_index + stride).min(page_count - 1);
        true
    }

    /// Go back one page or one spread. Returns whether the view moved.
    pub fn prev(&mut self, _page_count: usize) -> bool {
        if self.current_page_index == 0 {
            return false;
        }
        let stride = match self.mode {
            ViewMode::Single => 1,
            ViewMode::Double => 2,
        };
        self.current_page_index = self.current_page_index.saturating_sub(stride);
        true
    }

    /// Flip between single-page and spread view. Switching to spreads snaps
    /// back to the even page so pairs stay aligned.
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ViewMode::Single => {
                if self.current_page_index % 2 != 0 {
                    self.current_page_index -= 1;
                }
                ViewMode::Double
            }
            ViewMode::Double => ViewMode::Single,
        };
    }

    /// Status-bar label: current page / total, in Persian digits
    pub fn page_info(&self, page_count: usize) -> String {
        format!(
            "{} / {}",
            to_persian_digits(self.current_page_index + 1),
            to_persian_digits(page_count)
        )
    }

    /// Push visibility flags onto the store's pages
    pub fn apply_to(&self, store: &mut PageStore) {
        let display = self.display(store.len());
        for (page, visible) in store.iter_mut().zip(display.visible) {
            page.hidden = !visible;
        }
    }
}
