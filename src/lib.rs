//! Daftar: a paginated Persian manuscript editor core
//!
//! The crate models a book as pages of movable content units and keeps the
//! pagination stable automatically:
//! - Convergence-seeking reflow (tail units relocate forward until every
//!   page fits, with a split fallback for oversized prose)
//! - Caret preservation across relocation via a zero-width text anchor
//! - Debounced trigger policy over a deterministic timer queue
//! - Snapshot persistence with a named project registry

pub mod content;
pub mod editing;
pub mod layout;
pub mod page;
pub mod project;
pub mod reflow;
pub mod view;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmEditor;

// Re-export primary types
pub use content::{PhotoBlock, Unit, UnitArena, UnitId};
pub use editing::{doc_offset, document_text, Caret, EditEvent, TimerQueue, TimerTask};
pub use layout::{Measure, Measurement, PageMetrics, TextMeasurer};
pub use page::{to_persian_digits, Page, PageStore};
pub use project::{ProjectRegistry, ProjectSnapshot, StyleSettings};
pub use reflow::{ReflowConfig, ReflowEngine, ReflowOutcome, ReflowReport};
pub use view::{ViewMode, ViewState};

use editing::apply_event;

/// Receipt for a removed photo, enough to restore it in place
#[derive(Debug, Clone, Copy)]
struct DeletedPhoto {
    unit: UnitId,
    page: usize,
    /// Unit that followed the photo; restoring inserts before it
    successor: Option<UnitId>,
}

/// What one call to [`Editor::advance_to`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Reflow runs executed
    pub reflows: usize,
    /// The auto-save timer fired; the host should persist a snapshot
    pub autosave_due: bool,
}

/// The main editor state combining all components
pub struct Editor {
    pub arena: UnitArena,
    pub pages: PageStore,
    pub metrics: PageMetrics,
    pub engine: ReflowEngine,
    pub view: ViewState,
    pub style: StyleSettings,
    measurer: Box<dyn Measure>,
    timers: TimerQueue,
    caret: Option<Caret>,
    last_deleted: Option<DeletedPhoto>,
}

impl Editor {
    /// Create an empty editor with the given page geometry
    pub fn new(metrics: PageMetrics) -> Self {
        Self {
            arena: UnitArena::new(),
            pages: PageStore::new(),
            metrics,
            engine: ReflowEngine::default(),
            view: ViewState::default(),
            style: StyleSettings::default(),
            measurer: Box::new(TextMeasurer::default()),
            timers: TimerQueue::new(),
            caret: None,
            last_deleted: None,
        }
    }

    /// Create an editor with initial text content, one unit per line
    pub fn with_text(text: &str, metrics: PageMetrics) -> Self {
        let mut editor = Self::new(metrics);
        editor.load_lines(text);
        editor
    }

    /// Substitute the measurement backend (tests, alternate renderers)
    pub fn set_measurer(&mut self, measurer: Box<dyn Measure>) {
        self.measurer = measurer;
    }

    /// Current caret, if any
    pub fn caret(&self) -> Option<Caret> {
        self.caret
    }

    /// Place the caret; the unit must exist in the document
    pub fn set_caret(&mut self, caret: Caret) -> bool {
        let valid = self
            .arena
            .get(caret.unit)
            .and_then(Unit::text)
            .map(|text| caret.offset <= text.len() && text.is_char_boundary(caret.offset))
            .unwrap_or(false);
        if valid {
            self.caret = Some(caret);
        }
        valid
    }

    fn load_lines(&mut self, text: &str) {
        for line in text.split('\n') {
            let id = self.arena.alloc(Unit::Text(line.to_string()));
            if let Some(page) = self.pages.page_mut(0) {
                page.units.push(id);
            }
        }
    }

    /// Insert text at the caret, or append a new line to the current page.
    ///
    /// Multi-line input stays one unit with internal break markers, exactly
    /// how a paste lands; the reflow split pass takes it apart when needed.
    pub fn insert_text(&mut self, text: &str, now: u64) {
        match self.caret {
            Some(caret) => {
                if let Some(Unit::Text(content)) = self.arena.get_mut(caret.unit) {
                    content.insert_str(caret.offset, text);
                    self.caret = Some(Caret::new(caret.page, caret.unit, caret.offset + text.len()));
                }
            }
            None => {
                let page_index = self.view.current_page_index.min(self.pages.len() - 1);
                let id = self.arena.alloc(Unit::Text(text.to_string()));
                if let Some(page) = self.pages.page_mut(page_index) {
                    page.units.push(id);
                }
                self.caret = Some(Caret::new(page_index, id, text.len()));
            }
        }

        let event = if text.contains('\n') {
            EditEvent::Paste
        } else {
            EditEvent::Keystroke {
                page: self.caret.map(|c| c.page).unwrap_or(0),
            }
        };
        self.notify(event, now);
    }

    /// Insert a photo block after the caret's unit (or at the end of the
    /// current page), with an empty line after it to type into
    pub fn insert_photo(&mut self, photo: PhotoBlock, now: u64) -> UnitId {
        let (page_index, insert_at) = match self.caret {
            Some(caret) => {
                let page_index = self.pages.page_of(caret.unit).unwrap_or(0);
                let position = self
                    .pages
                    .page(page_index)
                    .and_then(|p| p.position_of(caret.unit))
                    .map(|p| p + 1);
                (page_index, position)
            }
            None => (self.view.current_page_index.min(self.pages.len() - 1), None),
        };

        let photo_id = self.arena.alloc(Unit::Photo(photo));
        let spacer = self.arena.alloc(Unit::Text(String::new()));
        if let Some(page) = self.pages.page_mut(page_index) {
            let at = insert_at.unwrap_or(page.units.len()).min(page.units.len());
            page.units.insert(at, photo_id);
            page.units.insert(at + 1, spacer);
        }
        self.caret = Some(Caret::new(page_index, spacer, 0));

        self.notify(EditEvent::PhotoInserted, now);
        photo_id
    }

    fn shift_unit(&mut self, id: UnitId, delta: isize) -> bool {
        let Some(page_index) = self.pages.page_of(id) else {
            return false;
        };
        let Some(page) = self.pages.page_mut(page_index) else {
            return false;
        };
        let Some(position) = page.position_of(id) else {
            return false;
        };
        let target = position as isize + delta;
        if target < 0 || target as usize >= page.units.len() {
            return false;
        }
        page.units.swap(position, target as usize);
        true
    }

    /// Swap a photo with the unit above it
    pub fn move_photo_up(&mut self, id: UnitId, now: u64) -> bool {
        let moved = self.shift_unit(id, -1);
        if moved {
            self.notify(EditEvent::PhotoMoved, now);
        }
        moved
    }

    /// Swap a photo with the unit below it
    pub fn move_photo_down(&mut self, id: UnitId, now: u64) -> bool {
        let moved = self.shift_unit(id, 1);
        if moved {
            self.notify(EditEvent::PhotoMoved, now);
        }
        moved
    }

    /// Remove a photo, keeping a one-slot receipt for undo
    pub fn delete_photo(&mut self, id: UnitId, now: u64) -> bool {
        if !self.arena.get(id).map(Unit::is_photo).unwrap_or(false) {
            return false;
        }
        let Some(page_index) = self.pages.page_of(id) else {
            return false;
        };
        let Some(page) = self.pages.page_mut(page_index) else {
            return false;
        };
        let Some(position) = page.position_of(id) else {
            return false;
        };
        let successor = page.units.get(position + 1).copied();
        page.units.remove(position);

        // Handle stays alive in the arena until the receipt is replaced
        if let Some(stale) = self.last_deleted.take() {
            self.arena.free(stale.unit);
        }
        self.last_deleted = Some(DeletedPhoto {
            unit: id,
            page: page_index,
            successor,
        });
        self.notify(EditEvent::PhotoDeleted, now);
        true
    }

    /// Restore the most recently deleted photo next to its old neighbor.
    ///
    /// The neighbor may have reflowed to a different page; the photo follows
    /// it there. If the neighbor is gone too, the photo lands at the end of
    /// its original page (clamped to the current page count).
    pub fn undo_photo_delete(&mut self, now: u64) -> Option<UnitId> {
        let receipt = self.last_deleted.take()?;

        let placement = receipt.successor.and_then(|succ| {
            let page_index = self.pages.page_of(succ)?;
            let position = self.pages.page(page_index)?.position_of(succ)?;
            Some((page_index, position))
        });

        match placement {
            Some((page_index, position)) => {
                if let Some(page) = self.pages.page_mut(page_index) {
                    page.units.insert(position, receipt.unit);
                }
            }
            None => {
                let page_index = receipt.page.min(self.pages.len() - 1);
                if let Some(page) = self.pages.page_mut(page_index) {
                    page.units.push(receipt.unit);
                }
            }
        }
        self.notify(EditEvent::PhotoInserted, now);
        Some(receipt.unit)
    }

    /// Replace the whole document from raw text, one unit per line
    pub fn replace_content(&mut self, text: &str, now: u64) {
        for id in self.pages.reading_order() {
            self.arena.free(id);
        }
        // A pending undo receipt holds a detached unit; drop it too
        if let Some(stale) = self.last_deleted.take() {
            self.arena.free(stale.unit);
        }
        while self.pages.len() > 1 {
            let last = self.pages.len() - 1;
            self.pages.remove(last);
        }
        if let Some(page) = self.pages.page_mut(0) {
            page.units.clear();
        }
        self.caret = None;
        self.load_lines(text);
        self.view.current_page_index = 0;
        self.notify(EditEvent::RawReplaced, now);
    }

    /// Append a new page; optionally move the view and caret onto it
    pub fn create_page(&mut self, auto_focus: bool) -> usize {
        let index = self.pages.append();
        if auto_focus {
            let line = self.arena.alloc(Unit::Text(String::new()));
            if let Some(page) = self.pages.page_mut(index) {
                page.units.push(line);
            }
            self.caret = Some(Caret::new(index, line, 0));
            self.view.current_page_index = index;
        }
        self.refresh_view();
        index
    }

    /// Queue the debounce timers for an edit event
    pub fn notify(&mut self, event: EditEvent, now: u64) {
        apply_event(&mut self.timers, &self.engine.config, event, now);
    }

    /// Change page geometry; reflow follows after the resize debounce
    pub fn set_metrics(&mut self, metrics: PageMetrics, now: u64) {
        self.metrics = metrics;
        self.notify(EditEvent::Resized, now);
    }

    /// Run reflow immediately, bypassing the debounce timers
    pub fn trigger_reflow(&mut self) -> ReflowOutcome {
        let outcome = self.engine.run(
            &mut self.arena,
            &mut self.pages,
            self.measurer.as_ref(),
            &self.metrics,
            &mut self.caret,
        );
        if !outcome.is_rejected() {
            // The page holding the caret stays the visible one
            if let Some(caret) = self.caret {
                self.view.current_page_index = caret.page;
            }
            self.refresh_view();
        }
        outcome
    }

    /// Advance the clock, firing due timers
    pub fn advance_to(&mut self, now: u64) -> TickReport {
        let mut report = TickReport::default();
        for task in self.timers.fire_due(now) {
            match task {
                TimerTask::Reflow => {
                    if !self.trigger_reflow().is_rejected() {
                        report.reflows += 1;
                    }
                }
                TimerTask::AutoSave => report.autosave_due = true,
            }
        }
        report
    }

    /// Earliest pending timer deadline, for host scheduling
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_due()
    }

    fn refresh_view(&mut self) {
        self.view.clamp(self.pages.len());
        self.view.apply_to(&mut self.pages);
    }

    /// Move to the next page or spread
    pub fn next_page(&mut self) -> bool {
        let moved = self.view.next(self.pages.len());
        if moved {
            self.refresh_view();
        }
        moved
    }

    /// Move to the previous page or spread
    pub fn prev_page(&mut self) -> bool {
        let moved = self.view.prev(self.pages.len());
        if moved {
            self.refresh_view();
        }
        moved
    }

    /// Switch between single-page and spread view
    pub fn toggle_view(&mut self) {
        self.view.toggle_mode();
        self.refresh_view();
    }

    /// Whether a reflow run is in flight
    pub fn is_paginating(&self) -> bool {
        self.engine.is_paginating()
    }

    /// Flat document text: units in reading order joined by newlines
    pub fn text(&self) -> String {
        document_text(&self.arena, &self.pages)
    }

    /// Caret position as a byte offset into [`Editor::text`]
    pub fn caret_doc_offset(&self) -> Option<usize> {
        let caret = self.caret.as_ref()?;
        doc_offset(&self.arena, &self.pages, caret)
    }

    /// Get total page count
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Persian page-number labels, in order
    pub fn page_labels(&self) -> Vec<String> {
        self.pages.page_labels()
    }

    /// Status label: current page / total, in Persian digits
    pub fn page_info(&self) -> String {
        self.view.page_info(self.pages.len())
    }

    /// Measured state of one page under the current metrics
    pub fn measure_page(&self, index: usize) -> Option<Measurement> {
        if index >= self.pages.len() {
            return None;
        }
        Some(reflow::measure_page(
            &self.arena,
            &self.pages,
            index,
            self.measurer.as_ref(),
            &self.metrics,
        ))
    }

    /// Capture the document for persistence
    pub fn snapshot(&self, now: u64) -> ProjectSnapshot {
        ProjectSnapshot::capture(
            &self.arena,
            &self.pages,
            &self.style,
            self.view.current_page_index,
            self.view.mode,
            now,
        )
    }

    /// Replace the document from a snapshot
    pub fn restore(&mut self, snapshot: &ProjectSnapshot) {
        let (arena, pages) = snapshot.instantiate();
        self.arena = arena;
        self.pages = pages;
        self.style = snapshot.style.clone();
        self.view.mode = snapshot.view_mode;
        self.view.current_page_index = snapshot.current_page_index;
        self.caret = None;
        self.last_deleted = None;
        self.refresh_view();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed extent per text unit, photos by their stored height
    struct FixedMeasurer(f32);

    impl Measure for FixedMeasurer {
        fn unit_extent(&self, unit: &Unit, _metrics: &PageMetrics) -> f32 {
            match unit {
                Unit::Text(_) => self.0,
                Unit::Photo(photo) => photo.height,
            }
        }
    }

    fn metrics_500() -> PageMetrics {
        PageMetrics {
            page_width: 400.0,
            page_height: 500.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
        }
    }

    fn editor_with_lines(n: usize, extent: f32) -> Editor {
        let lines: Vec<String> = (0..n).map(|i| format!("سطر {}", i)).collect();
        let mut editor = Editor::with_text(&lines.join("\n"), metrics_500());
        editor.set_measurer(Box::new(FixedMeasurer(extent)));
        editor
    }

    #[test]
    fn test_create_editor() {
        let editor = Editor::new(PageMetrics::default());
        assert_eq!(editor.page_count(), 1);
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn test_insert_text_without_caret_appends_line() {
        let mut editor = Editor::new(PageMetrics::default());
        editor.insert_text("بسم الله", 0);
        assert_eq!(editor.text(), "بسم الله");
        assert!(editor.caret().is_some());
    }

    #[test]
    fn test_insert_text_at_caret() {
        let mut editor = Editor::with_text("سلام", PageMetrics::default());
        let unit = editor.pages.page(0).unwrap().units[0];
        assert!(editor.set_caret(Caret::new(0, unit, 0)));
        editor.insert_text("ای ", 0);
        assert_eq!(editor.text(), "ای سلام");
        assert_eq!(editor.caret().unwrap().offset, "ای ".len());
    }

    #[test]
    fn test_set_caret_rejects_non_boundary_offset() {
        let mut editor = Editor::with_text("سلام", PageMetrics::default());
        let unit = editor.pages.page(0).unwrap().units[0];
        // Offset 1 lands inside a multi-byte character
        assert!(!editor.set_caret(Caret::new(0, unit, 1)));
        assert!(editor.caret().is_none());
    }

    #[test]
    fn test_reflow_spreads_overflow() {
        let mut editor = editor_with_lines(8, 150.0);
        let report = *editor.trigger_reflow().report().unwrap();
        assert!(report.converged);
        // 8 * 150 = 1200 over a 500 capacity: pages hold up to 3 each
        assert_eq!(editor.page_count(), 3);
        for i in 0..editor.page_count() {
            assert!(!editor
                .measure_page(i)
                .unwrap()
                .is_overflowing(editor.engine.config.tolerance));
        }
    }

    #[test]
    fn test_photo_delete_undo_reflow_round_trip() {
        let mut editor = editor_with_lines(6, 150.0);
        let photo = editor.arena.alloc(Unit::Photo(PhotoBlock::new("qajar.jpg", 200.0)));
        editor.pages.page_mut(0).unwrap().units.insert(3, photo);
        editor.trigger_reflow();
        let layout_before: Vec<Vec<UnitId>> =
            editor.pages.iter().map(|p| p.units.clone()).collect();

        assert!(editor.delete_photo(photo, 0));
        editor.trigger_reflow();
        assert!(editor.pages.page_of(photo).is_none());

        // Restoring next to the old neighbor and reflowing reproduces the
        // original layout exactly
        assert_eq!(editor.undo_photo_delete(10), Some(photo));
        editor.trigger_reflow();
        let layout_after: Vec<Vec<UnitId>> =
            editor.pages.iter().map(|p| p.units.clone()).collect();
        assert_eq!(layout_after, layout_before);
    }

    #[test]
    fn test_undo_falls_back_to_original_page() {
        let mut editor = editor_with_lines(2, 50.0);
        let photo = editor.insert_photo(PhotoBlock::new("rose.jpg", 80.0), 0);
        assert!(editor.delete_photo(photo, 1));

        // The spacer that followed the photo is destroyed outright
        let receipt_successor = editor.caret().unwrap().unit;
        let page = editor.pages.page_of(receipt_successor).unwrap();
        let pos = editor
            .pages
            .page(page)
            .unwrap()
            .position_of(receipt_successor)
            .unwrap();
        editor.pages.page_mut(page).unwrap().units.remove(pos);
        editor.arena.free(receipt_successor);

        assert_eq!(editor.undo_photo_delete(2), Some(photo));
        assert_eq!(editor.pages.page_of(photo), Some(0));
    }

    #[test]
    fn test_caret_offset_stable_across_reflow() {
        let prose = "در روزگاران قدیم نویسنده‌ای بود که هر شب در دفترچه‌ی خود می‌نوشت";
        let lines: Vec<&str> = std::iter::repeat(prose).take(12).collect();
        let mut editor = Editor::with_text(&lines.join("\n"), PageMetrics::default());

        let unit = editor.pages.page(0).unwrap().units[9];
        let offset = prose
            .char_indices()
            .nth(10)
            .map(|(i, _)| i)
            .unwrap_or(0);
        assert!(editor.set_caret(Caret::new(0, unit, offset)));
        let doc_before = editor.caret_doc_offset().unwrap();
        let text_before = editor.text();

        editor.trigger_reflow();

        assert_eq!(editor.text(), text_before);
        assert_eq!(editor.caret_doc_offset(), Some(doc_before));
        let caret = editor.caret().unwrap();
        assert_eq!(caret.unit, unit);
        assert_eq!(caret.offset, offset);
    }

    #[test]
    fn test_debounced_flow_end_to_end() {
        let mut editor = editor_with_lines(8, 150.0);
        let unit = editor.pages.page(0).unwrap().units[0];
        editor.set_caret(Caret::new(0, unit, 0));
        editor.insert_text("ا", 0);

        // Before the typing debounce elapses nothing runs
        let report = editor.advance_to(100);
        assert_eq!(report.reflows, 0);
        assert_eq!(editor.page_count(), 1);

        let report = editor.advance_to(150);
        assert_eq!(report.reflows, 1);
        assert!(editor.page_count() > 1);
        assert!(!report.autosave_due);

        let report = editor.advance_to(1000);
        assert!(report.autosave_due);
    }

    #[test]
    fn test_create_page_with_focus() {
        let mut editor = Editor::new(PageMetrics::default());
        let index = editor.create_page(true);
        assert_eq!(index, 1);
        assert_eq!(editor.view.current_page_index, 1);
        let caret = editor.caret().unwrap();
        assert_eq!(editor.pages.page_of(caret.unit), Some(1));
    }

    #[test]
    fn test_view_follows_caret_across_reflow() {
        let mut editor = editor_with_lines(8, 150.0);
        let last = *editor.pages.page(0).unwrap().units.last().unwrap();
        assert!(editor.set_caret(Caret::new(0, last, 0)));

        editor.trigger_reflow();

        // Three units per page: the caret's line lands on page 2 and the
        // view moves with it
        let caret = editor.caret().unwrap();
        assert_eq!(caret.page, 2);
        assert_eq!(editor.view.current_page_index, 2);
        assert!(!editor.pages.page(2).unwrap().hidden);
    }

    #[test]
    fn test_replace_content_drops_pending_receipt() {
        let mut editor = Editor::with_text("یک\nدو", PageMetrics::default());
        let photo = editor.insert_photo(PhotoBlock::new("old.jpg", 90.0), 0);
        assert!(editor.delete_photo(photo, 1));

        editor.replace_content("تازه", 2);

        // The detached photo was freed along with the page content
        assert!(editor.arena.get(photo).is_none());
        assert_eq!(editor.arena.len(), 1);
        assert!(editor.undo_photo_delete(3).is_none());
    }

    #[test]
    fn test_replace_content_resets_document() {
        let mut editor = editor_with_lines(10, 150.0);
        editor.trigger_reflow();
        assert!(editor.page_count() > 1);

        editor.replace_content("یک\nدو\nسه", 0);
        assert_eq!(editor.page_count(), 1);
        assert_eq!(editor.text(), "یک\nدو\nسه");
        assert!(editor.caret().is_none());
    }

    #[test]
    fn test_snapshot_restore_round_trip() {
        let mut editor = editor_with_lines(8, 150.0);
        editor.insert_photo(PhotoBlock::new("miniature.jpg", 120.0), 0);
        editor.trigger_reflow();
        let snapshot = editor.snapshot(99);
        let text = editor.text();
        let pages = editor.page_count();

        let mut other = Editor::new(metrics_500());
        other.set_measurer(Box::new(FixedMeasurer(150.0)));
        other.restore(&snapshot);
        assert_eq!(other.text(), text);
        assert_eq!(other.page_count(), pages);
    }

    #[test]
    fn test_move_photo_within_page() {
        let mut editor = Editor::with_text("بالا\nپایین", PageMetrics::default());
        let photo = editor.insert_photo(PhotoBlock::new("p.jpg", 60.0), 0);
        let page = editor.pages.page(0).unwrap();
        let position = page.position_of(photo).unwrap();

        assert!(editor.move_photo_up(photo, 1));
        assert_eq!(
            editor.pages.page(0).unwrap().position_of(photo),
            Some(position - 1)
        );
        assert!(editor.move_photo_down(photo, 2));
        assert_eq!(
            editor.pages.page(0).unwrap().position_of(photo),
            Some(position)
        );
    }

    #[test]
    fn test_view_navigation_after_reflow() {
        // 16 * 125 = 2000 over a 500 capacity: four units per page
        let mut editor = editor_with_lines(16, 125.0);
        editor.trigger_reflow();
        assert_eq!(editor.page_count(), 4);

        assert!(editor.next_page());
        assert_eq!(editor.view.current_page_index, 2);
        assert_eq!(editor.page_info(), "۳ / ۴");
        // Hidden flags follow the spread
        assert!(editor.pages.page(0).unwrap().hidden);
        assert!(!editor.pages.page(2).unwrap().hidden);
    }
}
