//! WASM bindings for the editor

use crate::content::PhotoBlock;
use crate::editing::Caret;
use crate::layout::PageMetrics;
use crate::project::ProjectSnapshot;
use crate::{Editor, UnitId};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// WASM-exposed editor wrapper
#[wasm_bindgen]
pub struct WasmEditor {
    editor: Editor,
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create a new editor with the default page size (A5 manuscript)
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            editor: Editor::new(PageMetrics::default()),
        }
    }

    /// Create an editor with custom page dimensions
    #[wasm_bindgen(js_name = withDimensions)]
    pub fn with_dimensions(
        page_width: f32,
        page_height: f32,
        margin_top: f32,
        margin_bottom: f32,
        margin_left: f32,
        margin_right: f32,
    ) -> Self {
        let metrics = PageMetrics {
            page_width,
            page_height,
            margin_top,
            margin_bottom,
            margin_left,
            margin_right,
        };
        Self {
            editor: Editor::new(metrics),
        }
    }

    /// Insert text at the caret
    #[wasm_bindgen(js_name = insertText)]
    pub fn insert_text(&mut self, text: &str, now: f64) {
        self.editor.insert_text(text, now as u64);
    }

    /// Place the caret inside a unit
    #[wasm_bindgen(js_name = setCaret)]
    pub fn set_caret(&mut self, page: usize, unit: u64, offset: usize) -> bool {
        self.editor.set_caret(Caret::new(page, UnitId(unit), offset))
    }

    /// Caret position as a byte offset into the flat document text
    #[wasm_bindgen(js_name = caretOffset)]
    pub fn caret_offset(&self) -> Option<usize> {
        self.editor.caret_doc_offset()
    }

    /// Insert a photo block, returning its unit handle
    #[wasm_bindgen(js_name = insertPhoto)]
    pub fn insert_photo(&mut self, src: &str, height: f32, now: f64) -> u64 {
        self.editor
            .insert_photo(PhotoBlock::new(src, height), now as u64)
            .0
    }

    /// Swap a photo with the unit above it
    #[wasm_bindgen(js_name = movePhotoUp)]
    pub fn move_photo_up(&mut self, unit: u64, now: f64) -> bool {
        self.editor.move_photo_up(UnitId(unit), now as u64)
    }

    /// Swap a photo with the unit below it
    #[wasm_bindgen(js_name = movePhotoDown)]
    pub fn move_photo_down(&mut self, unit: u64, now: f64) -> bool {
        self.editor.move_photo_down(UnitId(unit), now as u64)
    }

    /// Remove a photo; one level of undo is kept
    #[wasm_bindgen(js_name = deletePhoto)]
    pub fn delete_photo(&mut self, unit: u64, now: f64) -> bool {
        self.editor.delete_photo(UnitId(unit), now as u64)
    }

    /// Restore the most recently deleted photo
    #[wasm_bindgen(js_name = undoPhotoDelete)]
    pub fn undo_photo_delete(&mut self, now: f64) -> Option<u64> {
        self.editor.undo_photo_delete(now as u64).map(|id| id.0)
    }

    /// Replace the whole document from raw text
    #[wasm_bindgen(js_name = replaceContent)]
    pub fn replace_content(&mut self, text: &str, now: f64) {
        self.editor.replace_content(text, now as u64);
    }

    /// Append a new page, optionally focusing it
    #[wasm_bindgen(js_name = createPage)]
    pub fn create_page(&mut self, auto_focus: bool) -> usize {
        self.editor.create_page(auto_focus)
    }

    /// Change page geometry; reflow follows after the resize debounce
    #[wasm_bindgen(js_name = setDimensions)]
    pub fn set_dimensions(
        &mut self,
        page_width: f32,
        page_height: f32,
        margin_top: f32,
        margin_bottom: f32,
        margin_left: f32,
        margin_right: f32,
        now: f64,
    ) {
        let metrics = PageMetrics {
            page_width,
            page_height,
            margin_top,
            margin_bottom,
            margin_left,
            margin_right,
        };
        self.editor.set_metrics(metrics, now as u64);
    }

    /// Run reflow immediately, bypassing the debounce timers
    #[wasm_bindgen(js_name = triggerReflow)]
    pub fn trigger_reflow(&mut self) -> bool {
        !self.editor.trigger_reflow().is_rejected()
    }

    /// Advance the editor clock, firing due timers. Returns whether the
    /// host should persist a snapshot (auto-save came due).
    #[wasm_bindgen(js_name = advanceTo)]
    pub fn advance_to(&mut self, now: f64) -> bool {
        self.editor.advance_to(now as u64).autosave_due
    }

    /// Earliest pending timer deadline, for host scheduling
    #[wasm_bindgen(js_name = nextDeadline)]
    pub fn next_deadline(&self) -> Option<f64> {
        self.editor.next_deadline().map(|t| t as f64)
    }

    /// Whether a reflow run is in flight
    #[wasm_bindgen(js_name = isPaginating)]
    pub fn is_paginating(&self) -> bool {
        self.editor.is_paginating()
    }

    /// Full document text
    #[wasm_bindgen(js_name = getText)]
    pub fn get_text(&self) -> String {
        self.editor.text()
    }

    /// Total page count
    #[wasm_bindgen(js_name = getPageCount)]
    pub fn get_page_count(&self) -> usize {
        self.editor.page_count()
    }

    /// Persian page-number labels, in order
    #[wasm_bindgen(js_name = pageLabels)]
    pub fn page_labels(&self) -> Vec<String> {
        self.editor.page_labels()
    }

    /// Status label: current page / total, in Persian digits
    #[wasm_bindgen(js_name = pageInfo)]
    pub fn page_info(&self) -> String {
        self.editor.page_info()
    }

    /// Index of the current page
    #[wasm_bindgen(js_name = currentPageIndex)]
    pub fn current_page_index(&self) -> usize {
        self.editor.view.current_page_index
    }

    /// Visibility per page under the current view mode
    #[wasm_bindgen(js_name = visiblePages)]
    pub fn visible_pages(&self) -> Vec<u8> {
        self.editor
            .view
            .display(self.editor.page_count())
            .visible
            .into_iter()
            .map(u8::from)
            .collect()
    }

    /// Move to the next page or spread
    #[wasm_bindgen(js_name = nextPage)]
    pub fn next_page(&mut self) -> bool {
        self.editor.next_page()
    }

    /// Move to the previous page or spread
    #[wasm_bindgen(js_name = prevPage)]
    pub fn prev_page(&mut self) -> bool {
        self.editor.prev_page()
    }

    /// Switch between single-page and spread view
    #[wasm_bindgen(js_name = toggleView)]
    pub fn toggle_view(&mut self) {
        self.editor.toggle_view();
    }

    /// Capture the document as a structured snapshot object
    #[wasm_bindgen(js_name = saveSnapshot)]
    pub fn save_snapshot(&self, now: f64) -> Result<JsValue, JsValue> {
        let snapshot = self.editor.snapshot(now as u64);
        serde_wasm_bindgen::to_value(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Replace the document from a snapshot object
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&mut self, value: JsValue) -> Result<(), JsValue> {
        let snapshot: ProjectSnapshot =
            serde_wasm_bindgen::from_value(value).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.editor.restore(&snapshot);
        Ok(())
    }
}
