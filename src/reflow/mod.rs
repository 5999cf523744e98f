//! The reflow engine: convergence-seeking pagination
//!
//! An edit leaves some page overflowing; the engine sweeps all pages,
//! pushing tail units forward and creating trailing pages on demand, until a
//! full sweep relocates nothing or the pass budget runs out. A caret anchor
//! installed before the sweep keeps the edit point attached to its text.

mod anchor;
mod resolver;

pub use anchor::ANCHOR_CHAR;
pub use resolver::{measure_page, resolve_page, ResolveOutcome};

use crate::content::UnitArena;
use crate::editing::Caret;
use crate::layout::{Measure, PageMetrics, OVERFLOW_TOLERANCE};
use crate::page::PageStore;
use log::{debug, error, warn};
use std::cell::Cell;

/// Tunable pagination policy
#[derive(Debug, Clone)]
pub struct ReflowConfig {
    /// Overflow tolerance in layout units
    pub tolerance: f32,
    /// Full-sweep budget per run
    pub max_passes: usize,
    /// Relocation cap per page per sweep
    pub max_moves_per_page: usize,
    /// Minimum grapheme count before plain prose is considered splittable
    pub split_threshold: usize,
    /// Delay before a structural edit is measured, letting the renderer settle
    pub settle_delay: u64,
    /// Quiet period coalescing typing into one run
    pub typing_debounce: u64,
    /// Quiet period for viewport resizes
    pub resize_debounce: u64,
    /// Quiet period for auto-save
    pub autosave_delay: u64,
    /// Remove trailing blank pages after a run. Disable to preserve
    /// intentionally blank pages.
    pub prune_trailing_pages: bool,
}

impl Default for ReflowConfig {
    fn default() -> Self {
        Self {
            tolerance: OVERFLOW_TOLERANCE,
            max_passes: 20,
            max_moves_per_page: 500,
            split_threshold: 100,
            settle_delay: 50,
            typing_debounce: 150,
            resize_debounce: 500,
            autosave_delay: 1000,
            prune_trailing_pages: true,
        }
    }
}

/// What one completed run did
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflowReport {
    /// Sweeps executed (1 means the first sweep was already stable)
    pub passes: usize,
    /// Units relocated across page boundaries
    pub moved: usize,
    /// Oversized units split
    pub splits: usize,
    /// Trailing blank pages removed
    pub pruned: usize,
    /// A full sweep relocated nothing within the pass budget
    pub converged: bool,
}

/// Result of asking the engine to run
#[derive(Debug, Clone, Copy)]
pub enum ReflowOutcome {
    /// The run executed to completion (converged or budget-exhausted)
    Completed(ReflowReport),
    /// A run was already in flight; this invocation was dropped, not queued
    Rejected,
}

impl ReflowOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, ReflowOutcome::Rejected)
    }

    pub fn report(&self) -> Option<&ReflowReport> {
        match self {
            ReflowOutcome::Completed(report) => Some(report),
            ReflowOutcome::Rejected => None,
        }
    }
}

/// Clears the single-flight flag on every exit path
struct RunGuard<'a>(&'a Cell<bool>);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// One engine instance per document; owns the single-flight run state.
#[derive(Debug, Default)]
pub struct ReflowEngine {
    pub config: ReflowConfig,
    running: Cell<bool>,
}

impl ReflowEngine {
    pub fn new(config: ReflowConfig) -> Self {
        Self {
            config,
            running: Cell::new(false),
        }
    }

    /// Whether a run is currently in flight
    pub fn is_paginating(&self) -> bool {
        self.running.get()
    }

    /// Run the scheduler until stable or the pass budget is exhausted.
    ///
    /// Re-entrant calls are rejected while a run is in flight; the caller's
    /// debounce policy is responsible for re-arming. Cleanup (flag clear,
    /// anchor restore) is guaranteed on every exit path.
    pub fn run(
        &self,
        arena: &mut UnitArena,
        store: &mut PageStore,
        measurer: &dyn Measure,
        metrics: &PageMetrics,
        caret: &mut Option<Caret>,
    ) -> ReflowOutcome {
        if self.running.get() {
            return ReflowOutcome::Rejected;
        }
        self.running.set(true);
        let _guard = RunGuard(&self.running);

        let anchored = caret
            .as_ref()
            .map(|c| anchor::install(arena, c))
            .unwrap_or(false);

        let mut report = ReflowReport::default();
        for _ in 0..self.config.max_passes {
            report.passes += 1;
            let mut stable = true;

            // Page count is re-read every iteration: the resolver appends
            // trailing pages mid-sweep.
            let mut index = 0;
            while index < store.len() {
                let outcome = resolve_page(arena, store, index, measurer, metrics, &self.config);
                if outcome.relocated() {
                    stable = false;
                    report.moved += outcome.moved;
                    report.splits += outcome.splits;
                }
                index += 1;
            }

            if stable {
                report.converged = true;
                break;
            }
        }

        if !report.converged {
            // Pathological content: leave best-effort state, no error to the caller
            warn!(
                "reflow pass budget exhausted after {} passes ({} moves)",
                report.passes, report.moved
            );
        }

        if self.config.prune_trailing_pages {
            report.pruned = prune_trailing_pages(arena, store);
        }

        if anchored {
            match anchor::restore(arena, store) {
                Some(restored) => *caret = Some(restored),
                None => error!("caret anchor lost during reflow"),
            }
        } else if let Some(c) = caret.as_mut() {
            // Unanchorable caret (photo focus, non-boundary offset): its unit
            // may still have relocated, so refresh the stale page field.
            if let Some(page) = store.page_of(c.unit) {
                c.page = page;
            }
        }

        debug!(
            "reflow done: {} passes, {} moved, {} split, {} pruned, {} pages",
            report.passes,
            report.moved,
            report.splits,
            report.pruned,
            store.len()
        );
        ReflowOutcome::Completed(report)
    }
}

/// Remove blank pages from the tail, stopping at the first page with
/// content. Page 0 survives regardless.
fn prune_trailing_pages(arena: &UnitArena, store: &mut PageStore) -> usize {
    let mut pruned = 0;
    for index in (1..store.len()).rev() {
        let blank = store.page(index).map(|p| p.is_blank(arena)).unwrap_or(false);
        if !blank {
            break;
        }
        store.remove(index);
        pruned += 1;
    }
    pruned
}
