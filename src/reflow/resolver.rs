//! Overflow resolution for a single page

use crate::content::{split_text, Unit, UnitArena};
use crate::layout::{Measure, Measurement, PageMetrics};
use crate::page::PageStore;
use crate::reflow::ReflowConfig;

/// What one resolver invocation changed
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveOutcome {
    /// Units relocated to the next page
    pub moved: usize,
    /// Oversized units split in place
    pub splits: usize,
}

impl ResolveOutcome {
    /// Whether anything changed, so the scheduler must sweep again
    pub fn relocated(&self) -> bool {
        self.moved > 0 || self.splits > 0
    }
}

/// Measure a page's content container
pub fn measure_page(
    arena: &UnitArena,
    store: &PageStore,
    index: usize,
    measurer: &dyn Measure,
    metrics: &PageMetrics,
) -> Measurement {
    let rendered = store
        .page(index)
        .map(|page| {
            page.units
                .iter()
                .filter_map(|&id| arena.get(id))
                .map(|unit| measurer.unit_extent(unit, metrics))
                .sum()
        })
        .unwrap_or(0.0);
    Measurement {
        rendered,
        available: metrics.content_height(),
    }
}

/// Push a page's overflow onto the next page.
///
/// Units leave from the tail and arrive at the head of the next page, so
/// reading order is preserved exactly. Content settled at the head of a page
/// is the least likely to move again. A lone oversized unit is split as a
/// last resort; if it is atomic the page is left overflowing rather than
/// looping forever.
pub fn resolve_page(
    arena: &mut UnitArena,
    store: &mut PageStore,
    index: usize,
    measurer: &dyn Measure,
    metrics: &PageMetrics,
    config: &ReflowConfig,
) -> ResolveOutcome {
    let mut outcome = ResolveOutcome::default();

    // Safety cap bounds the inner loop on pathological content
    for _ in 0..config.max_moves_per_page {
        let measurement = measure_page(arena, store, index, measurer, metrics);
        if !measurement.is_overflowing(config.tolerance) {
            break;
        }

        let unit_count = match store.page(index) {
            Some(page) => page.units.len(),
            None => break,
        };
        if unit_count == 0 {
            break;
        }

        if unit_count == 1 {
            // Single overflowing unit: split fallback, then let the next
            // iteration relocate the trailing half.
            let id = store.page(index).map(|p| p.units[0]);
            let halves = id
                .and_then(|id| arena.get(id))
                .and_then(Unit::text)
                .and_then(|text| split_text(text, config.split_threshold));
            match (id, halves) {
                (Some(id), Some((first, second))) => {
                    if let Some(unit) = arena.get_mut(id) {
                        *unit = Unit::Text(first);
                    }
                    let tail = arena.alloc(Unit::Text(second));
                    if let Some(page) = store.page_mut(index) {
                        page.units.push(tail);
                    }
                    outcome.splits += 1;
                }
                _ => break, // atomic unit is allowed to overflow its page
            }
        } else {
            if index + 1 >= store.len() {
                store.append();
            }
            let moved = store.page_mut(index).and_then(|page| page.units.pop());
            if let (Some(id), Some(next)) = (moved, store.page_mut(index + 1)) {
                next.units.insert(0, id);
                outcome.moved += 1;
            } else {
                break;
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PhotoBlock;

    /// Every text unit measures the same fixed extent
    struct FlatMeasurer(f32);

    impl Measure for FlatMeasurer {
        fn unit_extent(&self, unit: &Unit, _metrics: &PageMetrics) -> f32 {
            match unit {
                Unit::Text(_) => self.0,
                Unit::Photo(photo) => photo.height,
            }
        }
    }

    fn capacity_500() -> PageMetrics {
        PageMetrics {
            page_width: 400.0,
            page_height: 500.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            margin_right: 0.0,
        }
    }

    fn fill_page(arena: &mut UnitArena, store: &mut PageStore, page: usize, lines: usize) {
        for i in 0..lines {
            let id = arena.alloc(Unit::Text(format!("سطر {}", i)));
            store.page_mut(page).unwrap().units.push(id);
        }
    }

    #[test]
    fn test_fitting_page_is_untouched() {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        fill_page(&mut arena, &mut store, 0, 3);

        let outcome = resolve_page(
            &mut arena,
            &mut store,
            0,
            &FlatMeasurer(100.0),
            &capacity_500(),
            &ReflowConfig::default(),
        );
        assert!(!outcome.relocated());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overflow_pushes_tail_to_head_of_next() {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        fill_page(&mut arena, &mut store, 0, 7);
        let order_before = store.reading_order();

        let outcome = resolve_page(
            &mut arena,
            &mut store,
            0,
            &FlatMeasurer(100.0),
            &capacity_500(),
            &ReflowConfig::default(),
        );
        // 700 units of content in a 500-unit page: two lines leave
        assert_eq!(outcome.moved, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.page(0).unwrap().units.len(), 5);
        assert_eq!(store.page(1).unwrap().units.len(), 2);
        // Reading order survives the tail-to-head transfer
        assert_eq!(store.reading_order(), order_before);
    }

    #[test]
    fn test_next_page_created_on_demand() {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        fill_page(&mut arena, &mut store, 0, 6);
        assert_eq!(store.len(), 1);

        resolve_page(
            &mut arena,
            &mut store,
            0,
            &FlatMeasurer(100.0),
            &capacity_500(),
            &ReflowConfig::default(),
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_oversized_photo_is_tolerated() {
        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        let photo = arena.alloc(Unit::Photo(PhotoBlock::new("big.jpg", 900.0)));
        store.page_mut(0).unwrap().units.push(photo);

        let outcome = resolve_page(
            &mut arena,
            &mut store,
            0,
            &FlatMeasurer(100.0),
            &capacity_500(),
            &ReflowConfig::default(),
        );
        assert!(!outcome.relocated());
        assert_eq!(store.len(), 1);
        let m = measure_page(&arena, &store, 0, &FlatMeasurer(100.0), &capacity_500());
        assert!(m.is_overflowing(2.0));
    }

    #[test]
    fn test_lone_long_text_is_split() {
        /// Extent proportional to content length
        struct PerChar(f32);
        impl Measure for PerChar {
            fn unit_extent(&self, unit: &Unit, _m: &PageMetrics) -> f32 {
                match unit {
                    Unit::Text(t) => (t.chars().count().max(1)) as f32 * self.0,
                    Unit::Photo(p) => p.height,
                }
            }
        }

        let mut arena = UnitArena::new();
        let mut store = PageStore::new();
        let words = vec!["word"; 60].join(" ");
        let total_chars = words.chars().count();
        let id = arena.alloc(Unit::Text(words.clone()));
        store.page_mut(0).unwrap().units.push(id);

        // 299 chars at 2.0 = ~600, over a 500 capacity
        let outcome = resolve_page(
            &mut arena,
            &mut store,
            0,
            &PerChar(2.0),
            &capacity_500(),
            &ReflowConfig::default(),
        );
        assert!(outcome.splits >= 1);
        assert!(outcome.moved >= 1);
        assert_eq!(store.len(), 2);

        // One separator consumed per split; nothing else lost
        let all_text: Vec<String> = store
            .reading_order()
            .iter()
            .filter_map(|&id| arena.get(id))
            .filter_map(|u| u.text().map(str::to_string))
            .collect();
        let splits = all_text.len() - 1;
        let rejoined_chars: usize = all_text.iter().map(|t| t.chars().count()).sum();
        assert_eq!(rejoined_chars + splits, total_chars);
    }
}
