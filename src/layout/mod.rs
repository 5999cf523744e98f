//! Page metrics and the measurement contract

mod measure;

pub use measure::TextMeasurer;

use crate::content::Unit;

/// Overflow tolerance in layout units, absorbing sub-pixel rounding noise
/// from the rendering engine.
pub const OVERFLOW_TOLERANCE: f32 = 2.0;

/// Fixed page geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMetrics {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
}

impl Default for PageMetrics {
    fn default() -> Self {
        // A5 book page in points, generous manuscript margins
        Self {
            page_width: 420.0,
            page_height: 595.0,
            margin_top: 48.0,
            margin_bottom: 48.0,
            margin_left: 42.0,
            margin_right: 42.0,
        }
    }
}

impl PageMetrics {
    /// Usable content width
    pub fn content_width(&self) -> f32 {
        self.page_width - self.margin_left - self.margin_right
    }

    /// Usable content height: the available extent of every page
    pub fn content_height(&self) -> f32 {
        self.page_height - self.margin_top - self.margin_bottom
    }
}

/// Measured state of one page's content container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Actual occupied height
    pub rendered: f32,
    /// Fixed capacity of the page
    pub available: f32,
}

impl Measurement {
    /// Whether the container overflows beyond the tolerance
    pub fn is_overflowing(&self, tolerance: f32) -> bool {
        self.rendered > self.available + tolerance
    }
}

/// The measurement seam: rendered extent of a single unit.
///
/// The engine never inspects unit internals while reflowing; it only sums
/// extents, so tests can substitute fixed-extent measurers.
pub trait Measure {
    fn unit_extent(&self, unit: &Unit, metrics: &PageMetrics) -> f32;
}
