//! Metrics-driven extent estimation for content units

use crate::content::Unit;
use crate::layout::{Measure, PageMetrics};
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Extra vertical space a photo frame adds around its image: border,
/// matting and the caption strip padding.
const PHOTO_CHROME: f32 = 28.0;

/// Estimates rendered extents from fixed character metrics.
///
/// This is an approximation of what the host renderer reports for a laid-out
/// block: greedy UAX#14 wrapping at the content width, one line height per
/// wrapped line. It does not attempt shaping; Persian joining is handled by
/// measuring grapheme clusters, not bytes.
#[derive(Debug, Clone, Copy)]
pub struct TextMeasurer {
    /// Height of one wrapped line
    pub line_height: f32,
    /// Advance width assumed per grapheme cluster
    pub default_width: f32,
}

impl Default for TextMeasurer {
    fn default() -> Self {
        Self {
            line_height: 28.0,
            default_width: 9.0,
        }
    }
}

impl TextMeasurer {
    pub fn new(line_height: f32, default_width: f32) -> Self {
        Self {
            line_height,
            default_width,
        }
    }

    fn grapheme_width(&self, grapheme: &str) -> f32 {
        let mut chars = grapheme.chars();
        match chars.next() {
            // Zero-width: break markers, ZWNJ half-space, the caret anchor
            Some('\n') | Some('\u{200C}') | Some('\u{FEFF}') => 0.0,
            Some(c) if c.is_control() => 0.0,
            Some(_) => self.default_width,
            None => 0.0,
        }
    }

    fn segment_width(&self, segment: &str) -> f32 {
        segment
            .graphemes(true)
            .map(|g| self.grapheme_width(g))
            .sum()
    }

    /// Number of rendered lines after greedy wrapping at `max_width`
    pub fn wrapped_lines(&self, text: &str, max_width: f32) -> usize {
        if text.is_empty() {
            return 1;
        }

        let mut lines = 1usize;
        let mut line_width = 0.0f32;
        let mut prev = 0usize;
        for (pos, opportunity) in linebreaks(text) {
            let width = self.segment_width(&text[prev..pos]);
            if line_width > 0.0 && line_width + width > max_width {
                lines += 1;
                line_width = 0.0;
            }
            line_width += width;
            if opportunity == BreakOpportunity::Mandatory && pos < text.len() {
                lines += 1;
                line_width = 0.0;
            }
            prev = pos;
        }
        lines
    }
}

impl Measure for TextMeasurer {
    fn unit_extent(&self, unit: &Unit, metrics: &PageMetrics) -> f32 {
        let width = metrics.content_width();
        match unit {
            Unit::Text(text) => self.wrapped_lines(text, width) as f32 * self.line_height,
            Unit::Photo(photo) => {
                let caption = if photo.caption.is_empty() {
                    0.0
                } else {
                    self.wrapped_lines(&photo.caption, width) as f32 * self.line_height
                };
                photo.height + caption + PHOTO_CHROME
            }
        }
    }
}
