//! Last-resort splitting of oversized text units

use unicode_segmentation::UnicodeSegmentation;

/// Split a text block into two halves, or report it as atomic.
///
/// Break-marker content divides at the midpoint marker; plain prose longer
/// than `threshold` graphemes divides at the whitespace nearest the grapheme
/// midpoint. Exactly one separator character is consumed per split, so
/// `first + sep + second` reconstructs the original. Returns `None` when no
/// valid split point exists.
pub fn split_text(text: &str, threshold: usize) -> Option<(String, String)> {
    if let Some(split) = split_at_break_marker(text) {
        return Some(split);
    }
    split_at_whitespace(text, threshold)
}

/// Divide at the middle internal `\n` break marker
fn split_at_break_marker(text: &str) -> Option<(String, String)> {
    let markers: Vec<usize> = text
        .char_indices()
        .filter(|&(_, c)| c == '\n')
        .map(|(i, _)| i)
        .collect();
    if markers.is_empty() {
        return None;
    }

    let mid = markers[markers.len() / 2];
    let first = &text[..mid];
    let second = &text[mid + 1..];
    // Degenerate markers at the very edge give an empty half; refuse rather
    // than shuffle an empty line forever.
    if first.is_empty() && second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}

/// Divide long prose at the space nearest the grapheme midpoint
fn split_at_whitespace(text: &str, threshold: usize) -> Option<(String, String)> {
    let graphemes: Vec<(usize, &str)> = text.grapheme_indices(true).collect();
    if graphemes.len() <= threshold {
        return None;
    }

    let mid = graphemes.len() / 2;
    let mut best: Option<(usize, usize)> = None; // (grapheme index, byte offset)
    for (i, &(byte, g)) in graphemes.iter().enumerate() {
        if !g.is_empty() && g.chars().all(char::is_whitespace) {
            let dist = i.abs_diff(mid);
            match best {
                Some((bi, _)) if bi.abs_diff(mid) <= dist => {}
                _ => best = Some((i, byte)),
            }
        }
    }

    let (gi, byte) = best?;
    let sep_len = graphemes[gi].1.len();
    let first = &text[..byte];
    let second = &text[byte + sep_len..];
    if first.is_empty() || second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}
