//! Window planning for source documents
//!
//! A window is a bounded slice of source text, paired with the resource
//! types it targets and the byte offsets it occupies in the original
//! document. Offsets let the merger translate window-relative citation
//! spans back into document coordinates. Planning is deterministic and can
//! be recomputed from the source text alone.

use crate::config::WindowPolicy;
use hacs_model::Extractable;
use std::sync::Arc;

/// How far back from the size limit the planner will look for a
/// whitespace break, as a divisor of the window size
const BREAK_SCAN_DIVISOR: usize = 8;

/// One slice of source text targeted at one or more resource types
///
/// Invariant: `start_offset < end_offset <= source.len()`, with both
/// offsets on `char` boundaries of the original document, and `text ==
/// source[start_offset..end_offset]`.
#[derive(Clone)]
pub struct ExtractionWindow {
    /// The window's text
    pub text: String,

    /// Byte offset of the window's start in the original document
    pub start_offset: usize,

    /// Byte offset of the window's end in the original document (exclusive)
    pub end_offset: usize,

    /// Resource types to extract from this window
    pub targets: Vec<Arc<dyn Extractable + Send + Sync>>,
}

impl std::fmt::Debug for ExtractionWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionWindow")
            .field("start_offset", &self.start_offset)
            .field("end_offset", &self.end_offset)
            .field("text_len", &self.text.len())
            .field(
                "targets",
                &self
                    .targets
                    .iter()
                    .map(|t| t.resource_type().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Split a document into windows sized to the policy's character budget.
///
/// Short documents (the common case) yield exactly one window covering the
/// whole text. Longer documents are split preferring whitespace breaks
/// near the budget, with `overlap_chars` of overlap between consecutive
/// windows so records straddling a boundary are seen at least once whole.
/// An empty document yields no windows.
pub fn plan_windows(
    source_text: &str,
    targets: &[Arc<dyn Extractable + Send + Sync>],
    policy: &WindowPolicy,
) -> Vec<ExtractionWindow> {
    if source_text.is_empty() {
        return Vec::new();
    }

    // Byte index of every char, plus one-past-the-end, so any char range
    // maps to a valid byte range
    let boundaries: Vec<usize> = source_text
        .char_indices()
        .map(|(idx, _)| idx)
        .chain(std::iter::once(source_text.len()))
        .collect();
    let total_chars = boundaries.len() - 1;

    if total_chars <= policy.max_window_chars {
        return vec![ExtractionWindow {
            text: source_text.to_string(),
            start_offset: 0,
            end_offset: source_text.len(),
            targets: targets.to_vec(),
        }];
    }

    let chars: Vec<char> = source_text.chars().collect();
    let mut windows = Vec::new();
    let mut start_char = 0;

    while start_char < total_chars {
        let hard_end = (start_char + policy.max_window_chars).min(total_chars);
        let end_char = if hard_end < total_chars {
            prefer_whitespace_break(&chars, start_char, hard_end, policy.max_window_chars)
        } else {
            hard_end
        };

        let start_byte = boundaries[start_char];
        let end_byte = boundaries[end_char];
        windows.push(ExtractionWindow {
            text: source_text[start_byte..end_byte].to_string(),
            start_offset: start_byte,
            end_offset: end_byte,
            targets: targets.to_vec(),
        });

        if end_char == total_chars {
            break;
        }
        // Step back for overlap, but always make forward progress
        start_char = end_char
            .saturating_sub(policy.overlap_chars)
            .max(start_char + 1);
    }

    windows
}

/// Scan backwards from `hard_end` for a whitespace char to break on,
/// giving up after an eighth of the window size.
fn prefer_whitespace_break(
    chars: &[char],
    start_char: usize,
    hard_end: usize,
    max_window_chars: usize,
) -> usize {
    let scan_limit = (max_window_chars / BREAK_SCAN_DIVISOR).max(1);
    let floor = hard_end.saturating_sub(scan_limit).max(start_char + 1);

    for candidate in (floor..hard_end).rev() {
        if chars[candidate].is_whitespace() {
            // Break after the whitespace so it stays in the left window
            return candidate + 1;
        }
    }
    hard_end
}

#[cfg(test)]
mod tests {
    use super::*;
    use hacs_model::catalog;

    fn targets() -> Vec<Arc<dyn Extractable + Send + Sync>> {
        vec![Arc::new(catalog::observation())]
    }

    fn policy(max: usize, overlap: usize) -> WindowPolicy {
        WindowPolicy {
            max_window_chars: max,
            overlap_chars: overlap,
        }
    }

    #[test]
    fn test_short_document_yields_single_window() {
        let text = "Patient reports mild chest pain since Tuesday.";
        let windows = plan_windows(text, &targets(), &policy(6000, 200));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start_offset, 0);
        assert_eq!(windows[0].end_offset, text.len());
        assert_eq!(windows[0].text, text);
    }

    #[test]
    fn test_empty_document_yields_no_windows() {
        let windows = plan_windows("", &targets(), &policy(100, 10));
        assert!(windows.is_empty());
    }

    #[test]
    fn test_long_document_is_split() {
        let text = "word ".repeat(100); // 500 chars
        let windows = plan_windows(&text, &targets(), &policy(120, 20));
        assert!(windows.len() > 1);
        for window in &windows {
            assert!(window.text.chars().count() <= 120);
        }
    }

    #[test]
    fn test_windows_cover_entire_document() {
        let text = "alpha beta gamma delta ".repeat(40);
        let windows = plan_windows(&text, &targets(), &policy(100, 15));

        assert_eq!(windows.first().unwrap().start_offset, 0);
        assert_eq!(windows.last().unwrap().end_offset, text.len());
        // No gap between consecutive windows
        for pair in windows.windows(2) {
            assert!(pair[1].start_offset <= pair[0].end_offset);
            assert!(pair[1].start_offset > pair[0].start_offset);
        }
    }

    #[test]
    fn test_window_text_matches_offsets() {
        let text = "one two three four five six seven eight nine ten ".repeat(20);
        for window in plan_windows(&text, &targets(), &policy(80, 10)) {
            assert_eq!(window.text, &text[window.start_offset..window.end_offset]);
        }
    }

    #[test]
    fn test_planning_is_deterministic() {
        let text = "lorem ipsum dolor sit amet ".repeat(50);
        let first = plan_windows(&text, &targets(), &policy(150, 25));
        let second = plan_windows(&text, &targets(), &policy(150, 25));
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_eq!(a.start_offset, b.start_offset);
            assert_eq!(a.end_offset, b.end_offset);
        }
    }

    #[test]
    fn test_prefers_whitespace_breaks() {
        let text = "aaaa bbbb cccc dddd eeee ffff gggg hhhh ".repeat(10);
        let windows = plan_windows(&text, &targets(), &policy(37, 0));
        // Breaks should land after whitespace, not mid-word
        for window in &windows[..windows.len() - 1] {
            assert!(
                window.text.ends_with(' '),
                "window {:?} ends mid-word",
                window
            );
        }
    }

    #[test]
    fn test_unsplittable_text_is_hard_split() {
        let text = "x".repeat(250);
        let windows = plan_windows(&text, &targets(), &policy(100, 0));
        assert_eq!(windows.len(), 3);
        assert_eq!(windows.last().unwrap().end_offset, 250);
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "håndtering av pasientens blodtrykk og puls ".repeat(10);
        for window in plan_windows(&text, &targets(), &policy(50, 5)) {
            // Slicing at the recorded offsets must not panic
            assert_eq!(window.text, &text[window.start_offset..window.end_offset]);
        }
    }

    #[test]
    fn test_targets_attached_to_every_window() {
        let text = "word ".repeat(100);
        for window in plan_windows(&text, &targets(), &policy(80, 10)) {
            assert_eq!(window.targets.len(), 1);
            assert_eq!(window.targets[0].resource_type(), "Observation");
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use hacs_model::catalog;
    use proptest::prelude::*;

    proptest! {
        /// Property: every window satisfies the offset invariant and its
        /// text matches the source slice
        #[test]
        fn test_window_invariant_property(
            text in ".{0,400}",
            max in 10usize..120,
            overlap in 0usize..9,
        ) {
            let targets: Vec<Arc<dyn Extractable + Send + Sync>> =
                vec![Arc::new(catalog::condition())];
            let policy = WindowPolicy { max_window_chars: max, overlap_chars: overlap };

            for window in plan_windows(&text, &targets, &policy) {
                prop_assert!(window.start_offset < window.end_offset);
                prop_assert!(window.end_offset <= text.len());
                prop_assert_eq!(&window.text, &text[window.start_offset..window.end_offset]);
            }
        }

        /// Property: windows jointly cover the document with no gaps
        #[test]
        fn test_window_coverage_property(
            text in ".{1,400}",
            max in 10usize..120,
        ) {
            let targets: Vec<Arc<dyn Extractable + Send + Sync>> =
                vec![Arc::new(catalog::condition())];
            let policy = WindowPolicy { max_window_chars: max, overlap_chars: 0 };

            let windows = plan_windows(&text, &targets, &policy);
            prop_assert!(!windows.is_empty());
            prop_assert_eq!(windows.first().unwrap().start_offset, 0);
            prop_assert_eq!(windows.last().unwrap().end_offset, text.len());
            for pair in windows.windows(2) {
                prop_assert!(pair[1].start_offset <= pair[0].end_offset);
            }
        }
    }
}
