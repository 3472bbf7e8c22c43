//! Latin span scanning.
//!
//! Groups runs of Latin-span characters sitting between CJK runs and attaches
//! the technical subspans found inside each run.

use crate::script::is_latin_span_char;
use crate::tech_span::{TechnicalSubspan, find_technical_subspans};
use serde::Serialize;

/// A maximal run of Latin-span characters. Offsets are codepoint indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatinSpan {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Span text.
    pub text: String,
    /// Technical subspans, offsets relative to `start`.
    pub subspans: Vec<TechnicalSubspan>,
}

impl LatinSpan {
    /// Returns the subspan covering absolute position `pos`, if any.
    pub fn subspan_at(&self, pos: usize) -> Option<&TechnicalSubspan> {
        if pos < self.start || pos >= self.end {
            return None;
        }
        let rel = pos - self.start;
        self.subspans.iter().find(|s| rel >= s.start && rel < s.end)
    }
}

/// Scans `text` in one forward pass and returns its Latin spans.
///
/// A newline always closes the current span; whitespace-only runs are dropped.
pub fn scan_latin_spans(text: &str) -> Vec<LatinSpan> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut span_start = 0usize;

    for (index, ch) in text.chars().enumerate() {
        if is_latin_span_char(ch) {
            if current.is_empty() {
                span_start = index;
            }
            current.push(ch);
        } else if !current.is_empty() {
            close_span(&mut spans, span_start, std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        close_span(&mut spans, span_start, current);
    }

    spans
}

fn close_span(spans: &mut Vec<LatinSpan>, start: usize, text: String) {
    if text.trim().is_empty() {
        return;
    }
    let end = start + text.chars().count();
    let subspans = find_technical_subspans(&text);
    spans.push(LatinSpan {
        start,
        end,
        text,
        subspans,
    });
}

/// Whether `pos` falls inside any Latin span.
pub fn is_in_latin_span(pos: usize, spans: &[LatinSpan]) -> bool {
    spans.iter().any(|s| pos >= s.start && pos < s.end)
}

/// Whether `pos` falls inside any technical subspan.
pub fn is_in_technical_subspan(pos: usize, spans: &[LatinSpan]) -> bool {
    get_technical_subspan_at(pos, spans).is_some()
}

/// Returns the technical subspan covering `pos`, if any.
pub fn get_technical_subspan_at(pos: usize, spans: &[LatinSpan]) -> Option<&TechnicalSubspan> {
    spans.iter().find_map(|s| s.subspan_at(pos))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tech_span::TechnicalKind;

    #[test]
    fn splits_on_cjk_and_newlines() {
        let spans = scan_latin_spans("中文abc def中文\nxyz");
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "abc def");
        assert_eq!((spans[0].start, spans[0].end), (2, 9));
        assert_eq!(spans[1].text, "xyz");
        assert_eq!(spans[1].start, 12);
    }

    #[test]
    fn drops_whitespace_only_runs() {
        let spans = scan_latin_spans("中 文");
        assert!(spans.is_empty());
    }

    #[test]
    fn supplementary_han_counts_as_one_position() {
        let spans = scan_latin_spans("𠀀abc");
        assert_eq!(spans[0].start, 1);
        assert_eq!(spans[0].end, 4);
    }

    #[test]
    fn detects_subspans_and_answers_queries() {
        let text = "版本v1.2.3发布";
        let spans = scan_latin_spans(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].subspans[0].kind, TechnicalKind::VersionLike);

        // "v1.2.3" occupies positions 2..8
        assert!(is_in_latin_span(2, &spans));
        assert!(is_in_technical_subspan(4, &spans));
        assert!(!is_in_technical_subspan(1, &spans));
        assert!(!is_in_latin_span(8, &spans));
        assert_eq!(
            get_technical_subspan_at(7, &spans).map(|s| s.text.as_str()),
            Some("v1.2.3")
        );
    }
}
