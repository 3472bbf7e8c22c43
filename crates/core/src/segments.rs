//! Segment extraction and document reconstruction.

use crate::protected::ProtectedRegion;
use serde::Serialize;

/// A formattable slice between protected regions. Offsets are codepoints in
/// the original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextSegment {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Segment text; rewritten by the pipeline.
    pub text: String,
}

/// Emit the non-empty gaps around `regions`, which must be sorted and
/// non-overlapping.
pub fn extract_formattable_segments(
    chars: &[char],
    regions: &[ProtectedRegion],
) -> Vec<TextSegment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    for region in regions {
        if region.start > cursor {
            segments.push(segment(chars, cursor, region.start));
        }
        cursor = cursor.max(region.end);
    }
    if cursor < chars.len() {
        segments.push(segment(chars, cursor, chars.len()));
    }

    segments
}

fn segment(chars: &[char], start: usize, end: usize) -> TextSegment {
    TextSegment {
        start,
        end,
        text: chars[start..end].iter().collect(),
    }
}

/// Rebuild the document: protected regions come from `original`, segments
/// contribute their (possibly rewritten) text. Parts are ordered by their
/// original start offset.
pub fn reconstruct_text(
    original: &[char],
    segments: &[TextSegment],
    regions: &[ProtectedRegion],
) -> String {
    let mut parts: Vec<(usize, Part<'_>)> = Vec::with_capacity(segments.len() + regions.len());
    parts.extend(segments.iter().map(|s| (s.start, Part::Text(&s.text))));
    parts.extend(
        regions
            .iter()
            .map(|r| (r.start, Part::Original(&original[r.start..r.end]))),
    );
    parts.sort_by_key(|(start, _)| *start);

    let mut out = String::with_capacity(original.len() + 16);
    for (_, part) in parts {
        match part {
            Part::Text(text) => out.push_str(text),
            Part::Original(chars) => out.extend(chars.iter()),
        }
    }
    out
}

enum Part<'a> {
    Text(&'a str),
    Original(&'a [char]),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protected::scan_protected_regions;

    #[test]
    fn segments_fill_the_gaps() {
        let chars: Vec<char> = "前`code`中[a](u)后".chars().collect();
        let regions = scan_protected_regions(&chars).regions;
        let segments = extract_formattable_segments(&chars, &regions);
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["前", "中[a]", "后"]);
    }

    #[test]
    fn empty_gaps_are_omitted() {
        let chars: Vec<char> = "`a``b`".chars().collect();
        let regions = scan_protected_regions(&chars).regions;
        assert_eq!(regions.len(), 1);
        let chars: Vec<char> = "`a` `b`".chars().collect();
        let regions = scan_protected_regions(&chars).regions;
        let segments = extract_formattable_segments(&chars, &regions);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, " ");
    }

    #[test]
    fn reconstruction_keeps_regions_verbatim() {
        let source = "中文`a,b`中文";
        let chars: Vec<char> = source.chars().collect();
        let regions = scan_protected_regions(&chars).regions;
        let mut segments = extract_formattable_segments(&chars, &regions);
        for segment in &mut segments {
            segment.text = segment.text.replace("中文", "汉字！");
        }
        assert_eq!(
            reconstruct_text(&chars, &segments, &regions),
            "汉字！`a,b`汉字！"
        );
    }
}
