//! Leading frontmatter detection.
//!
//! Only a `---` fence on the very first line opens frontmatter; the block runs
//! through the next line that is exactly `---`. The YAML itself is never
//! parsed, only its extent matters.

use crate::protected::line_ranges;

/// Result of scanning the start of a document for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterScan {
    /// The document does not open with `---`.
    Absent,
    /// Frontmatter spans `0..end` (codepoint offsets, closing fence included).
    Block {
        /// End offset, exclusive; the newline after the closing fence is not included.
        end: usize,
    },
    /// Opening fence with no closing fence.
    Unterminated,
}

/// Scan `chars` for a leading frontmatter block.
pub fn scan_frontmatter(chars: &[char]) -> FrontmatterScan {
    let lines = line_ranges(chars);
    let mut iter = lines.iter();

    let Some(first) = iter.next() else {
        return FrontmatterScan::Absent;
    };
    let first_line = strip_bom(&chars[first.clone()]);
    if !is_yaml_fence(first_line) || first.end >= chars.len() {
        return FrontmatterScan::Absent;
    }

    for range in iter {
        if is_yaml_fence(&chars[range.clone()]) {
            return FrontmatterScan::Block { end: range.end };
        }
    }

    FrontmatterScan::Unterminated
}

fn strip_bom(line: &[char]) -> &[char] {
    match line.first() {
        Some('\u{feff}') => &line[1..],
        _ => line,
    }
}

fn is_yaml_fence(line: &[char]) -> bool {
    normalize_line(line) == ['-', '-', '-']
}

fn normalize_line(line: &[char]) -> &[char] {
    match line.last() {
        Some('\r') => &line[..line.len() - 1],
        _ => line,
    }
}
