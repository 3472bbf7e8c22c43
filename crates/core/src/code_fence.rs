//! Fenced code block detection.
//!
//! A fence opens on a line starting at column 0 with three or more backticks
//! or tildes, and closes on the first later line that starts at column 0 with
//! at least three of the same character. Fences that never close are reported
//! but not protected.

use std::collections::HashSet;
use std::ops::Range;

/// Fence parsing phases tracked across lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FencePhase {
    /// Not currently inside a fence.
    #[default]
    Outside,
    /// Within fence contents.
    InsideFence,
}

/// Current fence state (phase, marker, and opening line start).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceState {
    /// Current fence phase.
    pub phase: FencePhase,
    /// Fence marker character (``` or ~~~).
    pub marker: Option<char>,
    /// Offset of the opening fence line.
    pub start: usize,
}

/// Outcome of processing a single line for fence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineParseOutcome {
    /// State to carry into the next line.
    pub next_state: FenceState,
    /// Whether this line closed a fence.
    pub closed: bool,
}

/// Advance fence state based on a single line starting at `offset`.
pub fn advance_fence_state(line: &[char], offset: usize, state: FenceState) -> LineParseOutcome {
    let mut next_state = state;
    let mut closed = false;

    match state.phase {
        FencePhase::Outside => {
            if let Some(marker) = detect_fence_marker(line) {
                next_state = FenceState {
                    phase: FencePhase::InsideFence,
                    marker: Some(marker),
                    start: offset,
                };
            }
        }
        FencePhase::InsideFence => {
            if let Some(marker) = detect_fence_marker(line)
                && Some(marker) == state.marker
            {
                next_state = FenceState::default();
                closed = true;
            }
        }
    }

    LineParseOutcome { next_state, closed }
}

fn detect_fence_marker(line: &[char]) -> Option<char> {
    let first = *line.first()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run_len = line.iter().take_while(|c| **c == first).count();
    (run_len >= 3).then_some(first)
}

/// A closed fenced block, codepoint offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FencedBlock {
    /// Start of the opening fence line.
    pub start: usize,
    /// End of the closing fence line (newline excluded).
    pub end: usize,
    /// Fence marker character.
    pub marker: char,
}

/// All fences found in a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FenceScan {
    /// Closed blocks in document order.
    pub blocks: Vec<FencedBlock>,
    /// Openers that never closed: (offset, marker).
    pub unclosed: Vec<(usize, char)>,
}

/// Find fenced code blocks over pre-split line ranges.
///
/// When an opener never closes, scanning resumes on the line after it. No
/// later line can start with the same marker (it would have closed the
/// fence), so that marker is never retried.
pub fn find_fenced_blocks(chars: &[char], lines: &[Range<usize>]) -> FenceScan {
    let mut scan = FenceScan::default();
    let mut dead_markers: HashSet<char> = HashSet::new();
    let mut index = 0;

    while index < lines.len() {
        let range = lines[index].clone();
        let line = &chars[range.clone()];
        let opening = advance_fence_state(line, range.start, FenceState::default());

        let Some(marker) = opening.next_state.marker else {
            index += 1;
            continue;
        };
        if dead_markers.contains(&marker) {
            index += 1;
            continue;
        }

        let mut state = opening.next_state;
        let mut close_line = None;
        for (offset, inner) in lines.iter().enumerate().skip(index + 1) {
            let outcome = advance_fence_state(&chars[inner.clone()], inner.start, state);
            state = outcome.next_state;
            if outcome.closed {
                close_line = Some(offset);
                break;
            }
        }

        match close_line {
            Some(close) => {
                scan.blocks.push(FencedBlock {
                    start: range.start,
                    end: lines[close].end,
                    marker,
                });
                index = close + 1;
            }
            None => {
                log::debug!("unclosed {marker} fence at offset {}", range.start);
                scan.unclosed.push((range.start, marker));
                dead_markers.insert(marker);
                index += 1;
            }
        }
    }

    scan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protected::line_ranges;

    fn scan(input: &str) -> FenceScan {
        let chars: Vec<char> = input.chars().collect();
        let lines = line_ranges(&chars);
        find_fenced_blocks(&chars, &lines)
    }

    #[test]
    fn opens_and_closes_backtick_fence() {
        let start = advance_fence_state(&['`', '`', '`', 'j', 's'], 0, FenceState::default());
        assert!(matches!(start.next_state.phase, FencePhase::InsideFence));
        assert_eq!(start.next_state.marker, Some('`'));

        let inner = advance_fence_state(&['x'], 6, start.next_state);
        assert!(!inner.closed);

        let end = advance_fence_state(&['`', '`', '`'], 8, inner.next_state);
        assert!(end.closed);
        assert_eq!(end.next_state, FenceState::default());
    }

    #[test]
    fn finds_block_extent() {
        let result = scan("前\n```rust\nlet a = 1;\n```\n后");
        assert_eq!(
            result.blocks,
            vec![FencedBlock {
                start: 2,
                end: 24,
                marker: '`'
            }]
        );
        assert!(result.unclosed.is_empty());
    }

    #[test]
    fn ignores_mismatched_marker() {
        let result = scan("~~~\n```\n~~~");
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].marker, '~');
        assert_eq!(result.blocks[0].end, 11);
    }

    #[test]
    fn requires_three_markers() {
        assert!(scan("``\ncode\n``").blocks.is_empty());
    }

    #[test]
    fn indented_fence_is_not_an_opener() {
        assert!(scan("  ```\ncode\n  ```").blocks.is_empty());
    }

    #[test]
    fn unclosed_fence_is_reported_and_scanning_resumes() {
        let result = scan("```\nopen\n~~~\ninner\n~~~\n");
        assert_eq!(result.unclosed, vec![(0, '`')]);
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].start, 9);
    }
}
