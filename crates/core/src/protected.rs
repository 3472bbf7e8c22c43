//! Protected-region scanning.
//!
//! Finds every range of a Markdown document that must never be rewritten:
//! frontmatter, code, link targets, images, wiki-links, footnote markers,
//! math and HTML. Detectors run in a fixed precedence order and each one skips
//! candidates overlapping a region collected earlier.

use crate::code_fence::find_fenced_blocks;
use crate::error::{Diagnostic, Diagnostics, SourceLocation};
use crate::frontmatter::{FrontmatterScan, scan_frontmatter};
use serde::Serialize;
use std::collections::HashMap;
use std::ops::Range;

/// Category of a protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    /// Leading `---` block.
    Frontmatter,
    /// ```` ``` ```` or `~~~` block.
    FencedCode,
    /// Backtick code span.
    InlineCode,
    /// Four-space or tab indented block.
    IndentedCode,
    /// `(url)` part of a link, or an `<scheme://…>` autolink.
    LinkUrl,
    /// `![alt](url)`.
    Image,
    /// `[[target]]` or `[[target|display]]`.
    WikiLink,
    /// `[^label]`.
    FootnoteRef,
    /// `[^label]:` at line start.
    FootnoteDef,
    /// `$$…$$`.
    MathBlock,
    /// `$…$`.
    MathInline,
    /// HTML open/close tag or comment.
    HtmlTag,
}

/// A half-open codepoint range that formatting must leave untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectedRegion {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
    /// Region category.
    pub kind: RegionKind,
}

/// Regions plus the soft errors met while scanning.
#[derive(Debug, Clone, Default)]
pub struct RegionScan {
    /// Sorted, non-overlapping regions.
    pub regions: Vec<ProtectedRegion>,
    /// Unclosed fences and unterminated frontmatter.
    pub diagnostics: Diagnostics,
}

/// Find the protected regions of `text`, sorted by start.
pub fn find_protected_regions(text: &str) -> Vec<ProtectedRegion> {
    let chars: Vec<char> = text.chars().collect();
    scan_protected_regions(&chars).regions
}

/// Scan a document already split into codepoints.
pub fn scan_protected_regions(chars: &[char]) -> RegionScan {
    let lines = line_ranges(chars);
    let mut collector = RegionCollector::new(chars);
    let mut diagnostics = Diagnostics::new();

    match scan_frontmatter(chars) {
        FrontmatterScan::Block { end } => collector.push(RegionKind::Frontmatter, 0, end),
        FrontmatterScan::Unterminated => diagnostics.push(Diagnostic::UnterminatedFrontmatter {
            location: SourceLocation::new(1, 1),
        }),
        FrontmatterScan::Absent => {}
    }

    let fences = find_fenced_blocks(chars, &lines);
    for block in &fences.blocks {
        collector.push(RegionKind::FencedCode, block.start, block.end);
    }
    for &(offset, marker) in &fences.unclosed {
        if !collector.is_protected(offset) {
            diagnostics.push(Diagnostic::UnclosedCodeFence {
                location: SourceLocation::from_offset(chars, offset),
                marker,
            });
        }
    }

    collector.detect_inline_code();
    collector.detect_images();
    collector.detect_link_urls();
    collector.detect_html_tags();
    collector.detect_wiki_links();
    collector.detect_footnote_defs(&lines);
    collector.detect_footnote_refs();
    collector.detect_math_blocks();
    collector.detect_math_inline();
    collector.detect_indented_code(&lines);

    RegionScan {
        regions: collector.finish(),
        diagnostics,
    }
}

/// Split into line ranges; each range excludes its `\n`. A trailing newline
/// yields a final empty line.
pub(crate) fn line_ranges(chars: &[char]) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (index, &ch) in chars.iter().enumerate() {
        if ch == '\n' {
            lines.push(start..index);
            start = index + 1;
        }
    }
    lines.push(start..chars.len());
    lines
}

/// First entry of the ascending `sorted` that is `>= pos`.
fn first_at_or_after(sorted: &[usize], pos: usize) -> Option<usize> {
    sorted.get(sorted.partition_point(|&p| p < pos)).copied()
}

struct RegionCollector<'a> {
    chars: &'a [char],
    regions: Vec<ProtectedRegion>,
    covered: Vec<bool>,
}

impl<'a> RegionCollector<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self {
            chars,
            regions: Vec::new(),
            covered: vec![false; chars.len()],
        }
    }

    fn overlaps(&self, start: usize, end: usize) -> bool {
        self.covered[start..end].iter().any(|c| *c)
    }

    fn is_protected(&self, pos: usize) -> bool {
        self.covered.get(pos).copied().unwrap_or(false)
    }

    fn push(&mut self, kind: RegionKind, start: usize, end: usize) {
        if start < end && end <= self.chars.len() && !self.overlaps(start, end) {
            self.covered[start..end].fill(true);
            self.regions.push(ProtectedRegion { start, end, kind });
        }
    }

    fn at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).copied()
    }

    fn starts_with(&self, pos: usize, pattern: &str) -> bool {
        let mut index = pos;
        for expected in pattern.chars() {
            if self.at(index) != Some(expected) {
                return false;
            }
            index += 1;
        }
        true
    }

    /// Start offsets of every occurrence of `pattern`, ascending.
    fn positions_of(&self, pattern: &str) -> Vec<usize> {
        (0..self.chars.len())
            .filter(|&pos| self.starts_with(pos, pattern))
            .collect()
    }

    /// Maximal backtick runs as `(start, len)`, in document order.
    fn backtick_runs(&self) -> Vec<(usize, usize)> {
        let mut runs: Vec<(usize, usize)> = Vec::new();
        for (pos, &ch) in self.chars.iter().enumerate() {
            if ch != '`' {
                continue;
            }
            match runs.last_mut() {
                Some((start, len)) if *start + *len == pos => *len += 1,
                _ => runs.push((pos, 1)),
            }
        }
        runs
    }

    /// Backtick spans: an opening run of n backticks closes on the next run of
    /// exactly n. The search stops at a blank line.
    fn detect_inline_code(&mut self) {
        let runs = self.backtick_runs();
        let mut by_len: HashMap<usize, Vec<usize>> = HashMap::new();
        for (index, &(_, len)) in runs.iter().enumerate() {
            by_len.entry(len).or_default().push(index);
        }
        let blank_lines = self.positions_of("\n\n");

        let mut pos = 0;
        for (index, &(start, len)) in runs.iter().enumerate() {
            let run_end = start + len;
            if run_end <= pos {
                continue;
            }
            let mut open = start.max(pos);
            while open < run_end && self.is_protected(open) {
                open += 1;
            }
            if open == run_end {
                continue;
            }

            let close = by_len
                .get(&(run_end - open))
                .and_then(|same| same.get(same.partition_point(|&other| other <= index)))
                .map(|&other| runs[other])
                .filter(|&(close_start, _)| {
                    first_at_or_after(&blank_lines, run_end).is_none_or(|blank| blank > close_start)
                });
            match close {
                Some((close_start, close_len)) => {
                    let end = close_start + close_len;
                    self.push(RegionKind::InlineCode, open, end);
                    pos = end;
                }
                None => pos = run_end,
            }
        }
    }

    /// For each `left` delimiter, the index of the `right` that balances it
    /// on the same line. Protected and backslash-escaped delimiters are
    /// skipped.
    fn delimiter_pairs(&self, left: char, right: char) -> Vec<Option<usize>> {
        let mut pairs = vec![None; self.chars.len()];
        let mut stack: Vec<usize> = Vec::new();
        for (pos, &ch) in self.chars.iter().enumerate() {
            if ch == '\n' {
                stack.clear();
                continue;
            }
            if self.is_protected(pos) || (pos > 0 && self.chars[pos - 1] == '\\') {
                continue;
            }
            if ch == left {
                stack.push(pos);
            } else if ch == right
                && let Some(open) = stack.pop()
            {
                pairs[open] = Some(pos);
            }
        }
        pairs
    }

    fn detect_images(&mut self) {
        let brackets = self.delimiter_pairs('[', ']');
        let parens = self.delimiter_pairs('(', ')');
        let mut pos = 0;
        while pos + 1 < self.chars.len() {
            if self.starts_with(pos, "![")
                && !self.is_protected(pos)
                && let Some(close_bracket) = brackets[pos + 1]
                && self.at(close_bracket + 1) == Some('(')
                && let Some(close_paren) = parens[close_bracket + 1]
            {
                self.push(RegionKind::Image, pos, close_paren + 1);
                pos = close_paren + 1;
                continue;
            }
            pos += 1;
        }
    }

    /// `[text](url)` protects only `(url)`; `<scheme:…>` autolinks are
    /// protected whole.
    fn detect_link_urls(&mut self) {
        let brackets = self.delimiter_pairs('[', ']');
        let parens = self.delimiter_pairs('(', ')');
        let mut pos = 0;
        while pos < self.chars.len() {
            let ch = self.chars[pos];
            if self.is_protected(pos) {
                pos += 1;
                continue;
            }
            if ch == '['
                && let Some(close_bracket) = brackets[pos]
                && self.at(close_bracket + 1) == Some('(')
                && let Some(close_paren) = parens[close_bracket + 1]
            {
                self.push(RegionKind::LinkUrl, close_bracket + 1, close_paren + 1);
                pos = close_paren + 1;
                continue;
            }
            if ch == '<'
                && let Some(end) = self.autolink_end(pos)
            {
                self.push(RegionKind::LinkUrl, pos, end);
                pos = end;
                continue;
            }
            pos += 1;
        }
    }

    fn autolink_end(&self, open: usize) -> Option<usize> {
        let scheme_len = self.chars[open + 1..]
            .iter()
            .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
            .count();
        if scheme_len < 2 || self.at(open + 1 + scheme_len) != Some(':') {
            return None;
        }
        let mut pos = open + 2 + scheme_len;
        while let Some(ch) = self.at(pos) {
            match ch {
                '>' => return Some(pos + 1),
                '<' => return None,
                c if c.is_whitespace() => return None,
                _ => pos += 1,
            }
        }
        None
    }

    fn detect_html_tags(&mut self) {
        let comment_ends = self.positions_of("-->");
        let mut pos = 0;
        while pos < self.chars.len() {
            if self.chars[pos] != '<' || self.is_protected(pos) {
                pos += 1;
                continue;
            }
            match self.html_end(pos, &comment_ends) {
                Some(end) => {
                    self.push(RegionKind::HtmlTag, pos, end);
                    pos = end;
                }
                None => pos += 1,
            }
        }
    }

    fn html_end(&self, open: usize, comment_ends: &[usize]) -> Option<usize> {
        if self.starts_with(open, "<!--") {
            return first_at_or_after(comment_ends, open + 4).map(|end| end + 3);
        }

        let mut pos = open + 1;
        if self.at(pos) == Some('/') {
            pos += 1;
        }
        if !self.at(pos).is_some_and(|c| c.is_ascii_alphabetic()) {
            return None;
        }
        while self
            .at(pos)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            pos += 1;
        }
        match self.at(pos) {
            Some('>') => return Some(pos + 1),
            Some(c) if c.is_whitespace() || c == '/' => {}
            _ => return None,
        }

        let mut quote: Option<char> = None;
        while let Some(ch) = self.at(pos) {
            match (quote, ch) {
                (Some(q), c) if c == q => quote = None,
                (Some(_), _) => {}
                (None, '"' | '\'') => quote = Some(ch),
                (None, '>') => return Some(pos + 1),
                (None, '<') => return None,
                _ => {}
            }
            if self.starts_with(pos, "\n\n") {
                return None;
            }
            pos += 1;
        }
        None
    }

    /// `[[target]]` on one line, closed by the first `]]` after the opener.
    fn detect_wiki_links(&mut self) {
        let closers = self.positions_of("]]");
        let newlines = self.positions_of("\n");
        let mut pos = 0;
        while pos + 1 < self.chars.len() {
            if self.starts_with(pos, "[[")
                && !self.is_protected(pos)
                && let Some(close) = first_at_or_after(&closers, pos + 2)
                && first_at_or_after(&newlines, pos + 2).is_none_or(|newline| newline > close)
                && close > pos + 2
            {
                self.push(RegionKind::WikiLink, pos, close + 2);
                pos = close + 2;
                continue;
            }
            pos += 1;
        }
    }

    /// End of a `[^label]` marker starting at `open`.
    fn footnote_label_end(&self, open: usize) -> Option<usize> {
        if !self.starts_with(open, "[^") {
            return None;
        }
        let mut pos = open + 2;
        while let Some(ch) = self.at(pos) {
            if ch == ']' {
                return (pos > open + 2).then_some(pos + 1);
            }
            if ch.is_whitespace() || ch == '[' {
                return None;
            }
            pos += 1;
        }
        None
    }

    fn detect_footnote_defs(&mut self, lines: &[Range<usize>]) {
        for line in lines {
            let indent = self.chars[line.clone()]
                .iter()
                .take_while(|c| **c == ' ')
                .count();
            let open = line.start + indent;
            if indent <= 3
                && let Some(end) = self.footnote_label_end(open)
                && self.at(end) == Some(':')
            {
                self.push(RegionKind::FootnoteDef, open, end + 1);
            }
        }
    }

    fn detect_footnote_refs(&mut self) {
        let mut pos = 0;
        while pos < self.chars.len() {
            if !self.is_protected(pos)
                && let Some(end) = self.footnote_label_end(pos)
            {
                self.push(RegionKind::FootnoteRef, pos, end);
                pos = end;
                continue;
            }
            pos += 1;
        }
    }

    fn detect_math_blocks(&mut self) {
        let mut pos = 0;
        while pos + 1 < self.chars.len() {
            if self.starts_with(pos, "$$") && !self.is_protected(pos) {
                let mut cursor = pos + 2;
                let mut end = None;
                while cursor + 1 < self.chars.len() {
                    if self.starts_with(cursor, "$$") {
                        end = Some(cursor + 2);
                        break;
                    }
                    cursor += 1;
                }
                match end {
                    Some(end) => {
                        self.push(RegionKind::MathBlock, pos, end);
                        pos = end;
                    }
                    None => break,
                }
                continue;
            }
            pos += 1;
        }
    }

    /// `$…$` on one line. A `$` touching another `$` never delimits, the
    /// opener must be followed by non-space, and the closer must follow
    /// non-space and not precede a digit, so `$5 and $10` stays prose.
    fn detect_math_inline(&mut self) {
        let closers: Vec<usize> = (1..self.chars.len())
            .filter(|&pos| {
                self.is_inline_dollar(pos)
                    && !self.chars[pos - 1].is_whitespace()
                    && !self.at(pos + 1).is_some_and(|c| c.is_ascii_digit())
            })
            .collect();
        let newlines = self.positions_of("\n");

        let mut pos = 0;
        while pos < self.chars.len() {
            if !self.is_inline_dollar(pos)
                || self.is_protected(pos)
                || self.at(pos + 1).is_none_or(char::is_whitespace)
            {
                pos += 1;
                continue;
            }
            let close = first_at_or_after(&closers, pos + 1).filter(|&close| {
                first_at_or_after(&newlines, pos + 1).is_none_or(|newline| newline > close)
            });
            match close {
                Some(close) => {
                    self.push(RegionKind::MathInline, pos, close + 1);
                    pos = close + 1;
                }
                None => pos += 1,
            }
        }
    }

    fn is_inline_dollar(&self, pos: usize) -> bool {
        self.at(pos) == Some('$')
            && (pos == 0 || !matches!(self.chars[pos - 1], '$' | '\\'))
            && self.at(pos + 1) != Some('$')
    }

    /// Runs of indented lines (blank lines included) become code unless the
    /// nearest non-blank line above the run is a list item.
    fn detect_indented_code(&mut self, lines: &[Range<usize>]) {
        let mut index = 0;
        while index < lines.len() {
            if !self.is_indented_content(&lines[index]) {
                index += 1;
                continue;
            }

            let run_start = index;
            let mut last_content = index;
            let mut cursor = index + 1;
            while cursor < lines.len() {
                let line = &lines[cursor];
                if self.is_indented_content(line) {
                    last_content = cursor;
                } else if !self.is_blank(line) {
                    break;
                }
                cursor += 1;
            }
            let reaches_end = cursor == lines.len();

            let follows_list = lines[..run_start]
                .iter()
                .rev()
                .find(|line| !self.is_blank(line))
                .is_some_and(|line| self.is_list_item(line));

            if !follows_list {
                let start = lines[run_start].start;
                let end = if reaches_end {
                    self.chars.len()
                } else {
                    lines[last_content].end
                };
                self.push(RegionKind::IndentedCode, start, end);
            }
            index = cursor;
        }
    }

    fn is_blank(&self, line: &Range<usize>) -> bool {
        self.chars[line.clone()].iter().all(|c| c.is_whitespace())
    }

    fn is_indented_content(&self, line: &Range<usize>) -> bool {
        let text = &self.chars[line.clone()];
        let indented =
            text.first() == Some(&'\t') || text.iter().take(4).filter(|c| **c == ' ').count() == 4;
        indented && !self.is_blank(line)
    }

    fn is_list_item(&self, line: &Range<usize>) -> bool {
        let text = &self.chars[line.clone()];
        let body: Vec<char> = text
            .iter()
            .skip_while(|c| **c == ' ' || **c == '\t')
            .copied()
            .collect();
        match body.as_slice() {
            ['-' | '*' | '+', next, ..] => *next == ' ' || *next == '\t',
            _ => {
                let digits = body.iter().take_while(|c| c.is_ascii_digit()).count();
                (1..=9).contains(&digits)
                    && matches!(body.get(digits), Some('.' | ')'))
                    && matches!(body.get(digits + 1), Some(' ' | '\t'))
            }
        }
    }

    /// Sort by start and drop anything overlapping an earlier kept region.
    fn finish(mut self) -> Vec<ProtectedRegion> {
        self.regions.sort_by_key(|r| (r.start, r.end));
        let mut kept: Vec<ProtectedRegion> = Vec::with_capacity(self.regions.len());
        for region in self.regions {
            if kept.last().is_some_and(|last| region.start < last.end) {
                continue;
            }
            kept.push(region);
        }
        kept
    }
}
