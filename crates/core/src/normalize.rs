//! Normalizer facade: scan, split, run the pipeline, reassemble.

use crate::config::FormattingConfig;
use crate::error::{Diagnostic, Diagnostics, SourceLocation};
use crate::protected::{ProtectedRegion, scan_protected_regions};
use crate::quotes::analyze_quotes;
use crate::rules::{SegmentContext, apply_pipeline};
use crate::segments::{TextSegment, extract_formattable_segments, reconstruct_text};
use serde::Serialize;

/// Format a Markdown document, leaving every protected region byte-identical.
pub fn format_markdown(text: &str, config: &FormattingConfig) -> String {
    let chars: Vec<char> = text.chars().collect();
    let scan = scan_protected_regions(&chars);
    let mut segments = extract_formattable_segments(&chars, &scan.regions);
    log::debug!(
        "formatting {} segments around {} protected regions",
        segments.len(),
        scan.regions.len()
    );

    for segment in &mut segments {
        let context = SegmentContext {
            at_document_end: segment.end == chars.len(),
        };
        segment.text = apply_pipeline(&segment.text, config, context);
    }

    reconstruct_text(&chars, &segments, &scan.regions)
}

/// Format plain prose with no protected-region handling.
pub fn format_selection(text: &str, config: &FormattingConfig) -> String {
    apply_pipeline(text, config, SegmentContext::whole_document())
}

/// Scanner and quote-engine view of a document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    /// Protected regions, sorted and non-overlapping.
    pub regions: Vec<ProtectedRegion>,
    /// Formattable gaps between the regions.
    pub segments: Vec<TextSegment>,
    /// Soft errors, sorted by location.
    pub diagnostics: Diagnostics,
}

/// Scan `text` without rewriting it.
///
/// Reports unclosed fences, unterminated frontmatter and quotes the pairing
/// engine could not match.
pub fn analyze_markdown(text: &str) -> DocumentAnalysis {
    let chars: Vec<char> = text.chars().collect();
    let scan = scan_protected_regions(&chars);
    let segments = extract_formattable_segments(&chars, &scan.regions);
    let mut diagnostics = scan.diagnostics;

    for segment in &segments {
        let segment_chars = &chars[segment.start..segment.end];
        for orphan in analyze_quotes(segment_chars).orphans {
            diagnostics.push(Diagnostic::OrphanQuote {
                location: SourceLocation::from_offset(&chars, segment.start + orphan),
                quote: segment_chars[orphan],
            });
        }
    }
    diagnostics.sort();

    DocumentAnalysis {
        regions: scan.regions,
        segments,
        diagnostics,
    }
}

/// Formatted text plus the diagnostics found in the input.
#[derive(Debug, Clone, Serialize)]
pub struct FormatReport {
    /// Formatted document.
    pub text: String,
    /// Whether formatting changed anything.
    pub changed: bool,
    /// Findings in the original input.
    pub diagnostics: Diagnostics,
}

/// [`format_markdown`] together with [`analyze_markdown`] diagnostics.
pub fn format_markdown_with_report(text: &str, config: &FormattingConfig) -> FormatReport {
    let formatted = format_markdown(text, config);
    FormatReport {
        changed: formatted != text,
        text: formatted,
        diagnostics: analyze_markdown(text).diagnostics,
    }
}
