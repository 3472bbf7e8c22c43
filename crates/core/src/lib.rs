#![deny(missing_docs)]
//! Hanfmt core: CJK-aware typography normalization for Markdown.
//!
//! A document is split into protected regions (code, links, math, HTML,
//! frontmatter) and the formattable segments between them. Each segment runs
//! through a fixed rule pipeline, and the document is reassembled with every
//! protected region byte-identical.

/// Parallel formatting of many documents.
pub mod batch;
/// Fenced code block detection.
pub mod code_fence;
/// Formatting configuration.
pub mod config;
/// Error and diagnostic types.
pub mod error;
/// Leading frontmatter detection.
pub mod frontmatter;
/// Latin span scanning.
pub mod latin_span;
/// Formatting and analysis entry points.
pub mod normalize;
/// Protected-region scanning.
pub mod protected;
/// Quote classification and pairing.
pub mod quotes;
/// Typography rules and their pipeline.
pub mod rules;
/// Script classification.
pub mod script;
/// Segment extraction and reconstruction.
pub mod segments;
/// Technical-token detection.
pub mod tech_span;

pub use batch::{
    BatchInput, BatchOptions, BatchOutcome, BatchResult, BatchStats, format_batch,
    format_batch_with_options,
};
pub use config::{FormattingConfig, PostfixCurrency, PunctuationLimit, QuoteStyle};
pub use error::{ConfigError, Diagnostic, Diagnostics, SourceLocation};
pub use latin_span::{
    LatinSpan, get_technical_subspan_at, is_in_latin_span, is_in_technical_subspan,
    scan_latin_spans,
};
pub use normalize::{
    DocumentAnalysis, FormatReport, analyze_markdown, format_markdown,
    format_markdown_with_report, format_selection,
};
pub use protected::{ProtectedRegion, RegionKind, find_protected_regions};
pub use quotes::{QuoteAnalysis, QuoteMode, QuotePair, analyze_quotes, apply_contextual_quotes};
pub use script::contains_cjk;
pub use segments::{TextSegment, extract_formattable_segments, reconstruct_text};
pub use tech_span::{TechnicalKind, TechnicalSubspan, find_technical_subspans};
