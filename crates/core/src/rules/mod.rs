//! Typography rule pipeline.
//!
//! Rules run in a fixed order that configuration cannot change. Each rule is a
//! pure `&str -> Cow<str>` rewrite that returns `Cow::Borrowed` when it has
//! nothing to do. CJK-gated rules are skipped entirely for text without CJK.

use crate::config::FormattingConfig;
use crate::script::contains_cjk;
use std::borrow::Cow;

pub mod cleanup;
pub mod dash_quote;
pub mod fullwidth;
pub mod spacing;
pub mod universal;

/// Rule families, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleGroup {
    /// Ellipsis and newline normalization.
    Universal,
    /// Fullwidth/halfwidth conversion.
    Fullwidth,
    /// Dashes and quotes.
    DashQuote,
    /// Inter-script spacing.
    Spacing,
    /// Final whitespace and punctuation cleanup.
    Cleanup,
}

/// Signature shared by every rewrite.
pub type RuleFn = for<'a> fn(&'a str, &FormattingConfig) -> Cow<'a, str>;

/// One step of the pipeline.
pub struct Rule {
    /// Stable identifier, used in trace logs.
    pub name: &'static str,
    /// Family the rule belongs to.
    pub group: RuleGroup,
    /// Skip the rule unless the segment contains CJK.
    pub cjk_only: bool,
    /// Whether the configuration enables the rule.
    pub enabled: fn(&FormattingConfig) -> bool,
    /// The rewrite itself.
    pub apply: RuleFn,
}

/// Where a segment sits in its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentContext {
    /// The segment is the last part of the document, so trailing whitespace
    /// and hard-break backslashes are stripped.
    pub at_document_end: bool,
}

impl SegmentContext {
    /// Context for text that is formatted as a whole.
    pub fn whole_document() -> Self {
        Self {
            at_document_end: true,
        }
    }
}

/// Every rule in application order.
///
/// CJK↔paren spacing sits in front of the parenthesis conversion so that
/// `中文(中文)` is first spaced, then converted and tightened.
pub const RULES: &[Rule] = &[
    Rule {
        name: "ellipsis",
        group: RuleGroup::Universal,
        cjk_only: false,
        enabled: |c| c.ellipsis_normalization,
        apply: universal::normalize_ellipsis,
    },
    Rule {
        name: "newline-collapse",
        group: RuleGroup::Universal,
        cjk_only: false,
        enabled: |c| c.newline_collapsing,
        apply: universal::collapse_newlines,
    },
    Rule {
        name: "fullwidth-alphanumeric",
        group: RuleGroup::Fullwidth,
        cjk_only: true,
        enabled: |c| c.fullwidth_alphanumeric,
        apply: fullwidth::halfwidth_alphanumerics,
    },
    Rule {
        name: "fullwidth-punctuation",
        group: RuleGroup::Fullwidth,
        cjk_only: true,
        enabled: |c| c.fullwidth_punctuation,
        apply: fullwidth::fullwidth_punctuation,
    },
    Rule {
        name: "cjk-parenthesis-spacing",
        group: RuleGroup::Spacing,
        cjk_only: true,
        enabled: |c| c.cjk_parenthesis_spacing,
        apply: spacing::space_parentheses,
    },
    Rule {
        name: "fullwidth-parentheses",
        group: RuleGroup::Fullwidth,
        cjk_only: true,
        enabled: |c| c.fullwidth_parentheses,
        apply: fullwidth::fullwidth_parentheses,
    },
    Rule {
        name: "fullwidth-brackets",
        group: RuleGroup::Fullwidth,
        cjk_only: true,
        enabled: |c| c.fullwidth_brackets,
        apply: fullwidth::fullwidth_brackets,
    },
    Rule {
        name: "dash-conversion",
        group: RuleGroup::DashQuote,
        cjk_only: true,
        enabled: |c| c.dash_conversion,
        apply: dash_quote::convert_dashes,
    },
    Rule {
        name: "emdash-spacing",
        group: RuleGroup::DashQuote,
        cjk_only: true,
        enabled: |c| c.emdash_spacing,
        apply: dash_quote::space_emdashes,
    },
    Rule {
        name: "smart-quotes",
        group: RuleGroup::DashQuote,
        cjk_only: true,
        enabled: |c| c.smart_quote_conversion,
        apply: dash_quote::smart_quotes,
    },
    Rule {
        name: "nested-corner-quotes",
        group: RuleGroup::DashQuote,
        cjk_only: true,
        enabled: |c| c.cjk_nested_quotes,
        apply: dash_quote::nest_corner_quotes,
    },
    Rule {
        name: "quote-spacing",
        group: RuleGroup::DashQuote,
        cjk_only: true,
        enabled: |c| c.quote_spacing,
        apply: dash_quote::space_double_quotes,
    },
    Rule {
        name: "single-quote-spacing",
        group: RuleGroup::DashQuote,
        cjk_only: true,
        enabled: |c| c.single_quote_spacing,
        apply: dash_quote::space_single_quotes,
    },
    Rule {
        name: "cjk-english-spacing",
        group: RuleGroup::Spacing,
        cjk_only: true,
        enabled: |c| c.cjk_english_spacing,
        apply: spacing::space_cjk_latin,
    },
    Rule {
        name: "currency-spacing",
        group: RuleGroup::Spacing,
        cjk_only: true,
        enabled: |c| c.currency_spacing,
        apply: spacing::bind_currency_and_units,
    },
    Rule {
        name: "slash-spacing",
        group: RuleGroup::Spacing,
        cjk_only: true,
        enabled: |c| c.slash_spacing,
        apply: spacing::despace_slashes,
    },
    Rule {
        name: "punctuation-limit",
        group: RuleGroup::Cleanup,
        cjk_only: true,
        enabled: |c| c.consecutive_punctuation_limit.max_run().is_some(),
        apply: cleanup::limit_repeated_punctuation,
    },
    Rule {
        name: "space-collapse",
        group: RuleGroup::Cleanup,
        cjk_only: false,
        enabled: |c| c.space_collapsing,
        apply: cleanup::collapse_spaces,
    },
    Rule {
        name: "trailing-space",
        group: RuleGroup::Cleanup,
        cjk_only: false,
        enabled: |c| c.trailing_space_removal,
        apply: cleanup::remove_trailing_spaces,
    },
    Rule {
        name: "newline-collapse-final",
        group: RuleGroup::Cleanup,
        cjk_only: false,
        enabled: |c| c.newline_collapsing,
        apply: universal::collapse_newlines,
    },
];

/// Upper bound on pipeline rounds for one segment.
const MAX_ROUNDS: usize = 8;

/// Run the whole pipeline over one segment.
///
/// A later rule can create context an earlier one reacts to: a quote pair
/// becomes `「」` after punctuation has been converted. The chain is rerun
/// until a round leaves the segment unchanged, so formatting the output
/// again is a no-op.
pub fn apply_pipeline(text: &str, config: &FormattingConfig, context: SegmentContext) -> String {
    let mut current = text.to_string();
    for round in 1..=MAX_ROUNDS {
        match run_round(&current, config, context) {
            Some(next) if next != current => current = next,
            _ => return current,
        }
        log::trace!("pipeline round {round} rewrote segment");
    }
    log::debug!("segment still changing after {MAX_ROUNDS} rounds");
    current
}

/// One pass over every enabled rule. `None` when nothing was rewritten.
fn run_round(text: &str, config: &FormattingConfig, context: SegmentContext) -> Option<String> {
    let has_cjk = contains_cjk(text);
    let mut current: Option<String> = None;

    for rule in RULES {
        if (rule.cjk_only && !has_cjk) || !(rule.enabled)(config) {
            continue;
        }
        let input = current.as_deref().unwrap_or(text);
        let rewritten = match (rule.apply)(input, config) {
            Cow::Borrowed(_) => None,
            Cow::Owned(next) => (next != input).then_some(next),
        };
        if let Some(next) = rewritten {
            log::trace!("rule {} ({:?}) rewrote segment", rule.name, rule.group);
            current = Some(next);
        }
    }

    if context.at_document_end {
        let input = current.as_deref().unwrap_or(text);
        let stripped = cleanup::strip_document_end(input);
        if stripped.len() != input.len() {
            current = Some(stripped.to_string());
        }
    }

    current
}

/// Collect the codepoints of `text`; rules index by codepoint.
pub(crate) fn chars_of(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// Nearest character before `index`, skipping spaces and tabs.
pub(crate) fn prev_non_blank(chars: &[char], index: usize) -> Option<char> {
    chars[..index]
        .iter()
        .rev()
        .find(|c| **c != ' ' && **c != '\t')
        .copied()
}

/// Nearest character after `index`, skipping spaces and tabs.
pub(crate) fn next_non_blank(chars: &[char], index: usize) -> Option<char> {
    chars
        .get(index + 1..)?
        .iter()
        .find(|c| **c != ' ' && **c != '\t')
        .copied()
}
