//! Formatting configuration.
//!
//! A flat record of independent switches. JSON field names are camelCase, and
//! missing fields fall back to [`FormattingConfig::default`].

use crate::error::ConfigError;
use crate::quotes::QuoteMode;
use serde::{Deserialize, Serialize};

/// Target glyph family for smart quote conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuoteStyle {
    /// “double” and ‘single’ curly quotes.
    #[default]
    Curly,
    /// 「corner」 brackets for CJK-involved pairs.
    Corner,
    /// «guillemets» for paired straight double quotes.
    Guillemets,
}

/// Whether a postfix currency code is separated from its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostfixCurrency {
    /// `100 USD`
    #[default]
    Spaced,
    /// `100USD`
    Tight,
}

/// Upper bound for runs of `！`, `？` and `。`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PunctuationLimit {
    /// No limit.
    Off,
    /// Collapse runs to a single mark.
    One,
    /// Collapse runs to at most two marks.
    #[default]
    Two,
}

impl PunctuationLimit {
    /// Maximum run length, or `None` when unlimited.
    pub fn max_run(self) -> Option<usize> {
        match self {
            PunctuationLimit::Off => None,
            PunctuationLimit::One => Some(1),
            PunctuationLimit::Two => Some(2),
        }
    }
}

impl TryFrom<u8> for PunctuationLimit {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PunctuationLimit::Off),
            1 => Ok(PunctuationLimit::One),
            2 => Ok(PunctuationLimit::Two),
            other => Err(ConfigError::InvalidPunctuationLimit(other)),
        }
    }
}

impl From<PunctuationLimit> for u8 {
    fn from(limit: PunctuationLimit) -> Self {
        match limit {
            PunctuationLimit::Off => 0,
            PunctuationLimit::One => 1,
            PunctuationLimit::Two => 2,
        }
    }
}

/// Switches for every rule in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingConfig {
    // Universal
    /// Normalize `. . .` and dot runs to `...`.
    pub ellipsis_normalization: bool,
    /// Collapse 3+ newlines to a single blank line.
    pub newline_collapsing: bool,

    // Fullwidth normalization
    /// Convert fullwidth letters and digits to ASCII.
    pub fullwidth_alphanumeric: bool,
    /// Convert `, . ! ? ; :` to fullwidth next to CJK.
    pub fullwidth_punctuation: bool,
    /// Convert `(...)` to `（...）` when the content starts with CJK.
    pub fullwidth_parentheses: bool,
    /// Convert `[...]` to `［...］` when the content starts with CJK.
    pub fullwidth_brackets: bool,

    // Spacing
    /// Space between CJK and Latin letters/digits.
    pub cjk_english_spacing: bool,
    /// Space between CJK and ASCII parentheses.
    pub cjk_parenthesis_spacing: bool,
    /// Bind currency symbols and units to their amounts.
    pub currency_spacing: bool,
    /// Remove spaces around `/`.
    pub slash_spacing: bool,
    /// Collapse interior space runs.
    pub space_collapsing: bool,

    // Dash and quote
    /// `--` and `---` to `——`.
    pub dash_conversion: bool,
    /// Normalize spacing around existing `——`.
    pub emdash_spacing: bool,
    /// Enable smart quote conversion.
    pub smart_quote_conversion: bool,
    /// Glyph family used by smart quote conversion.
    pub quote_style: QuoteStyle,
    /// Curly quotes for CJK-involved pairs only; other pairs are left as
    /// written.
    pub contextual_quotes: bool,
    /// Space outside double curly/corner quotes next to letters.
    pub quote_spacing: bool,
    /// Space outside single curly quotes next to letters.
    pub single_quote_spacing: bool,
    /// Corner brackets for CJK-involved pairs.
    pub cjk_corner_quotes: bool,
    /// `'...'` inside `「」` becomes `『...』`.
    pub cjk_nested_quotes: bool,

    // Cleanup
    /// Limit for repeated `！？。`.
    pub consecutive_punctuation_limit: PunctuationLimit,
    /// Remove trailing spaces on each line.
    pub trailing_space_removal: bool,
    /// Keep two-space hard breaks when removing trailing spaces.
    pub preserve_hard_breaks: bool,
    /// Spacing between an amount and a trailing currency code.
    pub postfix_currency: PostfixCurrency,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            ellipsis_normalization: true,
            newline_collapsing: true,
            fullwidth_alphanumeric: true,
            fullwidth_punctuation: true,
            fullwidth_parentheses: true,
            fullwidth_brackets: false,
            cjk_english_spacing: true,
            cjk_parenthesis_spacing: true,
            currency_spacing: true,
            slash_spacing: false,
            space_collapsing: true,
            dash_conversion: true,
            emdash_spacing: true,
            smart_quote_conversion: true,
            quote_style: QuoteStyle::Curly,
            contextual_quotes: true,
            quote_spacing: false,
            single_quote_spacing: false,
            cjk_corner_quotes: false,
            cjk_nested_quotes: false,
            consecutive_punctuation_limit: PunctuationLimit::Two,
            trailing_space_removal: true,
            preserve_hard_breaks: true,
            postfix_currency: PostfixCurrency::Spaced,
        }
    }
}

impl FormattingConfig {
    /// Every rule switched on.
    pub fn all_enabled() -> Self {
        Self {
            ellipsis_normalization: true,
            newline_collapsing: true,
            fullwidth_alphanumeric: true,
            fullwidth_punctuation: true,
            fullwidth_parentheses: true,
            fullwidth_brackets: true,
            cjk_english_spacing: true,
            cjk_parenthesis_spacing: true,
            currency_spacing: true,
            slash_spacing: true,
            space_collapsing: true,
            dash_conversion: true,
            emdash_spacing: true,
            smart_quote_conversion: true,
            quote_style: QuoteStyle::Curly,
            contextual_quotes: true,
            quote_spacing: true,
            single_quote_spacing: true,
            cjk_corner_quotes: true,
            cjk_nested_quotes: true,
            consecutive_punctuation_limit: PunctuationLimit::Two,
            trailing_space_removal: true,
            preserve_hard_breaks: true,
            postfix_currency: PostfixCurrency::Spaced,
        }
    }

    /// Every rule switched off; useful as a base for targeted tests.
    pub fn none() -> Self {
        Self {
            ellipsis_normalization: false,
            newline_collapsing: false,
            fullwidth_alphanumeric: false,
            fullwidth_punctuation: false,
            fullwidth_parentheses: false,
            fullwidth_brackets: false,
            cjk_english_spacing: false,
            cjk_parenthesis_spacing: false,
            currency_spacing: false,
            slash_spacing: false,
            space_collapsing: false,
            dash_conversion: false,
            emdash_spacing: false,
            smart_quote_conversion: false,
            quote_style: QuoteStyle::Curly,
            contextual_quotes: false,
            quote_spacing: false,
            single_quote_spacing: false,
            cjk_corner_quotes: false,
            cjk_nested_quotes: false,
            consecutive_punctuation_limit: PunctuationLimit::Off,
            trailing_space_removal: false,
            preserve_hard_breaks: false,
            postfix_currency: PostfixCurrency::Spaced,
        }
    }

    /// Parse a configuration from JSON; unknown limits are rejected.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Glyph mode for the quote pairing engine.
    ///
    /// Guillemets use the paired fallback instead, so they map to
    /// [`QuoteMode::Off`] here.
    pub fn quote_mode(&self) -> QuoteMode {
        if !self.smart_quote_conversion {
            return QuoteMode::Off;
        }
        match self.quote_style {
            QuoteStyle::Guillemets => QuoteMode::Off,
            QuoteStyle::Corner => QuoteMode::CornerForCjk,
            QuoteStyle::Curly if self.cjk_corner_quotes => QuoteMode::CornerForCjk,
            QuoteStyle::Curly if self.contextual_quotes => QuoteMode::Contextual,
            QuoteStyle::Curly => QuoteMode::CurlyEverywhere,
        }
    }
}
