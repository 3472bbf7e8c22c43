//! Dash conversion and smart quotes.

use super::chars_of;
use crate::config::{FormattingConfig, QuoteStyle};
use crate::quotes::{QuoteType, analyze_quotes, apply_contextual_quotes};
use crate::script::{is_cjk_closing_bracket, is_cjk_opening_bracket, is_cjk_or_hangul};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::collections::BTreeSet;

static DOUBLE_HYPHEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*-{2,}[ \t]*").expect("valid hyphen regex"));

static EMDASH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[ \t]*—{2,}[ \t]*").expect("valid emdash regex"));

static GUILLEMET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"\n]+)""#).expect("valid guillemet regex"));

/// Characters that get a space next to `——`.
fn is_word_like(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || is_cjk_or_hangul(ch)
}

fn side_space(neighbor: char) -> &'static str {
    if is_word_like(neighbor) { " " } else { "" }
}

/// `--` or longer becomes ` —— ` between words. A CJK bracket on either side
/// gets no space. `use --flag` is left alone.
pub fn convert_dashes<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains("--") {
        return Cow::Borrowed(text);
    }
    rewrite_dash_runs(text, &DOUBLE_HYPHEN_RE, |before, after, matched| {
        let left_ok = is_word_like(before) || is_cjk_closing_bracket(before);
        let right_ok = is_word_like(after) || is_cjk_opening_bracket(after);
        let cli_flag = matched.starts_with([' ', '\t']) && !matched.ends_with([' ', '\t']);
        left_ok && right_ok && !cli_flag
    })
}

/// Normalize spacing around an existing `——`: one space next to words,
/// none next to punctuation or brackets.
pub fn space_emdashes<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains("——") {
        return Cow::Borrowed(text);
    }
    rewrite_dash_runs(text, &EMDASH_RE, |_, _, _| true)
}

fn rewrite_dash_runs<'a>(
    text: &'a str,
    pattern: &Regex,
    accept: impl Fn(char, char, &str) -> bool,
) -> Cow<'a, str> {
    let mut out = String::with_capacity(text.len() + 8);
    let mut last = 0;

    for m in pattern.find_iter(text) {
        let before = text[..m.start()].chars().next_back();
        let after = text[m.end()..].chars().next();
        let (Some(before), Some(after)) = (before, after) else {
            continue;
        };
        if before == '\n' || after == '\n' || !accept(before, after, m.as_str()) {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(side_space(before));
        out.push_str("——");
        out.push_str(side_space(after));
        last = m.end();
    }

    if last == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    if out == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(out)
    }
}

/// Smart quote conversion. Guillemets use a plain paired match; the other
/// styles go through the quote pairing engine.
pub fn smart_quotes<'a>(text: &'a str, config: &FormattingConfig) -> Cow<'a, str> {
    if config.quote_style == QuoteStyle::Guillemets {
        return GUILLEMET_RE.replace_all(text, "«$1»");
    }
    let rewritten = apply_contextual_quotes(text, config.quote_mode());
    if rewritten == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(rewritten)
    }
}

/// Ranges `(open, close)` of balanced `「…」` pairs, by codepoint.
fn corner_ranges(chars: &[char]) -> Vec<(usize, usize)> {
    let mut stack = Vec::new();
    let mut ranges = Vec::new();
    for (index, &ch) in chars.iter().enumerate() {
        match ch {
            '「' => stack.push(index),
            '」' => {
                if let Some(open) = stack.pop() {
                    ranges.push((open, index));
                }
            }
            _ => {}
        }
    }
    ranges
}

/// Single-quote pairs inside `「…」` become `『…』`.
pub fn nest_corner_quotes<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains('「') {
        return Cow::Borrowed(text);
    }
    let mut chars = chars_of(text);
    let ranges = corner_ranges(&chars);
    let analysis = analyze_quotes(&chars);
    let mut changed = false;

    for pair in analysis
        .pairs
        .iter()
        .filter(|p| p.quote_type == QuoteType::Single)
    {
        let inside = ranges
            .iter()
            .any(|&(open, close)| open < pair.open_index && pair.close_index < close);
        if inside {
            chars[pair.open_index] = '『';
            chars[pair.close_index] = '』';
            changed = true;
        }
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    Cow::Owned(chars.into_iter().collect())
}

/// Space outside `“…”` and corner quotes next to letters and digits.
pub fn space_double_quotes<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    space_quotes(text, QuoteType::Double)
}

/// Space outside `‘…’` next to letters and digits.
pub fn space_single_quotes<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    space_quotes(text, QuoteType::Single)
}

fn space_quotes(text: &str, quote_type: QuoteType) -> Cow<'_, str> {
    let (curly_open, curly_close) = match quote_type {
        QuoteType::Double => ('“', '”'),
        QuoteType::Single => ('‘', '’'),
    };
    if !text.contains(curly_open) && !(quote_type == QuoteType::Double && text.contains('「')) {
        return Cow::Borrowed(text);
    }

    let chars = chars_of(text);
    let mut space_before: BTreeSet<usize> = BTreeSet::new();
    let mut space_after: BTreeSet<usize> = BTreeSet::new();

    let analysis = analyze_quotes(&chars);
    for pair in analysis.pairs.iter().filter(|p| p.quote_type == quote_type) {
        if chars[pair.open_index] != curly_open || chars[pair.close_index] != curly_close {
            continue;
        }
        if pair.open_index > 0 && is_word_like(chars[pair.open_index - 1]) {
            space_before.insert(pair.open_index);
        }
        if chars.get(pair.close_index + 1).is_some_and(|c| is_word_like(*c)) {
            space_after.insert(pair.close_index);
        }
    }

    if quote_type == QuoteType::Double {
        // corner brackets are fullwidth already; only Latin neighbors get a space
        for (open, close) in corner_ranges(&chars) {
            if open > 0 && chars[open - 1].is_ascii_alphanumeric() {
                space_before.insert(open);
            }
            if chars.get(close + 1).is_some_and(|c| c.is_ascii_alphanumeric()) {
                space_after.insert(close);
            }
        }
    }

    if space_before.is_empty() && space_after.is_empty() {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + space_before.len() + space_after.len());
    for (index, &ch) in chars.iter().enumerate() {
        if space_before.contains(&index) {
            out.push(' ');
        }
        out.push(ch);
        if space_after.contains(&index) {
            out.push(' ');
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> FormattingConfig {
        FormattingConfig::all_enabled()
    }

    #[test]
    fn double_hyphens_become_emdash() {
        let c = config();
        assert_eq!(convert_dashes("中文--中文", &c), "中文 —— 中文");
        assert_eq!(convert_dashes("中文 --- English", &c), "中文 —— English");
        assert_eq!(convert_dashes("（注）--说明", &c), "（注）—— 说明");
        assert_eq!(convert_dashes("说明--【注】", &c), "说明 ——【注】");
    }

    #[test]
    fn cli_flags_and_rules_are_kept() {
        let c = config();
        assert!(matches!(convert_dashes("运行 --verbose 参数", &c), Cow::Borrowed(_)));
        assert!(matches!(convert_dashes("---\n表格", &c), Cow::Borrowed(_)));
        assert!(matches!(convert_dashes("|---|---|", &c), Cow::Borrowed(_)));
    }

    #[test]
    fn emdash_spacing_normalizes() {
        let c = config();
        assert_eq!(space_emdashes("中文——中文", &c), "中文 —— 中文");
        assert_eq!(space_emdashes("他说，  ——  好", &c), "他说，—— 好");
        assert!(matches!(space_emdashes("中文 —— 中文", &c), Cow::Borrowed(_)));
    }

    #[test]
    fn guillemet_fallback() {
        let mut c = config();
        c.quote_style = QuoteStyle::Guillemets;
        assert_eq!(smart_quotes("他说\"你好\"和\"再见\"", &c), "他说«你好»和«再见»");
    }

    #[test]
    fn corner_style_uses_engine() {
        let mut c = config();
        c.quote_style = QuoteStyle::Corner;
        assert_eq!(smart_quotes("他说\"你好\"。", &c), "他说「你好」。");
    }

    #[test]
    fn nested_single_quotes_in_corners() {
        let c = config();
        assert_eq!(
            nest_corner_quotes("「她说'你好'」", &c),
            "「她说『你好』」"
        );
        assert!(matches!(nest_corner_quotes("「don't」", &c), Cow::Borrowed(_)));
    }

    #[test]
    fn quote_spacing_next_to_words() {
        let c = config();
        assert_eq!(space_double_quotes("他说“你好”然后", &c), "他说 “你好” 然后");
        assert_eq!(space_double_quotes("他说“你好”。", &c), "他说 “你好”。");
        assert_eq!(space_double_quotes("use「配置」now", &c), "use 「配置」 now");
        assert_eq!(space_single_quotes("他说‘好’了", &c), "他说 ‘好’ 了");
        assert!(matches!(space_single_quotes("don’t 中文", &c), Cow::Borrowed(_)));
    }
}
