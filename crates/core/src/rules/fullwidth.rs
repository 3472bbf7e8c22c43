//! Fullwidth normalization: alphanumerics, punctuation, parentheses and
//! brackets.

use super::{chars_of, next_non_blank};
use crate::config::FormattingConfig;
use crate::latin_span::scan_latin_spans;
use crate::script::{
    fullwidth_punctuation as fullwidth_of, is_cjk_closing_bracket, is_cjk_letter,
    is_cjk_opening_bracket, is_cjk_terminal_punctuation, is_fullwidth_alphanumeric, to_halfwidth,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

static PAREN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([^()\n]*)\)").expect("valid parenthesis regex"));

static BRACKET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\[\]\n]*)\]").expect("valid bracket regex"));

/// `Ａ１` becomes `A1`.
pub fn halfwidth_alphanumerics<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.chars().any(is_fullwidth_alphanumeric) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(to_halfwidth).collect())
}

/// Convert `, . ! ? ; :` to fullwidth when a neighbor (spaces and tabs
/// skipped) is CJK. Spaces around a converted mark are removed.
///
/// The left neighbor is read from the rewritten output, so a mark converted
/// a moment ago counts as CJK context for the next one: `中??` becomes
/// `中？？` in one pass.
///
/// Marks inside technical subspans, dots touching another dot and
/// ordered-list markers are left alone.
pub fn fullwidth_punctuation<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.chars().any(|c| fullwidth_of(c).is_some()) {
        return Cow::Borrowed(text);
    }

    let chars = chars_of(text);
    let technical = technical_positions(text, chars.len());
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut changed = false;
    let mut line_start = 0;
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        if ch == '\n' {
            line_start = index + 1;
        }
        let Some(full) = fullwidth_of(ch) else {
            out.push(ch);
            index += 1;
            continue;
        };

        if technical[index] || !should_convert(&chars, index, line_start, &out) {
            out.push(ch);
            index += 1;
            continue;
        }

        while out.last().is_some_and(|c| *c == ' ' || *c == '\t') {
            out.pop();
        }
        out.push(full);
        index += 1;
        while chars.get(index).is_some_and(|c| *c == ' ' || *c == '\t') {
            index += 1;
        }
        changed = true;
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    Cow::Owned(out.into_iter().collect())
}

/// Codepoints covered by a technical subspan.
fn technical_positions(text: &str, len: usize) -> Vec<bool> {
    let mut mask = vec![false; len];
    for span in scan_latin_spans(text) {
        for sub in &span.subspans {
            mask[span.start + sub.start..span.start + sub.end].fill(true);
        }
    }
    mask
}

fn should_convert(chars: &[char], index: usize, line_start: usize, out: &[char]) -> bool {
    if chars[index] == '.' {
        let prev = index.checked_sub(1).map(|i| chars[i]);
        if prev == Some('.') || chars.get(index + 1) == Some(&'.') {
            return false;
        }
        if is_list_marker(chars, line_start, index) {
            return false;
        }
    }

    let left = out
        .iter()
        .rev()
        .find(|c| **c != ' ' && **c != '\t')
        .is_some_and(|&c| {
            is_cjk_letter(c) || is_cjk_closing_bracket(c) || is_cjk_terminal_punctuation(c)
        });
    let right =
        next_non_blank(chars, index).is_some_and(|c| is_cjk_letter(c) || is_cjk_opening_bracket(c));
    left || right
}

/// `12. ` at the start of a line.
fn is_list_marker(chars: &[char], line_start: usize, index: usize) -> bool {
    let digits = chars[line_start..index]
        .iter()
        .skip_while(|c| **c == ' ')
        .collect::<Vec<_>>();
    !digits.is_empty()
        && digits.iter().all(|c| c.is_ascii_digit())
        && chars.get(index + 1).is_some_and(|c| *c == ' ' || *c == '\t')
}

/// `(中文)` becomes `（中文）`. Spaces between the new parentheses and
/// neighboring CJK are removed.
pub fn fullwidth_parentheses<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    convert_enclosed(text, &PAREN_RE, ('（', '）'), |_, _| false)
}

/// `[中文]` becomes `［中文］`, except where the brackets belong to Markdown
/// link, image or reference syntax. Brackets closing a segment are skipped
/// too, since the link target after them is a protected region.
pub fn fullwidth_brackets<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    convert_enclosed(text, &BRACKET_RE, ('［', '］'), is_markdown_bracket)
}

fn is_markdown_bracket(text: &str, range: (usize, usize)) -> bool {
    let before = text[..range.0].chars().next_back();
    let after = text[range.1..].chars().next();
    matches!(before, Some('!' | ']')) || matches!(after, None | Some('(' | '[' | ':'))
}

fn convert_enclosed<'a>(
    text: &'a str,
    pattern: &Regex,
    (open, close): (char, char),
    skip: impl Fn(&str, (usize, usize)) -> bool,
) -> Cow<'a, str> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut changed = false;

    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if !inner.as_str().chars().next().is_some_and(is_cjk_letter)
            || skip(text, (whole.start(), whole.end()))
        {
            continue;
        }

        let gap = &text[last..whole.start()];
        let trimmed = gap.trim_end_matches([' ', '\t']);
        let before = trimmed.chars().next_back().or_else(|| out.chars().next_back());
        if before.is_some_and(hugs_fullwidth) {
            out.push_str(trimmed);
        } else {
            out.push_str(gap);
        }
        out.push(open);
        out.push_str(inner.as_str());
        out.push(close);

        let rest = &text[whole.end()..];
        let spaces = rest.len() - rest.trim_start_matches([' ', '\t']).len();
        let after = rest[spaces..].chars().next();
        last = if spaces > 0 && after.is_some_and(hugs_fullwidth) {
            whole.end() + spaces
        } else {
            whole.end()
        };
        changed = true;
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

fn hugs_fullwidth(ch: char) -> bool {
    is_cjk_letter(ch)
        || is_cjk_terminal_punctuation(ch)
        || is_cjk_opening_bracket(ch)
        || is_cjk_closing_bracket(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn punct(text: &str) -> String {
        fullwidth_punctuation(text, &FormattingConfig::default()).into_owned()
    }

    fn parens(text: &str) -> String {
        fullwidth_parentheses(text, &FormattingConfig::default()).into_owned()
    }

    fn brackets(text: &str) -> String {
        fullwidth_brackets(text, &FormattingConfig::default()).into_owned()
    }

    #[test]
    fn converts_fullwidth_letters_and_digits() {
        let config = FormattingConfig::default();
        assert_eq!(halfwidth_alphanumerics("ＡＢＣ１２３中文", &config), "ABC123中文");
        assert!(matches!(
            halfwidth_alphanumerics("abc，中文", &config),
            Cow::Borrowed(_)
        ));
    }

    #[test]
    fn punctuation_next_to_cjk() {
        assert_eq!(punct("你好,世界"), "你好，世界");
        assert_eq!(punct("真的吗?"), "真的吗？");
        assert_eq!(punct("注意 : 内容"), "注意：内容");
        assert_eq!(punct("Hello, 世界"), "Hello，世界");
    }

    #[test]
    fn converted_mark_is_context_for_the_next() {
        assert_eq!(punct("真的吗??"), "真的吗？？");
        assert_eq!(punct("中??0"), "中？？0");
        assert_eq!(punct("好. ."), "好。。");
        let once = punct("中!?!0");
        assert_eq!(once, "中！？！0");
        assert_eq!(punct(&once), once);
    }

    #[test]
    fn punctuation_between_latin_words_is_kept() {
        assert_eq!(punct("中文 Hello, world. 中文"), "中文 Hello, world。中文");
    }

    #[test]
    fn technical_tokens_are_untouched() {
        assert_eq!(punct("版本1.2.3发布"), "版本1.2.3发布");
        assert_eq!(punct("时间10:30开始"), "时间10:30开始");
        assert_eq!(punct("约1,000人"), "约1,000人");
        assert_eq!(punct("访问example.com了"), "访问example.com了");
    }

    #[test]
    fn ellipsis_dots_and_list_markers_are_untouched() {
        assert_eq!(punct("然后...好"), "然后...好");
        assert_eq!(punct("1. 第一项\n2. 第二项"), "1. 第一项\n2. 第二项");
    }

    #[test]
    fn parentheses_with_cjk_content() {
        assert_eq!(parens("你好 (世界) 再见"), "你好（世界）再见");
        assert_eq!(parens("使用 (API) 接口"), "使用 (API) 接口");
        assert_eq!(parens("English (中文) text"), "English （中文） text");
    }

    #[test]
    fn brackets_skip_link_syntax() {
        assert_eq!(brackets("见[注释]了"), "见［注释］了");
        assert_eq!(brackets("见[链接]"), "见[链接]");
        assert_eq!(brackets("见[链接](url)"), "见[链接](url)");
        assert_eq!(brackets("![图片]"), "![图片]");
        assert_eq!(brackets("[参考][1]"), "[参考][1]");
    }
}
