//! Spacing between scripts, around parentheses, currencies, units and
//! slashes.

use super::{chars_of, next_non_blank, prev_non_blank};
use crate::config::{FormattingConfig, PostfixCurrency};
use crate::script::is_cjk_or_hangul;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Prefix currency symbols.
pub const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₩', '₹', '₽', '฿', '₫'];

/// Unit marks that bind to the preceding number.
pub const UNIT_SYMBOLS: &[char] = &['%', '‰', '℃', '℉', '°'];

const CURRENCY_CODES: &str = "USD|EUR|GBP|JPY|CNY|RMB|HKD|TWD|KRW|SGD|AUD|CAD|CHF|INR";

static PREFIX_SYMBOL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([$€£¥₩₹₽฿₫])[ \t]+(\d)").expect("valid currency symbol regex")
});

static PREFIX_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\b({CURRENCY_CODES})[ \t]+(\d)")).expect("valid currency code regex")
});

static POSTFIX_CODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(\d)[ \t]*({CURRENCY_CODES})\b")).expect("valid postfix code regex")
});

static UNIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d)[ \t]+(%|‰|℃|℉|°[CF]?)").expect("valid unit regex"));

fn is_currency_symbol(ch: char) -> bool {
    CURRENCY_SYMBOLS.contains(&ch)
}

fn is_unit_symbol(ch: char) -> bool {
    UNIT_SYMBOLS.contains(&ch)
}

/// Collect `chars` with a space inserted before every index in `positions`
/// (sorted ascending).
fn insert_spaces(chars: &[char], positions: &[usize]) -> String {
    let mut out = String::with_capacity(chars.len() + positions.len());
    let mut next = positions.iter().peekable();
    for (index, ch) in chars.iter().enumerate() {
        if next.next_if(|p| **p == index).is_some() {
            out.push(' ');
        }
        out.push(*ch);
    }
    out
}

/// Space between CJK and an ASCII parenthesis: `中文(a)中文` becomes
/// `中文 (a) 中文`.
pub fn space_parentheses<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains(['(', ')']) {
        return Cow::Borrowed(text);
    }
    let chars = chars_of(text);
    let positions: Vec<usize> = (1..chars.len())
        .filter(|&i| {
            let (a, b) = (chars[i - 1], chars[i]);
            (is_cjk_or_hangul(a) && b == '(') || (a == ')' && is_cjk_or_hangul(b))
        })
        .collect();
    if positions.is_empty() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(insert_spaces(&chars, &positions))
}

/// Space between CJK and a Latin run `(currency)? alnum+ (unit)?`, in either
/// order. Existing spaces are never doubled.
pub fn space_cjk_latin<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    let chars = chars_of(text);
    let positions: Vec<usize> = (1..chars.len())
        .filter(|&i| {
            let (a, b) = (chars[i - 1], chars[i]);
            let cjk_then_latin =
                is_cjk_or_hangul(a) && (b.is_ascii_alphanumeric() || is_currency_symbol(b));
            let latin_then_cjk =
                (a.is_ascii_alphanumeric() || is_unit_symbol(a)) && is_cjk_or_hangul(b);
            cjk_then_latin || latin_then_cjk
        })
        .collect();
    if positions.is_empty() {
        return Cow::Borrowed(text);
    }
    Cow::Owned(insert_spaces(&chars, &positions))
}

/// Prefix currency binds to its amount (`$ 100` becomes `$100`), units bind
/// to the number before them (`30 %` becomes `30%`), and postfix codes follow
/// [`PostfixCurrency`].
pub fn bind_currency_and_units<'a>(text: &'a str, config: &FormattingConfig) -> Cow<'a, str> {
    let postfix = match config.postfix_currency {
        PostfixCurrency::Spaced => "$1 $2",
        PostfixCurrency::Tight => "$1$2",
    };
    let text_after_postfix = POSTFIX_CODE_RE.replace_all(text, postfix);
    let after_symbols = PREFIX_SYMBOL_RE.replace_all(&text_after_postfix, "$1$2");
    let after_codes = bind_prefix_codes(&after_symbols);
    let after_units = UNIT_RE.replace_all(&after_codes, "$1$2");

    if after_units == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(after_units.into_owned())
    }
}

/// `USD 100` becomes `USD100`, unless a number precedes the code, in which case
/// it is a postfix code.
fn bind_prefix_codes(text: &str) -> Cow<'_, str> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in PREFIX_CODE_RE.captures_iter(text) {
        let (Some(whole), Some(code), Some(digit)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        let preceded_by_number = text[..whole.start()]
            .trim_end_matches([' ', '\t'])
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_digit());
        if preceded_by_number {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push_str(code.as_str());
        out.push_str(digit.as_str());
        last = whole.end();
    }
    if last == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

/// Remove spaces around `/`, but never next to another `/`.
pub fn despace_slashes<'a>(text: &'a str, _config: &FormattingConfig) -> Cow<'a, str> {
    if !text.contains('/') {
        return Cow::Borrowed(text);
    }
    let chars = chars_of(text);
    let mut out: Vec<char> = Vec::with_capacity(chars.len());
    let mut changed = false;
    let mut index = 0;

    while index < chars.len() {
        let ch = chars[index];
        let touches_slash = ch == '/'
            && (prev_non_blank(&chars, index) == Some('/')
                || next_non_blank(&chars, index) == Some('/'));
        if ch != '/' || touches_slash {
            out.push(ch);
            index += 1;
            continue;
        }

        let trailing = out
            .iter()
            .rev()
            .take_while(|c| **c == ' ' || **c == '\t')
            .count();
        let at_line_start = out[..out.len() - trailing]
            .last()
            .is_none_or(|c| *c == '\n');
        if trailing > 0 && !at_line_start {
            out.truncate(out.len() - trailing);
            changed = true;
        }
        out.push('/');
        index += 1;

        let following = chars[index..]
            .iter()
            .take_while(|c| **c == ' ' || **c == '\t')
            .count();
        let at_line_end = chars
            .get(index + following)
            .is_none_or(|c| *c == '\n');
        if following > 0 && !at_line_end {
            index += following;
            changed = true;
        }
    }

    if !changed {
        return Cow::Borrowed(text);
    }
    Cow::Owned(out.into_iter().collect())
}
